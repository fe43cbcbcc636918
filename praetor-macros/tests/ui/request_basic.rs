use praetor::message::Request;
use praetor_macros::request;

#[request(response = Option<String>)]
#[derive(Debug, Clone)]
struct GetUser {
    id: String,
}

#[request(response = Vec<u64>, name = "catalog.list_prices")]
enum ListPrices {
    All,
    Category { name: String },
}

fn assert_response<Q: Request<Response = R>, R>() {}

fn main() {
    assert_eq!(GetUser::NAME, "GetUser");
    assert_eq!(ListPrices::NAME, "catalog.list_prices");
    assert_response::<GetUser, Option<String>>();
    assert_response::<ListPrices, Vec<u64>>();

    let q = GetUser { id: "u-1".into() };
    assert_eq!(q.clone().id, "u-1");
    let _ = (ListPrices::All, ListPrices::Category { name: "tea".into() });
}
