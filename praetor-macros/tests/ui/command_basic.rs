use praetor::message::Command;
use praetor_macros::command;

#[command]
struct CreateUser {
    user_name: String,
}

#[command(name = "user.rename")]
struct RenameUser<T: Send + Sync + 'static> {
    id: T,
    to: String,
}

fn main() {
    assert_eq!(CreateUser::NAME, "CreateUser");
    assert_eq!(<RenameUser<u32> as Command>::NAME, "user.rename");

    let c = CreateUser { user_name: "ada".into() };
    let r = RenameUser { id: 1u32, to: "grace".into() };
    assert_eq!(c.user_name, "ada");
    assert_eq!((r.id, r.to.as_str()), (1, "grace"));
}
