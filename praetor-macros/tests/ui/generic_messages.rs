use praetor::message::{Command, Event, Request};
use praetor_macros::{command, event, request};

#[event(name = "value.tagged")]
struct Tagged<T> {
    value: T,
}

#[request(response = Vec<T>)]
struct Repeat<T: Clone> {
    item: T,
    times: usize,
}

#[command]
struct Store<K, V>
where
    K: Ord,
{
    key: K,
    value: V,
}

fn name_of<E: Event>() -> &'static str {
    E::NAME
}

fn main() {
    assert_eq!(name_of::<Tagged<u32>>(), "value.tagged");
    assert_eq!(<Repeat<String> as Request>::NAME, "Repeat");
    assert_eq!(<Store<u8, String> as Command>::NAME, "Store");

    let tagged = Tagged { value: 1u32 };
    let repeat = Repeat { item: "x".to_string(), times: 2 };
    let store = Store { key: 1u8, value: "v".to_string() };
    assert_eq!(tagged.value, 1);
    assert_eq!(vec![repeat.item.clone(); repeat.times].len(), 2);
    assert_eq!((store.key, store.value.as_str()), (1, "v"));
}
