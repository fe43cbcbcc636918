use praetor::message::Event;
use praetor_macros::event;

#[event]
#[derive(Debug)]
struct UserCreated {
    id: String,
}

#[event(name = "user.lifecycle")]
#[derive(Debug)]
enum UserLifecycle {
    Activated { id: String },
    Deactivated { id: String },
}

fn main() {
    assert_eq!(UserCreated::NAME, "UserCreated");
    assert_eq!(UserLifecycle::NAME, "user.lifecycle");

    let e = UserCreated { id: "u-1".into() };
    assert_eq!(e.id, "u-1");
    for ev in [
        UserLifecycle::Activated { id: "a".into() },
        UserLifecycle::Deactivated { id: "b".into() },
    ] {
        match ev {
            UserLifecycle::Activated { id } | UserLifecycle::Deactivated { id } => assert!(!id.is_empty()),
        }
    }
}
