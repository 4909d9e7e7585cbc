use pretty_assertions::assert_eq;
use rstest::rstest;

use slotbook_core::access::{Action, ActorRole};

#[rstest]
#[case(ActorRole::Customer, Action::ViewAvailability, true)]
#[case(ActorRole::Customer, Action::CreateBooking, true)]
#[case(ActorRole::Customer, Action::RescheduleBooking, true)]
#[case(ActorRole::Customer, Action::CancelBooking, true)]
#[case(ActorRole::Provider, Action::ViewAvailability, true)]
#[case(ActorRole::Provider, Action::CreateBooking, false)]
#[case(ActorRole::Provider, Action::RescheduleBooking, false)]
#[case(ActorRole::Provider, Action::CancelBooking, true)]
fn test_capability_table(
    #[case] role: ActorRole,
    #[case] action: Action,
    #[case] allowed: bool,
) {
    assert_eq!(role.may(action), allowed);
}

#[test]
fn test_role_serde_uses_snake_case() {
    assert_eq!(
        serde_json::to_string(&ActorRole::Customer).unwrap(),
        "\"customer\""
    );
    assert_eq!(
        serde_json::from_str::<ActorRole>("\"provider\"").unwrap(),
        ActorRole::Provider
    );
    assert!(serde_json::from_str::<ActorRole>("\"admin\"").is_err());
}
