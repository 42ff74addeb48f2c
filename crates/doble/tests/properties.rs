//! Property tests over arbitrary message names.

use doble::{Double, DoubleError, TO_INT};
use proptest::prelude::*;
use serde_json::json;

fn message_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,16}"
}

proptest! {
    #[test]
    fn prop_plain_double_rejects_any_unregistered_message(name in message_name()) {
        let d = Double::new("strict");
        let err = d.send_no_args(&name).unwrap_err();
        prop_assert!(
            matches!(err, DoubleError::UnknownMessage { .. }),
            "expected UnknownMessage, got {:?}",
            err
        );
    }

    #[test]
    fn prop_null_object_answers_any_message_with_itself(name in message_name()) {
        prop_assume!(name != TO_INT);
        let d = Double::new("loose").as_null_object();

        prop_assert!(d.responds_to(&name));
        let reply = d.send_no_args(&name).unwrap();
        prop_assert!(reply.is_double(&d));
    }

    #[test]
    fn prop_explicit_stub_wins_over_null_object_defaults(
        name in message_name(),
        value in any::<i64>(),
    ) {
        let d = Double::new("stubbed").as_null_object();
        d.stub(&name).returns(json!(value));

        let reply = d.send_no_args(&name).unwrap();
        prop_assert_eq!(reply.into_value(), Some(json!(value)));
    }

    #[test]
    fn prop_expectation_verifies_iff_dispatched(
        name in message_name(),
        calls in 0usize..4,
    ) {
        let d = Double::new("counted").as_null_object();
        d.expect_message(&name);

        for _ in 0..calls {
            d.send_no_args(&name).unwrap();
        }
        prop_assert_eq!(d.verify().is_ok(), calls >= 1);
    }

    #[test]
    fn prop_every_dispatch_is_logged(names in prop::collection::vec(message_name(), 0..8)) {
        let d = Double::new("logged").as_null_object();
        for name in &names {
            d.send_no_args(name).unwrap();
        }

        let calls = d.calls();
        prop_assert_eq!(calls.len(), names.len());
        for (record, name) in calls.iter().zip(&names) {
            prop_assert_eq!(&record.name, name);
        }
    }
}
