//! Property tests over generated requests

use crate::policy::{Decision, DenyReason, ProductionRules, RuleSet, TemporaryTestingRules};
use crate::request::{AccessRequest, DocumentPath, Operation};
use proptest::prelude::*;
use serde_json::json;

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,12}"
}

fn operation() -> impl Strategy<Value = Operation> {
    prop::sample::select(Operation::ALL.to_vec())
}

fn document_path() -> impl Strategy<Value = DocumentPath> {
    prop::collection::vec(segment(), 1..6)
        .prop_map(|segments| DocumentPath::parse(&segments.join("/")).unwrap())
}

proptest! {
    #[test]
    fn temporary_rules_allow_any_request(
        path in document_path(),
        op in operation(),
        uid in proptest::option::of(segment()),
    ) {
        let rules = TemporaryTestingRules::new().unwrap();
        let mut request = AccessRequest::new(path, op);
        if let Some(uid) = uid {
            request = request.as_user(uid);
        }
        prop_assert!(rules.evaluate(&request).is_allowed());
    }

    #[test]
    fn production_denies_unauthenticated_except_discoverable_reads(
        path in document_path(),
        op in operation(),
        participants in prop::collection::vec(segment(), 0..4),
    ) {
        let rules = ProductionRules::new().unwrap();
        let request = AccessRequest::new(path, op).with_resource(json!({
            "participants": participants,
            "isDiscoverable": false,
        }));
        prop_assert!(!rules.evaluate(&request).is_allowed());
    }

    #[test]
    fn conversation_access_matches_membership(
        id in segment(),
        uid in segment(),
        participants in prop::collection::vec(segment(), 0..5),
        op in operation(),
    ) {
        let rules = ProductionRules::new().unwrap();
        let path = DocumentPath::parse(&format!("/conversations/{id}")).unwrap();
        let request = AccessRequest::new(path, op)
            .as_user(uid.clone())
            .with_resource(json!({ "participants": participants.clone() }));

        let decision = rules.evaluate(&request);
        if participants.contains(&uid) {
            prop_assert_eq!(decision, Decision::Allow);
        } else {
            prop_assert_eq!(decision, Decision::Deny { reason: DenyReason::ConditionFailed });
        }
    }
}
