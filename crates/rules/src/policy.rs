//! Access policies as pure predicates
//!
//! Each rule set answers one question: may this request touch this
//! document? Matching follows the rules engine: every `match` whose pattern
//! fits the path is consulted, the request is allowed if any applicable
//! `allow` condition holds, and a condition that fails to evaluate (missing
//! document, missing field, wrong type) counts as not holding.

use crate::pattern::{Captures, PathPattern};
use crate::request::{AccessRequest, DocumentPath, Operation};
use boofer_core::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Which rule set a policy or file represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesetKind {
    /// Per-collection ownership and membership checks
    Production,
    /// Allow-all rules for local debugging
    TemporaryTesting,
}

impl fmt::Display for RulesetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesetKind::Production => f.write_str("production"),
            RulesetKind::TemporaryTesting => f.write_str("temporary-testing"),
        }
    }
}

/// Why a request was denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DenyReason {
    /// No `match` covers the path
    NoMatchingRule,
    /// The caller is not signed in
    Unauthenticated,
    /// A condition could not be evaluated
    EvaluationError(String),
    /// Every applicable condition was false
    ConditionFailed,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoMatchingRule => f.write_str("no rule matches the path"),
            DenyReason::Unauthenticated => f.write_str("request is not authenticated"),
            DenyReason::EvaluationError(e) => write!(f, "condition failed to evaluate: {e}"),
            DenyReason::ConditionFailed => f.write_str("no condition holds"),
        }
    }
}

/// Outcome of evaluating a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Access granted
    Allow,
    /// Access refused
    Deny {
        /// Why
        #[serde(flatten)]
        reason: DenyReason,
    },
}

impl Decision {
    fn deny(reason: DenyReason) -> Self {
        Decision::Deny { reason }
    }

    /// Whether access was granted
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// A rule set that can authorise requests
pub trait RuleSet {
    /// Which rule set this is
    fn kind(&self) -> RulesetKind;

    /// Evaluate a request
    fn evaluate(&self, request: &AccessRequest) -> Decision;
}

/// What a condition can see while it runs
pub struct RuleContext<'a> {
    request: &'a AccessRequest,
    captures: &'a Captures,
}

/// Result of evaluating part of a condition; `Err` carries the evaluation error
pub type Eval<T> = std::result::Result<T, String>;

impl RuleContext<'_> {
    /// `request.auth.uid`, `None` when `request.auth == null`
    pub fn uid(&self) -> Option<&str> {
        self.request.uid()
    }

    /// A variable bound by the `match` pattern
    pub fn var(&self, name: &str) -> Eval<&str> {
        self.captures
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| format!("unbound variable {name}"))
    }

    /// `resource.data.<field>`
    pub fn field(&self, name: &str) -> Eval<&Value> {
        let data = self
            .request
            .resource
            .as_ref()
            .ok_or_else(|| "resource is null".to_string())?;
        data.get(name)
            .ok_or_else(|| format!("resource.data has no field {name}"))
    }

    /// `value == resource.data.<field>`; a value of another type is not equal
    pub fn field_equals(&self, name: &str, value: &str) -> Eval<bool> {
        Ok(self.field(name)?.as_str() == Some(value))
    }

    /// `value in resource.data.<field>`
    pub fn list_contains(&self, name: &str, value: &str) -> Eval<bool> {
        let list = self
            .field(name)?
            .as_array()
            .ok_or_else(|| format!("resource.data.{name} is not a list"))?;
        Ok(list.iter().any(|item| item.as_str() == Some(value)))
    }
}

/// A rule condition; `Err` means evaluation failed
pub type Condition = fn(&RuleContext<'_>) -> Eval<bool>;

/// `left || right` as the rules engine evaluates it
///
/// An error on one side is absorbed when the other side is true.
pub fn or(left: Eval<bool>, right: impl FnOnce() -> Eval<bool>) -> Eval<bool> {
    match left {
        Ok(true) => Ok(true),
        Ok(false) => right(),
        Err(e) => match right() {
            Ok(true) => Ok(true),
            _ => Err(e),
        },
    }
}

/// Which operations an `allow` statement grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// `allow read`
    Read,
    /// `allow write`
    Write,
    /// `allow read, write`
    ReadWrite,
}

impl Grant {
    fn covers(self, operation: Operation) -> bool {
        match self {
            Grant::Read => operation.is_read(),
            Grant::Write => operation.is_write(),
            Grant::ReadWrite => true,
        }
    }
}

/// One `match` block
pub struct MatchRule {
    pattern: PathPattern,
    allows: Vec<(Grant, Condition)>,
}

impl MatchRule {
    /// A `match` block with no `allow` statements
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            allows: Vec::new(),
        })
    }

    /// Add an `allow` statement
    #[must_use]
    pub fn allow(mut self, grant: Grant, condition: Condition) -> Self {
        self.allows.push((grant, condition));
        self
    }

    /// The path pattern
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

/// Evaluate a request against `match` blocks
fn evaluate_rules(rules: &[MatchRule], request: &AccessRequest) -> Decision {
    let mut matched = false;
    let mut first_error = None;

    for rule in rules {
        let Some(captures) = rule.pattern.matches(&request.path) else {
            continue;
        };
        matched = true;

        let ctx = RuleContext {
            request,
            captures: &captures,
        };
        for (grant, condition) in &rule.allows {
            if !grant.covers(request.operation) {
                continue;
            }
            match condition(&ctx) {
                Ok(true) => return Decision::Allow,
                Ok(false) => {}
                Err(e) => {
                    debug!(pattern = %rule.pattern, error = %e, "Rule condition failed to evaluate");
                    first_error.get_or_insert(e);
                }
            }
        }
    }

    let reason = if !matched {
        DenyReason::NoMatchingRule
    } else if request.auth.is_none() {
        DenyReason::Unauthenticated
    } else if let Some(e) = first_error {
        DenyReason::EvaluationError(e)
    } else {
        DenyReason::ConditionFailed
    };
    Decision::deny(reason)
}

/// The rules the app ships to production
pub struct ProductionRules {
    rules: Vec<MatchRule>,
}

impl ProductionRules {
    /// Build the production rule set
    pub fn new() -> Result<Self> {
        let rules = vec![
            MatchRule::new("/users/{userId}")?
                .allow(Grant::ReadWrite, |ctx| {
                    Ok(ctx.uid().is_some() && ctx.uid() == Some(ctx.var("userId")?))
                })
                .allow(Grant::Read, |ctx| {
                    Ok(ctx.field("isDiscoverable")? == &Value::Bool(true))
                }),
            MatchRule::new("/conversations/{conversationId}/messages/{messageId}")?
                .allow(Grant::ReadWrite, is_participant),
            MatchRule::new("/conversations/{conversationId}")?
                .allow(Grant::ReadWrite, is_participant),
            MatchRule::new("/connection_requests/{requestId}")?.allow(Grant::ReadWrite, |ctx| {
                let Some(uid) = ctx.uid() else {
                    return Ok(false);
                };
                or(ctx.field_equals("fromUserId", uid), || ctx.field_equals("toUserId", uid))
            }),
            MatchRule::new("/friends/{friendshipId}")?.allow(Grant::ReadWrite, |ctx| {
                let Some(uid) = ctx.uid() else {
                    return Ok(false);
                };
                or(ctx.field_equals("userId", uid), || ctx.field_equals("friendId", uid))
            }),
        ];
        Ok(Self { rules })
    }

    /// The `match` blocks, in declaration order
    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }
}

fn is_participant(ctx: &RuleContext<'_>) -> Eval<bool> {
    match ctx.uid() {
        Some(uid) => ctx.list_contains("participants", uid),
        None => Ok(false),
    }
}

impl RuleSet for ProductionRules {
    fn kind(&self) -> RulesetKind {
        RulesetKind::Production
    }

    fn evaluate(&self, request: &AccessRequest) -> Decision {
        evaluate_rules(&self.rules, request)
    }
}

/// Allow-all rules for debugging before the production rules existed
///
/// Never deploy these anywhere but a development project; see
/// [`crate::guard::DeploymentGuard`].
pub struct TemporaryTestingRules {
    rules: Vec<MatchRule>,
}

impl TemporaryTestingRules {
    /// Build the allow-all rule set
    pub fn new() -> Result<Self> {
        Ok(Self {
            rules: vec![MatchRule::new("/{document=**}")?.allow(Grant::ReadWrite, |_| Ok(true))],
        })
    }
}

impl RuleSet for TemporaryTestingRules {
    fn kind(&self) -> RulesetKind {
        RulesetKind::TemporaryTesting
    }

    fn evaluate(&self, request: &AccessRequest) -> Decision {
        evaluate_rules(&self.rules, request)
    }
}

/// Build the rule set of a kind
pub fn ruleset(kind: RulesetKind) -> Result<Box<dyn RuleSet>> {
    Ok(match kind {
        RulesetKind::Production => Box::new(ProductionRules::new()?),
        RulesetKind::TemporaryTesting => Box::new(TemporaryTestingRules::new()?),
    })
}

/// Whether `uid` may perform `operation` on the document at `path`
///
/// `document` is the stored document, `None` when it does not exist; `uid`
/// is `None` for unauthenticated callers.
pub fn can_access(
    rules: &dyn RuleSet,
    path: &str,
    operation: Operation,
    document: Option<&Value>,
    uid: Option<&str>,
) -> Result<bool> {
    let mut request = AccessRequest::new(DocumentPath::parse(path)?, operation);
    if let Some(uid) = uid {
        request = request.as_user(uid);
    }
    if let Some(document) = document {
        request = request.with_resource(document.clone());
    }
    Ok(rules.evaluate(&request).is_allowed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn production() -> ProductionRules {
        ProductionRules::new().unwrap()
    }

    fn allowed(path: &str, op: Operation, doc: Value, uid: Option<&str>) -> bool {
        can_access(&production(), path, op, Some(&doc), uid).unwrap()
    }

    #[test]
    fn test_conversation_participants() {
        let doc = json!({"participants": ["alice", "bob"]});
        assert!(allowed("/conversations/c1", Operation::Get, doc.clone(), Some("alice")));
        assert!(allowed("/conversations/c1", Operation::Update, doc.clone(), Some("bob")));
        assert!(!allowed("/conversations/c1", Operation::Get, doc, Some("carol")));
    }

    #[test]
    fn test_messages_use_their_own_participants() {
        let doc = json!({"participants": ["alice", "bob"], "text": "hi"});
        let path = "/conversations/c1/messages/m1";
        assert!(allowed(path, Operation::Get, doc.clone(), Some("alice")));
        assert!(!allowed(path, Operation::Delete, doc, Some("carol")));
        let without = json!({"text": "hi"});
        assert!(!allowed(path, Operation::Get, without, Some("alice")));
    }

    #[test]
    fn test_user_profile_owner_and_discoverable() {
        let hidden = json!({"isDiscoverable": false});
        assert!(allowed("/users/alice", Operation::Update, hidden.clone(), Some("alice")));
        assert!(!allowed("/users/alice", Operation::Get, hidden, Some("bob")));

        let public = json!({"isDiscoverable": true});
        assert!(allowed("/users/alice", Operation::Get, public.clone(), Some("bob")));
        assert!(allowed("/users/alice", Operation::Get, public.clone(), None));
        assert!(!allowed("/users/alice", Operation::Update, public, Some("bob")));
    }

    #[test]
    fn test_owner_may_create_own_profile() {
        let rules = production();
        assert!(can_access(&rules, "/users/alice", Operation::Create, None, Some("alice")).unwrap());
        assert!(!can_access(&rules, "/users/alice", Operation::Create, None, Some("bob")).unwrap());
    }

    #[test]
    fn test_connection_requests_parties() {
        let doc = json!({"fromUserId": "alice", "toUserId": "bob"});
        assert!(allowed("/connection_requests/r1", Operation::Get, doc.clone(), Some("alice")));
        assert!(allowed("/connection_requests/r1", Operation::Delete, doc.clone(), Some("bob")));
        assert!(!allowed("/connection_requests/r1", Operation::Get, doc, Some("carol")));
    }

    #[test]
    fn test_friends_parties() {
        let doc = json!({"userId": "alice", "friendId": "bob"});
        assert!(allowed("/friends/f1", Operation::Update, doc.clone(), Some("bob")));
        assert!(!allowed("/friends/f1", Operation::Update, doc, Some("carol")));
    }

    #[test]
    fn test_unauthenticated_denied_on_every_matched_path() {
        let rules = production();
        let doc = json!({
            "participants": ["alice"],
            "fromUserId": "alice",
            "toUserId": "bob",
            "userId": "alice",
            "friendId": "bob",
            "isDiscoverable": false
        });
        for path in [
            "/users/alice",
            "/conversations/c1",
            "/conversations/c1/messages/m1",
            "/connection_requests/r1",
            "/friends/f1",
        ] {
            for op in Operation::ALL {
                let request = AccessRequest::new(DocumentPath::parse(path).unwrap(), op)
                    .with_resource(doc.clone());
                assert_eq!(
                    rules.evaluate(&request),
                    Decision::Deny {
                        reason: DenyReason::Unauthenticated
                    },
                    "{op} {path}"
                );
            }
        }
    }

    #[test]
    fn test_unmatched_path_denied() {
        let request = AccessRequest::new(DocumentPath::parse("/admin/config").unwrap(), Operation::Get)
            .as_user("alice");
        assert_eq!(
            production().evaluate(&request),
            Decision::Deny {
                reason: DenyReason::NoMatchingRule
            }
        );
    }

    #[test]
    fn test_creating_conversation_is_denied_without_stored_resource() {
        let request =
            AccessRequest::new(DocumentPath::parse("/conversations/new").unwrap(), Operation::Create)
                .as_user("alice");
        match production().evaluate(&request) {
            Decision::Deny {
                reason: DenyReason::EvaluationError(message),
            } => assert!(message.contains("resource is null")),
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn test_or_absorbs_error_when_other_side_holds() {
        let doc = json!({"toUserId": "bob"});
        assert!(allowed("/connection_requests/r1", Operation::Get, doc.clone(), Some("bob")));

        let request = AccessRequest::new(DocumentPath::parse("/connection_requests/r1").unwrap(), Operation::Get)
            .as_user("carol")
            .with_resource(doc);
        match production().evaluate(&request) {
            Decision::Deny {
                reason: DenyReason::EvaluationError(message),
            } => assert!(message.contains("fromUserId")),
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn test_type_mismatch_compares_unequal() {
        let doc = json!({"userId": 42, "friendId": "bob"});
        assert!(allowed("/friends/f1", Operation::Update, doc.clone(), Some("bob")));

        let request = AccessRequest::new(DocumentPath::parse("/friends/f1").unwrap(), Operation::Update)
            .as_user("carol")
            .with_resource(doc);
        assert_eq!(
            production().evaluate(&request),
            Decision::Deny {
                reason: DenyReason::ConditionFailed
            }
        );
    }

    #[test]
    fn test_or_truth_table() {
        let err = || Err::<bool, _>("boom".to_string());
        assert_eq!(or(Ok(false), || Ok(true)), Ok(true));
        assert_eq!(or(err(), || Ok(true)), Ok(true));
        assert_eq!(or(Ok(true), err), Ok(true));
        assert_eq!(or(err(), || Ok(false)), Err("boom".to_string()));
        assert_eq!(or(Ok(false), err), Err("boom".to_string()));
    }

    #[test]
    fn test_deny_reason_display() {
        assert_eq!(
            DenyReason::EvaluationError("resource is null".into()).to_string(),
            "condition failed to evaluate: resource is null"
        );
        assert_eq!(DenyReason::Unauthenticated.to_string(), "request is not authenticated");
    }

    #[test]
    fn test_wrong_type_is_evaluation_error() {
        let doc = json!({"participants": "alice"});
        assert!(!allowed("/conversations/c1", Operation::Get, doc, Some("alice")));
    }

    #[test]
    fn test_temporary_rules_allow_everything() {
        let rules = TemporaryTestingRules::new().unwrap();
        assert_eq!(rules.kind(), RulesetKind::TemporaryTesting);
        for path in ["/users/alice", "/admin/config", "/a/b/c/d/e/f"] {
            for op in Operation::ALL {
                assert!(can_access(&rules, path, op, None, None).unwrap());
                assert!(can_access(&rules, path, op, None, Some("mallory")).unwrap());
            }
        }
    }

    #[test]
    fn test_rulesets_are_distinguishable() {
        let request = AccessRequest::new(DocumentPath::parse("/admin/config").unwrap(), Operation::Get);
        let production = ruleset(RulesetKind::Production).unwrap();
        let testing = ruleset(RulesetKind::TemporaryTesting).unwrap();
        assert_ne!(production.kind(), testing.kind());
        assert_ne!(production.evaluate(&request), testing.evaluate(&request));
    }

    #[test]
    fn test_decision_json() {
        let json = serde_json::to_value(Decision::deny(DenyReason::EvaluationError("x".into()))).unwrap();
        assert_eq!(json, json!({"decision": "deny", "reason": "evaluation_error", "detail": "x"}));
        let json = serde_json::to_value(Decision::Allow).unwrap();
        assert_eq!(json, json!({"decision": "allow"}));
    }
}
