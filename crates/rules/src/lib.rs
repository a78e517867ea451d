//! Firestore access policies for Boofer
//!
//! The backend evaluates the deployed rule files; this crate restates the
//! same policies as pure predicates so they can be tested without a live
//! project, and guards deploys against the temporary allow-all rules.
//!
//! - **Request model**: paths, operations, auth and stored documents
//! - **Policies**: the production rules and the temporary allow-all rules
//! - **Classification**: tell the two rule files apart by their text
//! - **Deployment guard**: keep allow-all rules out of shared environments
//!
//! # Example
//!
//! ```rust
//! use boofer_rules::prelude::*;
//! use serde_json::json;
//!
//! let rules = ProductionRules::new().unwrap();
//! let conversation = json!({"participants": ["alice", "bob"]});
//! let path = "/conversations/c1";
//!
//! assert!(can_access(&rules, path, Operation::Get, Some(&conversation), Some("alice")).unwrap());
//! assert!(!can_access(&rules, path, Operation::Get, Some(&conversation), Some("carol")).unwrap());
//! ```

#![warn(missing_docs)]

pub mod guard;
pub mod pattern;
pub mod policy;
pub mod request;
pub mod source;

#[cfg(test)]
mod proptests;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::guard::{DeploymentGuard, Environment, StagedRuleset};
    pub use crate::policy::{
        can_access, ruleset, Decision, DenyReason, ProductionRules, RuleSet, RulesetKind,
        TemporaryTestingRules,
    };
    pub use crate::request::{AccessRequest, Auth, DocumentPath, Operation};
    pub use crate::source::{classify_rules_file, classify_rules_source, RulesSource};
}
