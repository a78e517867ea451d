//! Deploy-time guard for rule files
//!
//! The allow-all rules exist only for debugging. The guard refuses to let
//! them reach a shared environment, and refuses any deploy that stages
//! them next to the production rules.

use crate::policy::RulesetKind;
use crate::source::{classify_rules_file, Finding, FindingKind, RulesSource};
use boofer_core::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Backend project the rules are deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// A developer's own project or the local emulator
    Development,
    /// Shared pre-release project
    Staging,
    /// Live project
    Production,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(Error::invalid_input(format!("Unknown environment: {other}"))
                .with_suggestion("Use one of: development, staging, production")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Staging => f.write_str("staging"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// A rule file selected for deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedRuleset {
    /// File name or other label
    pub name: String,
    /// What the file contains
    pub kind: RulesetKind,
    /// Notable statements found while classifying
    pub findings: Vec<Finding>,
}

impl StagedRuleset {
    /// Label a rule set of known kind
    pub fn new(name: impl Into<String>, kind: RulesetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            findings: Vec::new(),
        }
    }

    /// Label a classified rule file
    pub fn from_source(name: impl Into<String>, source: RulesSource) -> Self {
        Self {
            name: name.into(),
            kind: source.kind,
            findings: source.findings,
        }
    }

    /// `file:line` of the first allow-all statement, or the file alone
    fn allow_all_location(&self) -> String {
        match self.findings.iter().find(|f| f.kind == FindingKind::AllowAll) {
            Some(finding) => format!("{}:{}", self.name, finding.line),
            None => self.name.clone(),
        }
    }
}

/// Checks a deploy before it happens
#[derive(Debug, Clone, Copy)]
pub struct DeploymentGuard {
    environment: Environment,
}

impl DeploymentGuard {
    /// Guard deploys to an environment
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    /// Target environment
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Accept or reject a set of staged rule sets
    pub fn check(&self, staged: &[StagedRuleset]) -> Result<()> {
        if staged.is_empty() {
            return Err(Error::validation("No rules files staged for deploy"));
        }

        let testing: Vec<&StagedRuleset> = staged
            .iter()
            .filter(|s| s.kind == RulesetKind::TemporaryTesting)
            .collect();

        let Some(first_testing) = testing.first() else {
            info!(environment = %self.environment, files = staged.len(), "Rules deploy accepted");
            return Ok(());
        };

        if testing.len() < staged.len() {
            warn!(environment = %self.environment, "Allow-all and production rules staged together");
            return Err(Error::new(
                ErrorCode::InsecureRuleset,
                "Allow-all and production rules staged in the same deploy",
            )
            .with_context(format!("Allow-all rules in {}", first_testing.allow_all_location()))
            .with_suggestion("Deploy exactly one rules file"));
        }

        if self.environment != Environment::Development {
            warn!(environment = %self.environment, file = %first_testing.name, "Allow-all rules blocked");
            return Err(Error::insecure_ruleset(&first_testing.name).with_context(format!(
                "Allow-all rule at {}; target environment: {}",
                first_testing.allow_all_location(),
                self.environment
            )));
        }

        warn!(file = %first_testing.name, "Allow-all rules deployed to development");
        Ok(())
    }

    /// Classify rule files and check them
    pub fn check_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<StagedRuleset>> {
        let staged = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let source = classify_rules_file(path)?;
                Ok(StagedRuleset::from_source(path.display().to_string(), source))
            })
            .collect::<Result<Vec<_>>>()?;
        self.check(&staged)?;
        Ok(staged)
    }
}
