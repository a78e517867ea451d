//! Access request model
//!
//! Mirrors what a rule condition can see: the document path, the operation,
//! the caller's auth token and the document as currently stored.

use boofer_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Prefix every Firestore document path is evaluated under
const DOCUMENTS_ROOT: &str = "databases/(default)/documents";

/// Fine-grained operation; rules grant `read` and `write` over these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Single document read
    Get,
    /// Query read
    List,
    /// Document creation
    Create,
    /// Document update
    Update,
    /// Document deletion
    Delete,
}

impl Operation {
    /// Every operation
    pub const ALL: [Operation; 5] = [
        Operation::Get,
        Operation::List,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    /// Covered by `allow read`
    pub fn is_read(self) -> bool {
        matches!(self, Operation::Get | Operation::List)
    }

    /// Covered by `allow write`
    pub fn is_write(self) -> bool {
        !self.is_read()
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "get" | "read" => Ok(Operation::Get),
            "list" => Ok(Operation::List),
            "create" => Ok(Operation::Create),
            "update" | "write" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(Error::invalid_input(format!("Unknown operation: {other}"))
                .with_suggestion("Use one of: get, list, create, update, delete")),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Verified identity of the caller (`request.auth`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    /// User id
    pub uid: String,
}

impl Auth {
    /// Auth for a user id
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// A document path split into segments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Parse `/collection/doc/...`
    ///
    /// The leading slash and the `/databases/(default)/documents` root are
    /// optional. Empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim().trim_start_matches('/');
        let relative = trimmed
            .strip_prefix(DOCUMENTS_ROOT)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(trimmed);

        if relative.is_empty() {
            return Err(Error::invalid_input("Document path is empty"));
        }

        let segments: Vec<String> = relative.split('/').map(String::from).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::invalid_input(format!("Document path has an empty segment: {path}")));
        }

        Ok(Self { segments })
    }

    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// First segment
    pub fn collection(&self) -> &str {
        &self.segments[0]
    }
}

impl TryFrom<String> for DocumentPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DocumentPath> for String {
    fn from(path: DocumentPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// One access attempt to evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Target document
    pub path: DocumentPath,
    /// Attempted operation
    pub operation: Operation,
    /// Caller identity, `None` when unauthenticated
    pub auth: Option<Auth>,
    /// Stored document data (`resource.data`), `None` when it does not exist
    pub resource: Option<Map<String, Value>>,
}

impl AccessRequest {
    /// Unauthenticated request against a missing document
    pub fn new(path: DocumentPath, operation: Operation) -> Self {
        Self {
            path,
            operation,
            auth: None,
            resource: None,
        }
    }

    /// Authenticate as a user
    #[must_use]
    pub fn as_user(mut self, uid: impl Into<String>) -> Self {
        self.auth = Some(Auth::new(uid));
        self
    }

    /// Set the stored document
    ///
    /// Non-object values are treated as a missing document.
    #[must_use]
    pub fn with_resource(mut self, data: Value) -> Self {
        self.resource = match data {
            Value::Object(map) => Some(map),
            _ => None,
        };
        self
    }

    /// Caller uid, if authenticated
    pub fn uid(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.uid.as_str())
    }
}
