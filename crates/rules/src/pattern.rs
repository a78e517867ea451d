//! `match` path patterns
//!
//! Patterns use the rules syntax: literal segments, `{name}` captures one
//! segment and `{name=**}` captures the rest of the path (zero or more
//! segments).

use crate::request::DocumentPath;
use boofer_core::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
    Rest(String),
}

/// Parsed `match` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

/// Values bound by a successful match
pub type Captures = BTreeMap<String, String>;

impl PathPattern {
    /// Parse a pattern such as `/users/{userId}`
    pub fn parse(pattern: &str) -> Result<Self> {
        let body = pattern.trim().trim_start_matches('/');
        if body.is_empty() {
            return Err(Error::invalid_input("Match pattern is empty"));
        }

        let mut segments = Vec::new();
        let parts: Vec<&str> = body.split('/').collect();
        for (index, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(inner) => match inner.strip_suffix("=**") {
                    Some(name) if index + 1 == parts.len() => Segment::Rest(name.to_string()),
                    Some(_) => {
                        return Err(Error::invalid_input(format!(
                            "Recursive wildcard must be the last segment: {pattern}"
                        )));
                    }
                    None => Segment::Capture(inner.to_string()),
                },
                None if part.is_empty() => {
                    return Err(Error::invalid_input(format!("Empty segment in pattern: {pattern}")));
                }
                None => Segment::Literal((*part).to_string()),
            };
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// Match a document path, returning the captured variables
    pub fn matches(&self, path: &DocumentPath) -> Option<Captures> {
        let mut captures = Captures::new();
        let segments = path.segments();

        for (index, pattern) in self.segments.iter().enumerate() {
            match pattern {
                Segment::Rest(name) => {
                    let rest = segments.get(index..).unwrap_or_default();
                    captures.insert(name.clone(), rest.join("/"));
                    return Some(captures);
                }
                Segment::Literal(literal) => {
                    if segments.get(index) != Some(literal) {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    captures.insert(name.clone(), segments.get(index)?.clone());
                }
            }
        }

        (segments.len() == self.segments.len()).then_some(captures)
    }

    /// Whether the pattern ends in a recursive wildcard
    pub fn is_recursive(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Rest(_)))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => write!(f, "/{s}")?,
                Segment::Capture(s) => write!(f, "/{{{s}}}")?,
                Segment::Rest(s) => write!(f, "/{{{s}=**}}")?,
            }
        }
        Ok(())
    }
}
