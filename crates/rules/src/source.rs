//! Classification of rule files by their text
//!
//! A rule file is the temporary allow-all kind when an unconditional
//! `allow` sits inside a recursive wildcard `match` (`{name=**}`). Anything
//! else is treated as production rules; unconditional allows elsewhere are
//! still reported.

use crate::policy::RulesetKind;
use boofer_core::error::{Error, Result, ResultExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;

static RECURSIVE_MATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bmatch\s+\S*\{\w+=\*\*\}").expect("valid regex"));

static UNCONDITIONAL_ALLOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\ballow\s+[a-z,\s]+(:\s*if\s+true\s*)?;").expect("valid regex")
});

/// Kind of finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// A `match` on `{name=**}`
    RecursiveWildcard,
    /// `allow ...: if true` or `allow ...;` without a condition
    UnconditionalAllow,
    /// An unconditional allow inside a recursive wildcard
    AllowAll,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::RecursiveWildcard => f.write_str("recursive wildcard"),
            FindingKind::UnconditionalAllow => f.write_str("unconditional allow"),
            FindingKind::AllowAll => f.write_str("allow-all"),
        }
    }
}

/// One notable statement in a rule file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// 1-based line the statement starts on
    pub line: usize,
    /// What was found
    pub kind: FindingKind,
    /// Statement text with whitespace collapsed
    pub text: String,
}

/// Classified rule file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesSource {
    /// Inferred rule set kind
    pub kind: RulesetKind,
    /// Notable statements, in file order
    pub findings: Vec<Finding>,
}

/// Classify rule-file text
///
/// Statements may span lines; comments are ignored.
pub fn classify_rules_source(text: &str) -> RulesSource {
    let code = strip_comments(text);
    let mut findings = Vec::new();

    // Byte ranges of recursive match blocks, header included
    let mut recursive_blocks = Vec::new();
    for m in RECURSIVE_MATCH.find_iter(&code) {
        let end = code[m.end()..]
            .find('{')
            .map_or(code.len(), |open| closing_brace(&code, m.end() + open));
        recursive_blocks.push(m.start()..end);
        findings.push(finding(text, &code, m.start(), m.end(), FindingKind::RecursiveWildcard));
    }

    let mut allow_all = false;
    for m in UNCONDITIONAL_ALLOW.find_iter(&code) {
        let kind = if recursive_blocks.iter().any(|block| block.contains(&m.start())) {
            allow_all = true;
            FindingKind::AllowAll
        } else {
            FindingKind::UnconditionalAllow
        };
        findings.push(finding(text, &code, m.start(), m.end(), kind));
    }
    findings.sort_by_key(|f| f.line);

    let kind = if allow_all {
        RulesetKind::TemporaryTesting
    } else {
        RulesetKind::Production
    };
    RulesSource { kind, findings }
}

fn finding(text: &str, code: &str, start: usize, end: usize, kind: FindingKind) -> Finding {
    Finding {
        line: text[..start].matches('\n').count() + 1,
        kind,
        text: code[start..end].split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Offset just past the brace closing the one at `open`
///
/// Path captures like `{userId}` are balanced, so plain counting works.
fn closing_brace(code: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, c) in code[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return open + i + 1;
                }
            }
            _ => {}
        }
    }
    code.len()
}

/// Blank out `//` and `/* */` comments, keeping byte offsets and newlines
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('\'' | '"', _) => {
                quote = Some(c);
                out.push(c);
            }
            ('/', Some('/')) => {
                out.push(' ');
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    blank(&mut out, next);
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                out.push_str("  ");
                let mut previous = ' ';
                for next in chars.by_ref() {
                    blank(&mut out, next);
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

/// Read and classify a rule file
pub fn classify_rules_file(path: &Path) -> Result<RulesSource> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let text = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Reading rules file {}", path.display()))?;
    Ok(classify_rules_source(&text))
}
