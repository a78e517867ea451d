//! Release signing properties
//!
//! The Gradle build signs release artifacts with the keystore described in
//! `key.properties` when that file exists. This module reads the same file
//! so its completeness can be checked before a release build.

use boofer_core::error::{Error, ErrorCode, Result, ResultExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Keys the release signing config reads
pub const REQUIRED_KEYS: [&str; 4] = ["keyAlias", "keyPassword", "storeFile", "storePassword"];

/// Parsed `key.properties`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SigningProperties {
    values: BTreeMap<String, String>,
}

impl SigningProperties {
    /// Load from a file; `Ok(None)` when it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(Error::from)
            .context(format!("Reading {}", path.display()))?;
        Self::parse(&content).map(Some).map_err(|e| {
            let at = match &e.context {
                Some(line) => format!("{}, {line}", path.display()),
                None => path.display().to_string(),
            };
            e.with_context(format!("Parsing {at}"))
        })
    }

    /// Parse Java properties text the way `Properties.load` reads it
    ///
    /// Handles `#` and `!` comments, `=`, `:` or whitespace separators,
    /// backslash escapes including `\uXXXX`, and lines continued with a
    /// trailing backslash. Later keys win.
    pub fn parse(content: &str) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (line, entry) in logical_lines(content) {
            let (key, value) = split_entry(&entry);
            let key = unescape(key).map_err(|e| e.with_context(format!("line {line}")))?;
            let value = unescape(value).map_err(|e| e.with_context(format!("line {line}")))?;
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    /// Value of a property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Required keys that are absent or empty
    pub fn missing_keys(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| self.get(key).is_none_or(str::is_empty))
            .collect()
    }

    /// Whether a release build can be signed
    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }

    /// Keystore path, resolved against the properties file's directory
    pub fn store_file(&self, properties_dir: &Path) -> Option<std::path::PathBuf> {
        self.get("storeFile").map(|file| properties_dir.join(file))
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// Join continued lines, dropping blanks and comments; yields 1-based start lines
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut logical = Vec::new();
    let mut natural = content.lines().enumerate();

    while let Some((index, raw)) = natural.next() {
        let mut current = raw.trim_start_matches(is_blank);
        if current.is_empty() || current.starts_with(['#', '!']) {
            continue;
        }

        let mut entry = String::new();
        loop {
            let trailing = current.chars().rev().take_while(|&c| c == '\\').count();
            if trailing % 2 == 0 {
                entry.push_str(current);
                break;
            }
            entry.push_str(&current[..current.len() - 1]);
            match natural.next() {
                Some((_, next)) => current = next.trim_start_matches(is_blank),
                None => break,
            }
        }
        logical.push((index + 1, entry));
    }
    logical
}

/// Split at the first unescaped `=`, `:` or whitespace
fn split_entry(entry: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = entry.len();
    for (i, c) in entry.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let rest = entry[key_end..].trim_start_matches(is_blank);
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&entry[..key_end], rest.trim_start_matches(is_blank))
}

fn unescape(text: &str) -> Result<String> {
    // `\uXXXX` escapes are UTF-16 code units, so surrogate pairs arrive in halves
    let mut units: Vec<u16> = Vec::with_capacity(text.len());
    let mut buf = [0u16; 2];
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        let c = if c == '\\' {
            match chars.next() {
                Some('t') => '\t',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\u{c}',
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let unit = (hex.len() == 4)
                        .then(|| u16::from_str_radix(&hex, 16).ok())
                        .flatten()
                        .ok_or_else(|| {
                            Error::new(ErrorCode::InvalidFormat, format!("Malformed \\uxxxx encoding: \\u{hex}"))
                        })?;
                    units.push(unit);
                    continue;
                }
                Some(other) => other,
                None => break,
            }
        } else {
            c
        };
        units.extend_from_slice(c.encode_utf16(&mut buf));
    }
    Ok(String::from_utf16_lossy(&units))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_properties() {
        let props = SigningProperties::parse(
            "# release keystore\nkeyAlias=upload\nkeyPassword = s3cret\n! legacy\nstoreFile: upload.jks\nstorePassword=s3cret\n",
        )
        .unwrap();
        assert_eq!(props.get("keyAlias"), Some("upload"));
        assert_eq!(props.get("keyPassword"), Some("s3cret"));
        assert_eq!(props.get("storeFile"), Some("upload.jks"));
        assert!(props.is_complete());
    }

    #[test]
    fn test_missing_and_empty_keys() {
        let props = SigningProperties::parse("keyAlias=upload\nstorePassword=\n").unwrap();
        assert_eq!(props.missing_keys(), vec!["keyPassword", "storeFile", "storePassword"]);
    }

    #[test]
    fn test_value_may_contain_separator() {
        let props = SigningProperties::parse("storeFile=C:/keys/upload.jks").unwrap();
        assert_eq!(props.get("storeFile"), Some("C:/keys/upload.jks"));
    }

    #[test]
    fn test_windows_path_backslashes_are_unescaped() {
        let props = SigningProperties::parse(r"storeFile=C:\\Users\\dev\\upload.jks").unwrap();
        assert_eq!(props.get("storeFile"), Some(r"C:\Users\dev\upload.jks"));
    }

    #[test]
    fn test_escapes_and_whitespace_separator() {
        let props = SigningProperties::parse(
            "key\\:Alias = up\\=load\nstorePassword s3cret\nkeyPassword:\\u00e9t\\u00e9\\t!\n",
        )
        .unwrap();
        assert_eq!(props.get("key:Alias"), Some("up=load"));
        assert_eq!(props.get("storePassword"), Some("s3cret"));
        assert_eq!(props.get("keyPassword"), Some("\u{e9}t\u{e9}\t!"));
    }

    #[test]
    fn test_continuation_lines() {
        let props = SigningProperties::parse(
            "storeFile=/home/dev/\\\n    keys/upload.jks\nkeyAlias=a\\\\\nkeyPassword=p\n",
        )
        .unwrap();
        assert_eq!(props.get("storeFile"), Some("/home/dev/keys/upload.jks"));
        assert_eq!(props.get("keyAlias"), Some("a\\"));
        assert_eq!(props.get("keyPassword"), Some("p"));
    }

    #[test]
    fn test_malformed_unicode_escape() {
        let err = SigningProperties::parse("keyAlias=\\u12\n").unwrap_err();
        assert_eq!(err.code, boofer_core::error::ErrorCode::InvalidFormat);
        assert_eq!(err.context.as_deref(), Some("line 1"));
    }

    #[test]
    fn test_load_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = SigningProperties::load(&dir.path().join("key.properties")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_and_resolve_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.properties");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "storeFile=upload.jks").unwrap();

        let props = SigningProperties::load(&path).unwrap().unwrap();
        assert_eq!(props.store_file(dir.path()), Some(dir.path().join("upload.jks")));
        assert!(!props.is_complete());
    }
}
