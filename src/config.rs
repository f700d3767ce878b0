//! Parser configuration — programmatic object plus loading from a
//! JSON-with-comments file.

use crate::error::Error;
use crate::parser::since::VersionComparator;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Runtime configuration for a [`Parser`](crate::parser::Parser).
#[derive(Debug, Default, Clone)]
pub struct Config {
    /// Doclet scopes excluded from output (e.g. `inner`).
    pub ignore_scopes: Vec<String>,
    /// Target release; items with a later `@since` are excluded.
    pub latest_version: Option<String>,
    pub comparator: VersionComparator,
    /// Accept every item regardless of its `@since` tag.
    pub ignore_since_tag: bool,
    /// Report version-gate rejections on the sink.
    pub log_items_skipped_by_since: bool,
    /// Exclude doclets without a doc comment.
    pub skip_undocumented: bool,
    /// Pass `@example` blocks through to the output.
    pub include_examples: bool,
}

/// Raw file form. The comparator arrives as a JSON value and is validated
/// into [`VersionComparator`] — dynamic comparator forms (inline source
/// text, script paths) are not supported and fail fast.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FileConfig {
    ignore_scopes: Vec<String>,
    latest_version: Option<String>,
    version_comparator: Option<serde_json::Value>,
    ignore_since_tag: bool,
    log_items_skipped_by_since: bool,
    skip_undocumented: bool,
    include_examples: bool,
}

impl Config {
    /// Load configuration from a JSON-with-comments file.
    pub fn from_file(path: &Path) -> Result<Config, Error> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Config::from_json_str(&text)
    }

    /// Parse configuration from JSON-with-comments text.
    pub fn from_json_str(text: &str) -> Result<Config, Error> {
        let raw: FileConfig = serde_json::from_str(&strip_comments(text))?;

        let comparator = match raw.version_comparator {
            None => VersionComparator::default(),
            Some(serde_json::Value::String(name)) => VersionComparator::from_name(&name)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "unknown version comparator '{}'; built-ins: {}",
                        name,
                        VersionComparator::BUILT_IN_NAMES.join(", ")
                    ))
                })?,
            Some(other) => {
                return Err(Error::Config(format!(
                    "versionComparator must name a built-in comparator, got {}",
                    other
                )));
            }
        };

        Ok(Config {
            ignore_scopes: raw.ignore_scopes,
            latest_version: raw.latest_version,
            comparator,
            ignore_since_tag: raw.ignore_since_tag,
            log_items_skipped_by_since: raw.log_items_skipped_by_since,
            skip_undocumented: raw.skip_undocumented,
            include_examples: raw.include_examples,
        })
    }
}

/// Blank out `//` and `/* */` comments outside string literals.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let config = Config::default();
        assert!(config.ignore_scopes.is_empty());
        assert!(!config.ignore_since_tag);
        assert!(!config.skip_undocumented);
    }

    #[test]
    fn parses_commented_json() {
        let text = r#"{
            // target release
            "latestVersion": "1.2.0",
            /* excluded scopes */
            "ignoreScopes": ["inner"],
            "skipUndocumented": true
        }"#;
        let config = Config::from_json_str(text).unwrap();
        assert_eq!(config.latest_version.as_deref(), Some("1.2.0"));
        assert_eq!(config.ignore_scopes, ["inner"]);
        assert!(config.skip_undocumented);
    }

    #[test]
    fn comment_markers_inside_strings_survive() {
        let text = r#"{"latestVersion": "1.0.0 // not a comment"}"#;
        let config = Config::from_json_str(text).unwrap();
        assert_eq!(config.latest_version.as_deref(), Some("1.0.0 // not a comment"));
    }

    #[test]
    fn named_builtin_comparator_accepted() {
        let config = Config::from_json_str(r#"{"versionComparator": "semver"}"#).unwrap();
        assert!(matches!(config.comparator, VersionComparator::Semver));
    }

    #[test]
    fn unknown_comparator_fails_fast() {
        let err = Config::from_json_str(r#"{"versionComparator": "./compare.js"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_string_comparator_fails_fast() {
        let err = Config::from_json_str(r#"{"versionComparator": 42}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
