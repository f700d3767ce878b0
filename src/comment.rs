//! Doc-comment normalizer — raw annotated comment text in, cleaned output
//! lines out.
//!
//! Strips the comment delimiters, keeps the leading description (a
//! `@description` tag body wins over it when both are present) and passes
//! through a fixed set of annotation tags; everything else is dropped.

use regex::Regex;
use std::sync::LazyLock;

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][A-Za-z0-9]*)\b[ \t]*(.*)$").unwrap());

/// Tags passed through to the output, in addition to the description.
const ALLOWED_TAGS: &[&str] = &[
    "author",
    "copyright",
    "deprecated",
    "returns",
    "see",
    "throws",
    "todo",
    "param",
    "tutorial",
    "variation",
    "version",
    "license",
];

/// Normalize a raw doc comment into output lines.
///
/// `@example` blocks are dropped unless `include_examples` is set. Returns
/// an empty list for an empty or description-less, tag-less comment.
pub fn normalize(raw: &str, include_examples: bool) -> Vec<String> {
    let stripped = strip_delimiters(raw);

    let mut description: Vec<String> = Vec::new();
    let mut tag_description: Vec<String> = Vec::new();
    let mut tag_lines: Vec<String> = Vec::new();

    // Which accumulator continuation lines currently extend.
    enum Section {
        Description,
        DescriptionTag,
        Kept,
        Dropped,
    }
    let mut section = Section::Description;

    for line in stripped.lines() {
        let line = line.trim_end();
        if let Some(caps) = RE_TAG_LINE.captures(line.trim_start()) {
            let tag = caps[1].to_lowercase();
            let text = caps[2].trim();
            if tag == "description" || tag == "desc" {
                tag_description.clear();
                if !text.is_empty() {
                    tag_description.push(text.to_string());
                }
                section = Section::DescriptionTag;
            } else if tag == "return" || tag == "returns" {
                tag_lines.push(join_tag("returns", text));
                section = Section::Kept;
            } else if tag == "example" {
                if include_examples {
                    tag_lines.push(join_tag("example", text));
                    section = Section::Kept;
                } else {
                    section = Section::Dropped;
                }
            } else if ALLOWED_TAGS.contains(&tag.as_str()) {
                tag_lines.push(join_tag(&tag, text));
                section = Section::Kept;
            } else {
                section = Section::Dropped;
            }
            continue;
        }

        match section {
            Section::Description => description.push(line.to_string()),
            Section::DescriptionTag => tag_description.push(line.to_string()),
            Section::Kept => {
                if !line.is_empty() {
                    tag_lines.push(line.to_string());
                }
            }
            Section::Dropped => {}
        }
    }

    if !tag_description.is_empty() {
        description = tag_description;
    }
    trim_blank_edges(&mut description);

    let mut out = description;
    if !out.is_empty() && !tag_lines.is_empty() {
        out.push(String::new());
    }
    out.extend(tag_lines);
    out
}

fn join_tag(tag: &str, text: &str) -> String {
    if text.is_empty() {
        format!("@{}", tag)
    } else {
        format!("@{} {}", tag, text)
    }
}

/// Remove `/** ... */` delimiters and the decorative leading `*` per line.
fn strip_delimiters(raw: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in raw.lines() {
        let mut text = line.trim_start();
        if text.starts_with("/**") {
            text = text[3..].trim_start();
        }
        if let Some(rest) = text.strip_suffix("*/") {
            text = rest.trim_end();
        }
        if let Some(rest) = text.strip_prefix('*') {
            text = rest.strip_prefix(' ').unwrap_or(rest);
        }
        out.push(text.to_string());
    }
    while out.first().is_some_and(|l| l.trim().is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn trim_blank_edges(lines: &mut Vec<String>) {
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_and_allowed_tags_survive() {
        let raw = "/**\n * Adds two numbers.\n * @param {number} a first\n * @param {number} b second\n * @returns {number} the sum\n */";
        let lines = normalize(raw, false);
        assert_eq!(lines[0], "Adds two numbers.");
        assert!(lines.contains(&"@param {number} a first".to_string()));
        assert!(lines.contains(&"@returns {number} the sum".to_string()));
    }

    #[test]
    fn unknown_tags_dropped() {
        let raw = "/**\n * Something.\n * @customtag noise\n * @see other\n */";
        let lines = normalize(raw, false);
        assert!(lines.iter().all(|l| !l.contains("customtag")));
        assert!(lines.contains(&"@see other".to_string()));
    }

    #[test]
    fn description_tag_overrides_leading_text() {
        let raw = "/**\n * Leading text.\n * @description Winning text.\n */";
        let lines = normalize(raw, false);
        assert_eq!(lines, vec!["Winning text.".to_string()]);
    }

    #[test]
    fn example_is_opt_in() {
        let raw = "/**\n * Fn.\n * @example\n * fn(1, 2);\n */";
        let without = normalize(raw, false);
        assert!(without.iter().all(|l| !l.contains("fn(1, 2)")));
        let with = normalize(raw, true);
        assert!(with.contains(&"@example".to_string()));
        assert!(with.contains(&"fn(1, 2);".to_string()));
    }

    #[test]
    fn empty_comment_yields_nothing() {
        assert!(normalize("", false).is_empty());
        assert!(normalize("/** */", false).is_empty());
    }

    #[test]
    fn return_synonym_normalizes() {
        let raw = "/**\n * Fn.\n * @return {number} result\n */";
        let lines = normalize(raw, false);
        assert!(lines.contains(&"@returns {number} result".to_string()));
    }
}
