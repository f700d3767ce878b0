//! Type-String Mapper — turns one type notation string into a structured
//! [`TypeExpr`].
//!
//! Handles array notations (`T[]`, `Array.<T>`), generics, nullable and
//! optional markers, the `external:`/`module:` prefixes, and trimming of
//! qualifiers that are redundant inside the enclosing container.

use crate::model::TypeExpr;
use regex::Regex;
use std::sync::LazyLock;

static RE_ARRAY_GENERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^array\.?<(.*)>$").unwrap());

static RE_GENERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_$][\w$.:~#]*?)\.?<(.*)>$").unwrap());

/// Map a list of type names element-wise into the uniform union wrapper.
///
/// The wrapper is kept even for a single-element list, so single- and
/// multi-type annotations produce the same shape downstream. An empty list
/// is missing type information and maps to `any`.
pub fn map_type_names(names: &[String], owner: &str) -> TypeExpr {
    if names.is_empty() {
        return TypeExpr::Any;
    }
    TypeExpr::Union(names.iter().map(|name| map_type_name(name, owner)).collect())
}

/// Map a single type notation string.
///
/// `owner` is the qualifier path of the enclosing container (empty at top
/// level); references it already covers are emitted unqualified.
pub fn map_type_name(name: &str, owner: &str) -> TypeExpr {
    let name = name.trim();

    // Nullable / non-null / optional markers.
    if let Some(inner) = name.strip_prefix('?') {
        if !inner.is_empty() {
            return TypeExpr::Union(vec![
                map_type_name(inner, owner),
                TypeExpr::Name("null".to_string()),
            ]);
        }
    }
    if let Some(inner) = name.strip_prefix('!') {
        return map_type_name(inner, owner);
    }
    let name = name.strip_suffix('=').unwrap_or(name).trim();

    if name.is_empty() || name == "*" {
        return TypeExpr::Any;
    }
    if let Some(inner) = name.strip_suffix("[]") {
        return TypeExpr::Array(Box::new(map_type_name(inner, owner)));
    }
    if let Some(caps) = RE_ARRAY_GENERIC.captures(name) {
        return TypeExpr::Array(Box::new(map_type_name(&caps[1], owner)));
    }
    if name.eq_ignore_ascii_case("array") {
        return TypeExpr::Array(Box::new(TypeExpr::Any));
    }
    if let Some(caps) = RE_GENERIC.captures(name) {
        let base = normalize_reference(&caps[1], owner);
        let args = split_generic_args(&caps[2])
            .into_iter()
            .map(|arg| map_type_name(&arg, owner))
            .collect();
        return TypeExpr::Generic { base, args };
    }
    match name {
        "bool" | "boolean" => return TypeExpr::Name("boolean".to_string()),
        "function" => return TypeExpr::Name("Function".to_string()),
        _ => {}
    }
    if name.starts_with("external:") {
        return TypeExpr::Any;
    }
    TypeExpr::Name(normalize_reference(name, owner))
}

/// Canonical form of a longname or memberof path: doc-generator prefixes
/// dropped, instance/inner separators folded into plain dots.
pub fn canonical_path(path: &str) -> String {
    let path = path.strip_prefix("module:").unwrap_or(path);
    path.replace(['~', '#'], ".")
}

/// Does this notation describe an array shape (`Object[]`, `Array.<T>`,
/// bare `array`)? Used to decide whether a structural parameter's
/// synthesized interface is referenced directly or as an array.
pub fn is_array_notation(name: &str) -> bool {
    let name = name.trim();
    name.ends_with("[]") || RE_ARRAY_GENERIC.is_match(name) || name.eq_ignore_ascii_case("array")
}

/// Normalize a named reference: strip doc-generator path prefixes and trim
/// qualifiers the enclosing container already provides.
fn normalize_reference(name: &str, owner: &str) -> String {
    let mut name = name.trim().to_string();
    if let Some(rest) = name.strip_prefix("module:") {
        name = rest.to_string();
    }
    name = name.replace(['~', '#'], ".");

    if owner.is_empty() {
        return name;
    }
    let owner = canonical_path(owner);
    if name == owner {
        return last_segment(&owner).to_string();
    }
    // Trim the longest enclosing-path prefix: a sibling of the container
    // (or of any ancestor) is reachable unqualified from inside it.
    let mut ancestor = owner.as_str();
    loop {
        let prefix = format!("{}.", ancestor);
        if let Some(rest) = name.strip_prefix(&prefix) {
            return rest.to_string();
        }
        match ancestor.rfind('.') {
            Some(idx) => ancestor = &ancestor[..idx],
            None => break,
        }
    }
    name
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Split generic arguments on top-level commas.
fn split_generic_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in args.chars() {
        match c {
            '<' | '(' => {
                depth += 1;
                current.push(c);
            }
            '>' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}
