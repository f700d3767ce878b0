//! Membership Resolver — stitches the flat fragment table into a nested
//! declaration tree by walking each fragment's dotted `memberof` path.
//!
//! Parents are resolved by name lookup in a second pass, so doclets may
//! arrive in any order. An unresolvable parent demotes to a warning and the
//! fragment surfaces at top level; a parent that was intentionally rejected
//! suppresses the fragment and everything below it.

use crate::model::{Access, Body, DeclarationTree, Fragment};
use crate::parser::types::canonical_path;
use crate::parser::FragmentTable;
use crate::sink::DiagnosticSink;
use std::collections::{HashMap, HashSet};

/// Resolve every table entry, in first-encounter order.
pub fn resolve(
    table: FragmentTable,
    mut rejected: HashSet<String>,
    sink: &dyn DiagnosticSink,
) -> DeclarationTree {
    let (mut entries, order) = table.into_parts();
    let mut tree = DeclarationTree::new();
    let mut done: HashSet<String> = HashSet::new();

    for key in &order {
        resolve_one(key, &mut entries, &mut done, &mut rejected, &mut tree, sink);
    }
    dedupe_inherited(&mut tree);
    tree
}

fn resolve_one(
    key: &str,
    entries: &mut HashMap<String, Vec<Fragment>>,
    done: &mut HashSet<String>,
    rejected: &mut HashSet<String>,
    tree: &mut DeclarationTree,
    sink: &dyn DiagnosticSink,
) {
    if !done.insert(key.to_string()) {
        return;
    }
    let Some(fragments) = entries.remove(key) else {
        return;
    };
    let memberof = fragments.first().and_then(|f| f.memberof.clone());
    let Some(raw_path) = memberof else {
        promote(tree, key, fragments);
        return;
    };
    let path = canonical_path(&raw_path);

    // Resolve any pending entry along the parent chain first, so nesting
    // does not depend on doclet arrival order.
    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
    for i in 1..=segments.len() {
        let prefix = segments[..i].join(".");
        if prefix != key && entries.contains_key(&prefix) {
            resolve_one(&prefix, entries, done, rejected, tree, sink);
        }
    }

    match walk_tree(tree, &segments) {
        Some(parent) => {
            for fragment in fragments {
                attach(parent, fragment, sink);
            }
        }
        None if rejected.contains(&path) => {
            // Parent intentionally excluded; the exclusion cascades.
            rejected.insert(key.to_string());
        }
        None => {
            sink.warn(&format!(
                "cannot resolve parent '{}' of {}, emitting at top level",
                raw_path, key
            ));
            promote(tree, key, fragments);
        }
    }
}

/// Locate the container a dotted path names: the first segment among
/// top-level declarations, each further segment among the current
/// container's members.
fn walk_tree<'t>(tree: &'t mut DeclarationTree, segments: &[String]) -> Option<&'t mut Fragment> {
    let group = tree.get_mut(&segments[0])?;
    let mut current = group.iter_mut().find(|f| f.members().is_some())?;
    for segment in &segments[1..] {
        current = current
            .members_mut()?
            .iter_mut()
            .find(|m| m.name == *segment && m.members().is_some())?;
    }
    Some(current)
}

fn promote(tree: &mut DeclarationTree, key: &str, fragments: Vec<Fragment>) {
    for fragment in fragments {
        if matches!(fragment.body, Body::Enum { .. }) {
            if let Some(existing) = tree
                .get_mut(key)
                .and_then(|group| group.iter_mut().find(|f| matches!(f.body, Body::Enum { .. })))
            {
                merge_enum(existing, fragment);
                continue;
            }
        }
        tree.push(key, fragment);
    }
}

/// Idempotent enum merge: members joining by name.
fn merge_enum(existing: &mut Fragment, incoming: Fragment) {
    let Body::Enum { members: incoming_members } = incoming.body else {
        return;
    };
    let Some(members) = existing.members_mut() else {
        return;
    };
    for member in incoming_members {
        if !members.iter().any(|m| m.name == member.name) {
            members.push(member);
        }
    }
}

/// Attach one fragment as a member of a resolved parent, converting its
/// shape to what the container kind expects.
fn attach(parent: &mut Fragment, mut fragment: Fragment, sink: &dyn DiagnosticSink) {
    fragment.modifiers.export = fragment.modifiers.access != Access::Private;
    let parent_name = parent.name.clone();
    let parent_kind = parent.body.kind_name();

    match &mut parent.body {
        Body::Class { members, .. } | Body::Interface { members } => {
            match callable_member(fragment) {
                Ok(member) => members.push(member),
                Err(rejected) => warn_unsupported(&rejected, parent_kind, &parent_name, sink),
            }
        }
        Body::Namespace { members } | Body::Module { members } => {
            if matches!(fragment.body, Body::Enum { .. }) {
                if let Some(existing) = members
                    .iter_mut()
                    .find(|m| m.name == fragment.name && matches!(m.body, Body::Enum { .. }))
                {
                    merge_enum(existing, fragment);
                    return;
                }
            }
            match namespace_member(fragment) {
                Ok(member) => members.push(member),
                Err(rejected) => warn_unsupported(&rejected, parent_kind, &parent_name, sink),
            }
        }
        Body::Enum { members } => {
            if matches!(fragment.body, Body::EnumMember { .. }) {
                if !members.iter().any(|m| m.name == fragment.name) {
                    members.push(fragment);
                }
            } else {
                warn_unsupported(&fragment, parent_kind, &parent_name, sink);
            }
        }
        _ => warn_unsupported(&fragment, parent_kind, &parent_name, sink),
    }
}

/// Shape rules for class and interface containers: a plain function becomes
/// a method, a constant becomes a readonly property.
fn callable_member(fragment: Fragment) -> Result<Fragment, Fragment> {
    let mut fragment = fragment;
    match fragment.body {
        Body::Function(signature) => {
            fragment.body = Body::Method(signature);
            Ok(fragment)
        }
        Body::Const { ty } => {
            fragment.body = Body::Property { ty };
            fragment.modifiers.readonly = true;
            Ok(fragment)
        }
        Body::Method(_) | Body::Constructor(_) | Body::Property { .. } => Ok(fragment),
        _ => Err(fragment),
    }
}

/// Shape rules for namespace and module containers.
fn namespace_member(fragment: Fragment) -> Result<Fragment, Fragment> {
    match fragment.body {
        Body::Function(_)
        | Body::Class { .. }
        | Body::Interface { .. }
        | Body::Namespace { .. }
        | Body::Enum { .. }
        | Body::Const { .. }
        | Body::Property { .. }
        | Body::TypeAlias { .. } => Ok(fragment),
        _ => Err(fragment),
    }
}

fn warn_unsupported(
    fragment: &Fragment,
    parent_kind: &str,
    parent_name: &str,
    sink: &dyn DiagnosticSink,
) {
    sink.warn(&format!(
        "cannot attach {} '{}' to {} '{}', dropping member",
        fragment.body.kind_name(),
        fragment.name,
        parent_kind,
        parent_name
    ));
}

// -- Inheritance deduplication ------------------------------------------------

/// Members a derived class repeats from its base are emitted once, on the
/// base. Constructors are never deduplicated.
fn dedupe_inherited(tree: &mut DeclarationTree) {
    let mut index: HashMap<String, HashSet<String>> = HashMap::new();
    for (_, group) in tree.iter() {
        for fragment in group {
            collect_member_names(fragment, &mut index);
        }
    }
    for group in tree.values_mut() {
        for fragment in group.iter_mut() {
            strip_inherited(fragment, &index);
        }
    }
}

fn collect_member_names(fragment: &Fragment, index: &mut HashMap<String, HashSet<String>>) {
    if matches!(fragment.body, Body::Class { .. } | Body::Interface { .. }) {
        let names: HashSet<String> = fragment
            .members()
            .into_iter()
            .flatten()
            .filter(|m| !matches!(m.body, Body::Constructor(_)))
            .map(|m| m.name.clone())
            .collect();
        index.entry(fragment.name.clone()).or_default().extend(names.clone());
        let long = canonical_path(&fragment.longname);
        if long != fragment.name {
            index.entry(long).or_default().extend(names);
        }
    }
    for member in fragment.members().into_iter().flatten() {
        collect_member_names(member, index);
    }
}

fn strip_inherited(fragment: &mut Fragment, index: &HashMap<String, HashSet<String>>) {
    if let Body::Class { base: Some(base), members } = &mut fragment.body {
        let base_members = index
            .get(base.as_str())
            .or_else(|| index.get(&canonical_path(base)));
        if let Some(base_members) = base_members {
            members.retain(|m| {
                matches!(m.body, Body::Constructor(_)) || !base_members.contains(&m.name)
            });
        }
    }
    for member in fragment.members_mut().into_iter().flatten() {
        strip_inherited(member, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::doclet::Doclet;
    use crate::parser::Parser;
    use crate::sink::MemorySink;
    use std::sync::Arc;

    fn doclets(json: serde_json::Value) -> Vec<Doclet> {
        serde_json::from_value(json).unwrap()
    }

    fn parse(json: serde_json::Value) -> (DeclarationTree, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let parser = Parser::with_sink(Config::default(), sink.clone());
        let tree = parser.parse(&doclets(json)).unwrap();
        (tree, sink)
    }

    #[test]
    fn members_nest_under_their_containers() {
        let (tree, _) = parse(serde_json::json!([
            {"kind": "namespace", "name": "app", "longname": "app"},
            {"kind": "class", "name": "Widget", "longname": "app.Widget", "memberof": "app"},
            {"kind": "function", "name": "render", "longname": "app.Widget#render",
             "memberof": "app.Widget"}
        ]));
        assert_eq!(tree.len(), 1);
        let app = &tree.get("app").unwrap()[0];
        let Body::Namespace { members } = &app.body else { panic!() };
        assert_eq!(members.len(), 1);
        let widget = &members[0];
        let Body::Class { members, .. } = &widget.body else { panic!() };
        // Constructor plus the render method.
        let render = members.iter().find(|m| m.name == "render").unwrap();
        assert!(matches!(render.body, Body::Method(_)));
    }

    #[test]
    fn nesting_is_arrival_order_independent() {
        let (tree, _) = parse(serde_json::json!([
            {"kind": "function", "name": "render", "longname": "app.Widget#render",
             "memberof": "app.Widget"},
            {"kind": "class", "name": "Widget", "longname": "app.Widget", "memberof": "app"},
            {"kind": "namespace", "name": "app", "longname": "app"}
        ]));
        assert_eq!(tree.len(), 1);
        let app = &tree.get("app").unwrap()[0];
        let Body::Namespace { members } = &app.body else { panic!() };
        let Body::Class { members, .. } = &members[0].body else { panic!() };
        assert!(members.iter().any(|m| m.name == "render"));
    }

    #[test]
    fn unresolved_parent_promotes_with_warning() {
        let (tree, sink) = parse(serde_json::json!([
            {"kind": "function", "name": "orphan", "longname": "missing.orphan",
             "memberof": "missing"}
        ]));
        assert!(tree.get("missing.orphan").is_some());
        assert!(sink.contains("cannot resolve parent"));
    }

    #[test]
    fn member_of_rejected_parent_drops_silently_and_cascades() {
        let parser = Parser::with_sink(
            Config {
                latest_version: Some("1.0.0".into()),
                ..Config::default()
            },
            Arc::new(MemorySink::new()),
        );
        let tree = parser
            .parse(&doclets(serde_json::json!([
                {"kind": "namespace", "name": "late", "longname": "late", "since": "3.0.0"},
                {"kind": "class", "name": "K", "longname": "late.K", "memberof": "late"},
                {"kind": "function", "name": "m", "longname": "late.K#m", "memberof": "late.K"}
            ])))
            .unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn base_class_members_not_duplicated_on_derived() {
        let (tree, _) = parse(serde_json::json!([
            {"kind": "class", "name": "A", "longname": "A"},
            {"kind": "function", "name": "memberOfA", "longname": "A#memberOfA",
             "memberof": "A"},
            {"kind": "class", "name": "B", "longname": "B", "augments": ["A"]},
            {"kind": "function", "name": "memberOfA", "longname": "B#memberOfA",
             "memberof": "B"},
            {"kind": "function", "name": "memberOfB", "longname": "B#memberOfB",
             "memberof": "B"}
        ]));
        let b = &tree.get("B").unwrap()[0];
        let Body::Class { base, members } = &b.body else { panic!() };
        assert_eq!(base.as_deref(), Some("A"));
        let method_names: Vec<&str> = members
            .iter()
            .filter(|m| matches!(m.body, Body::Method(_)))
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(method_names, ["memberOfB"]);

        let a = &tree.get("A").unwrap()[0];
        let Body::Class { members, .. } = &a.body else { panic!() };
        assert!(members.iter().any(|m| m.name == "memberOfA"));
    }

    #[test]
    fn enum_members_dedupe_across_repeated_doclets() {
        let (tree, _) = parse(serde_json::json!([
            {"kind": "namespace", "name": "app", "longname": "app"},
            {"kind": "member", "name": "Color", "longname": "app.Color", "memberof": "app",
             "isEnum": true,
             "properties": [{"name": "RED", "type": {"names": ["number"]}, "defaultvalue": 0}]},
            {"kind": "member", "name": "Color", "longname": "app.Color", "memberof": "app",
             "isEnum": true,
             "properties": [{"name": "RED", "type": {"names": ["number"]}, "defaultvalue": 0},
                             {"name": "BLUE", "type": {"names": ["number"]}, "defaultvalue": 1}]}
        ]));
        let app = &tree.get("app").unwrap()[0];
        let Body::Namespace { members } = &app.body else { panic!() };
        let color = members.iter().find(|m| m.name == "Color").unwrap();
        let Body::Enum { members } = &color.body else { panic!() };
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["RED", "BLUE"]);
    }

    #[test]
    fn overloads_attach_as_sibling_methods() {
        let (tree, _) = parse(serde_json::json!([
            {"kind": "class", "name": "Conv", "longname": "Conv", "hideconstructor": true},
            {"kind": "function", "name": "run", "longname": "Conv#run", "memberof": "Conv",
             "params": [{"name": "v", "type": {"names": ["string", "number"]}}]}
        ]));
        let conv = &tree.get("Conv").unwrap()[0];
        let Body::Class { members, .. } = &conv.body else { panic!() };
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.name == "run"));
    }
}
