//! Parser — drives the doclet pipeline: filtering, mapping into the flat
//! fragment table, then membership resolution into the declaration tree.

pub mod mapper;
pub mod merge;
pub mod since;
pub mod types;

use crate::config::Config;
use crate::doclet::Doclet;
use crate::error::Error;
use crate::model::{Body, DeclarationTree, Fragment};
use crate::sink::{DiagnosticSink, TracingSink};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Flat mapping from canonical longname to the fragments produced for it,
/// in first-encounter order. Several fragments under one key form an
/// overload group.
#[derive(Debug, Default)]
pub struct FragmentTable {
    entries: HashMap<String, Vec<Fragment>>,
    order: Vec<String>,
}

impl FragmentTable {
    /// Insert a fragment under its canonical longname. Re-encountering a
    /// longname appends rather than overwrites; a class fragment arriving
    /// for an existing class contributes only its constructors.
    pub fn insert(&mut self, fragment: Fragment) {
        let key = types::canonical_path(&fragment.longname);

        if let Body::Class { members, .. } = &fragment.body {
            let existing_class = self
                .entries
                .get_mut(&key)
                .and_then(|list| list.iter_mut().find(|f| matches!(f.body, Body::Class { .. })));
            if let Some(class) = existing_class {
                let constructors: Vec<Fragment> = members
                    .iter()
                    .filter(|m| matches!(m.body, Body::Constructor(_)))
                    .cloned()
                    .collect();
                class
                    .members_mut()
                    .expect("class fragment")
                    .extend(constructors);
                return;
            }
        }

        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.entry(key).or_default().push(fragment);
    }

    pub fn get(&self, longname: &str) -> Option<&Vec<Fragment>> {
        self.entries.get(&types::canonical_path(longname))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn into_parts(self) -> (HashMap<String, Vec<Fragment>>, Vec<String>) {
        (self.entries, self.order)
    }
}

/// One-shot doclet parser. Not meant for concurrent use; create a fresh
/// instance per input set.
pub struct Parser {
    config: Config,
    sink: Arc<dyn DiagnosticSink>,
}

impl Parser {
    pub fn new(config: Config) -> Parser {
        Parser::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: Config, sink: Arc<dyn DiagnosticSink>) -> Parser {
        Parser { config, sink }
    }

    /// Run the full pipeline over an ordered doclet sequence.
    pub fn parse(&self, doclets: &[Doclet]) -> Result<DeclarationTree, Error> {
        let (table, rejected) = self.map_to_table(doclets)?;
        Ok(merge::resolve(table, rejected, self.sink.as_ref()))
    }

    /// Phase 1 alone: filter and map into the flat fragment table,
    /// recording rejected longnames. Exposed so the resolution pass can be
    /// exercised independently.
    pub fn map_to_table(
        &self,
        doclets: &[Doclet],
    ) -> Result<(FragmentTable, HashSet<String>), Error> {
        let mut table = FragmentTable::default();
        let mut rejected: HashSet<String> = HashSet::new();

        for doclet in doclets {
            if self.rejects(doclet) {
                rejected.insert(types::canonical_path(&doclet.longname));
                continue;
            }
            // A member of a rejected parent never reaches the table; the
            // suppression cascades through its own longname.
            if let Some(parent) = doclet.memberof.as_deref() {
                if rejected.contains(&types::canonical_path(parent)) {
                    rejected.insert(types::canonical_path(&doclet.longname));
                    continue;
                }
            }
            let fragments =
                mapper::map_doclet(doclet, self.config.include_examples, self.sink.as_ref())?;
            for fragment in fragments {
                table.insert(fragment);
            }
        }

        Ok((table, rejected))
    }

    /// Filtering ahead of mapping. Rejected longnames are recorded so their
    /// members are suppressed during resolution.
    fn rejects(&self, doclet: &Doclet) -> bool {
        if doclet.ignore || doclet.is_private() {
            return true;
        }
        if let Some(scope) = doclet.scope.as_deref() {
            if self.config.ignore_scopes.iter().any(|s| s == scope) {
                return true;
            }
        }
        if self.config.skip_undocumented
            && (doclet.undocumented || doclet.comment.trim().is_empty())
        {
            return true;
        }
        if !since::accept(doclet.since.as_deref(), &self.config, self.sink.as_ref()) {
            if self.config.log_items_skipped_by_since {
                self.sink.info(&format!(
                    "skipping {}: since {} is newer than latest version {}",
                    doclet.longname,
                    doclet.since.as_deref().unwrap_or(""),
                    self.config.latest_version.as_deref().unwrap_or("")
                ));
            }
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn doclets(json: serde_json::Value) -> Vec<Doclet> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn table_appends_on_reencounter() {
        let mut table = FragmentTable::default();
        table.insert(Fragment::new("f", "f", Body::Function(crate::model::Signature {
            params: vec![],
            returns: crate::model::TypeExpr::Void,
        })));
        table.insert(Fragment::new("f", "f", Body::Function(crate::model::Signature {
            params: vec![],
            returns: crate::model::TypeExpr::Void,
        })));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("f").unwrap().len(), 2);
    }

    #[test]
    fn class_stays_singleton_constructors_accumulate() {
        let parser = Parser::with_sink(Config::default(), Arc::new(MemorySink::new()));
        let input = doclets(serde_json::json!([
            {"kind": "class", "name": "Dog", "longname": "Dog",
             "params": [{"name": "name", "type": {"names": ["string"]}}]},
            {"kind": "class", "name": "Dog", "longname": "Dog",
             "params": [{"name": "name", "type": {"names": ["string"]}},
                        {"name": "age", "type": {"names": ["number"]}}]}
        ]));
        let tree = parser.parse(&input).unwrap();
        let group = tree.get("Dog").unwrap();
        assert_eq!(group.len(), 1);
        let Body::Class { members, .. } = &group[0].body else { panic!() };
        let ctors: Vec<_> = members
            .iter()
            .filter(|m| matches!(m.body, Body::Constructor(_)))
            .collect();
        assert_eq!(ctors.len(), 2);
    }

    #[test]
    fn private_and_ignored_doclets_rejected() {
        let parser = Parser::with_sink(Config::default(), Arc::new(MemorySink::new()));
        let input = doclets(serde_json::json!([
            {"kind": "function", "name": "hidden", "longname": "hidden", "access": "private"},
            {"kind": "function", "name": "gone", "longname": "gone", "ignore": true},
            {"kind": "function", "name": "kept", "longname": "kept"}
        ]));
        let tree = parser.parse(&input).unwrap();
        assert!(tree.get("hidden").is_none());
        assert!(tree.get("gone").is_none());
        assert!(tree.get("kept").is_some());
    }

    #[test]
    fn ignored_scope_rejected() {
        let config = Config {
            ignore_scopes: vec!["inner".into()],
            ..Config::default()
        };
        let parser = Parser::with_sink(config, Arc::new(MemorySink::new()));
        let input = doclets(serde_json::json!([
            {"kind": "function", "name": "helper", "longname": "ns~helper", "scope": "inner"}
        ]));
        let tree = parser.parse(&input).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn skip_undocumented_rejects_commentless() {
        let config = Config {
            skip_undocumented: true,
            ..Config::default()
        };
        let parser = Parser::with_sink(config, Arc::new(MemorySink::new()));
        let input = doclets(serde_json::json!([
            {"kind": "function", "name": "bare", "longname": "bare"},
            {"kind": "function", "name": "doc", "longname": "doc",
             "comment": "/** Documented. */"}
        ]));
        let tree = parser.parse(&input).unwrap();
        assert!(tree.get("bare").is_none());
        assert!(tree.get("doc").is_some());
    }

    #[test]
    fn member_of_since_rejected_parent_is_suppressed() {
        let config = Config {
            latest_version: Some("1.0.0".into()),
            ..Config::default()
        };
        let parser = Parser::with_sink(config, Arc::new(MemorySink::new()));
        let input = doclets(serde_json::json!([
            {"kind": "class", "name": "Late", "longname": "Late", "since": "2.0.0"},
            {"kind": "function", "name": "m", "longname": "Late.m", "memberof": "Late",
             "scope": "static"}
        ]));
        // Absent from the flat table, not just the resolved tree.
        let (table, rejected) = parser.map_to_table(&input).unwrap();
        assert!(table.is_empty());
        assert!(rejected.contains("Late"));
        assert!(rejected.contains("Late.m"));

        let tree = parser.parse(&input).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn repeated_parse_is_deterministic() {
        let input = doclets(serde_json::json!([
            {"kind": "namespace", "name": "app", "longname": "app"},
            {"kind": "class", "name": "Widget", "longname": "app.Widget", "memberof": "app",
             "params": [{"name": "id", "type": {"names": ["string"]}}]},
            {"kind": "function", "name": "render", "longname": "app.Widget#render",
             "memberof": "app.Widget", "returns": [{"type": {"names": ["bool"]}}]}
        ]));
        let first = Parser::with_sink(Config::default(), Arc::new(MemorySink::new()))
            .parse(&input)
            .unwrap();
        let second = Parser::with_sink(Config::default(), Arc::new(MemorySink::new()))
            .parse(&input)
            .unwrap();
        pretty_assertions::assert_eq!(first, second);
    }
}
