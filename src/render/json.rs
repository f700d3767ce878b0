//! JSON renderer — structured dump of the resolved tree for tooling
//! integration and debugging of the mapping passes.

use crate::model::DeclarationTree;
use crate::render::Renderer;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, tree: &DeclarationTree) -> String {
        let entries: Vec<serde_json::Value> = tree
            .iter()
            .map(|(longname, fragments)| {
                serde_json::json!({
                    "longname": longname,
                    "declarations": fragments,
                })
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&entries).expect("tree serializes to JSON");
        out.push('\n');
        out
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
