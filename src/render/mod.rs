//! Renderer module — trait-based format dispatch.

pub mod dts;
pub mod json;

use crate::model::DeclarationTree;
use anyhow::{anyhow, Result};

/// Trait for rendering a resolved declaration tree into an output format.
pub trait Renderer {
    fn render(&self, tree: &DeclarationTree) -> String;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "dts" | "d.ts" => Ok(Box::new(dts::DtsRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use dts or json", format)),
    }
}
