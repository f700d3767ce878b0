//! Declaration-file emitter.
//!
//! Serializes the resolved tree as `.d.ts` syntax: `declare` heads at top
//! level, doc-comment blocks, member modifiers, overload lines, nested
//! containers indented by four spaces.

use crate::model::{Body, DeclarationTree, Fragment, Signature};
use crate::render::Renderer;

pub struct DtsRenderer;

impl Renderer for DtsRenderer {
    fn render(&self, tree: &DeclarationTree) -> String {
        let mut out = String::new();
        for (_, group) in tree.iter() {
            for fragment in group {
                render_fragment(&mut out, fragment, 0, Ctx::TopLevel);
            }
        }
        out
    }

    fn file_extension(&self) -> &str {
        "d.ts"
    }
}

/// What surrounds the fragment being rendered; decides heads and modifiers.
#[derive(Clone, Copy, PartialEq)]
enum Ctx {
    TopLevel,
    Namespace,
    ClassLike,
    Interface,
}

const INDENT: &str = "    ";

fn render_fragment(out: &mut String, fragment: &Fragment, depth: usize, ctx: Ctx) {
    let pad = INDENT.repeat(depth);
    write_comment(out, &pad, &fragment.comment);

    let declare = if ctx == Ctx::TopLevel { "declare " } else { "" };

    match &fragment.body {
        Body::Function(sig) => {
            out.push_str(&format!(
                "{}{}function {}({}): {};\n",
                pad,
                declare,
                fragment.name,
                render_params(sig),
                sig.returns
            ));
        }
        Body::Method(sig) => {
            out.push_str(&format!(
                "{}{}{}({}): {};\n",
                pad,
                member_modifiers(fragment, ctx),
                fragment.name,
                render_params(sig),
                sig.returns
            ));
        }
        Body::Constructor(sig) => {
            out.push_str(&format!("{}constructor({});\n", pad, render_params(sig)));
        }
        Body::Class { base, members } => {
            let is_abstract = if fragment.modifiers.is_abstract { "abstract " } else { "" };
            let extends = base
                .as_deref()
                .map(|b| format!(" extends {}", b))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}{}{}class {}{} {{\n",
                pad, declare, is_abstract, fragment.name, extends
            ));
            for member in members {
                render_fragment(out, member, depth + 1, Ctx::ClassLike);
            }
            out.push_str(&format!("{}}}\n", pad));
        }
        Body::Interface { members } => {
            out.push_str(&format!("{}{}interface {} {{\n", pad, declare, fragment.name));
            for member in members {
                render_fragment(out, member, depth + 1, Ctx::Interface);
            }
            out.push_str(&format!("{}}}\n", pad));
        }
        Body::Namespace { members } => {
            out.push_str(&format!("{}{}namespace {} {{\n", pad, declare, fragment.name));
            for member in members {
                render_fragment(out, member, depth + 1, Ctx::Namespace);
            }
            out.push_str(&format!("{}}}\n", pad));
        }
        Body::Module { members } => {
            out.push_str(&format!("{}declare module \"{}\" {{\n", pad, fragment.name));
            for member in members {
                render_fragment(out, member, depth + 1, Ctx::Namespace);
            }
            out.push_str(&format!("{}}}\n", pad));
        }
        Body::Enum { members } => {
            out.push_str(&format!("{}{}enum {} {{\n", pad, declare, fragment.name));
            for member in members {
                render_fragment(out, member, depth + 1, Ctx::Namespace);
            }
            out.push_str(&format!("{}}}\n", pad));
        }
        Body::EnumMember { value } => match value {
            Some(value) => out.push_str(&format!("{}{} = {},\n", pad, fragment.name, value)),
            None => out.push_str(&format!("{}{},\n", pad, fragment.name)),
        },
        Body::Const { ty } => {
            out.push_str(&format!("{}{}const {}: {};\n", pad, declare, fragment.name, ty));
        }
        Body::Property { ty } => match ctx {
            Ctx::TopLevel | Ctx::Namespace => {
                out.push_str(&format!("{}{}var {}: {};\n", pad, declare, fragment.name, ty));
            }
            Ctx::ClassLike | Ctx::Interface => {
                let optional = if fragment.modifiers.optional { "?" } else { "" };
                out.push_str(&format!(
                    "{}{}{}{}: {};\n",
                    pad,
                    member_modifiers(fragment, ctx),
                    fragment.name,
                    optional,
                    ty
                ));
            }
        },
        Body::TypeAlias { ty } => {
            out.push_str(&format!("{}{}type {} = {};\n", pad, declare, fragment.name, ty));
        }
    }
}

fn render_params(sig: &Signature) -> String {
    sig.params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Leading member keywords, class members only carry the full set.
fn member_modifiers(fragment: &Fragment, ctx: Ctx) -> String {
    let mut out = String::new();
    if ctx == Ctx::ClassLike {
        match fragment.modifiers.access {
            crate::model::Access::Protected => out.push_str("protected "),
            crate::model::Access::Private => out.push_str("private "),
            crate::model::Access::Public => {}
        }
        if fragment.modifiers.is_static {
            out.push_str("static ");
        }
        if fragment.modifiers.is_abstract {
            out.push_str("abstract ");
        }
    }
    if fragment.modifiers.readonly {
        out.push_str("readonly ");
    }
    out
}

fn write_comment(out: &mut String, pad: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("{}/**\n", pad));
    for line in lines {
        if line.is_empty() {
            out.push_str(&format!("{} *\n", pad));
        } else {
            out.push_str(&format!("{} * {}\n", pad, line));
        }
    }
    out.push_str(&format!("{} */\n", pad));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::doclet::Doclet;
    use crate::parser::Parser;
    use crate::sink::MemorySink;
    use std::sync::Arc;

    fn render(json: serde_json::Value) -> String {
        let doclets: Vec<Doclet> = serde_json::from_value(json).unwrap();
        let parser = Parser::with_sink(Config::default(), Arc::new(MemorySink::new()));
        let tree = parser.parse(&doclets).unwrap();
        DtsRenderer.render(&tree)
    }

    #[test]
    fn top_level_function_declares() {
        let out = render(serde_json::json!([
            {"kind": "function", "name": "greet", "longname": "greet",
             "comment": "/** Says hello. */",
             "params": [{"name": "name", "type": {"names": ["string"]}}],
             "returns": [{"type": {"names": ["string"]}}]}
        ]));
        assert!(out.contains("declare function greet(name: string): string;"));
        assert!(out.contains(" * Says hello."));
    }

    #[test]
    fn namespace_nests_members_without_declare() {
        let out = render(serde_json::json!([
            {"kind": "namespace", "name": "app", "longname": "app"},
            {"kind": "function", "name": "boot", "longname": "app.boot", "memberof": "app"}
        ]));
        assert!(out.contains("declare namespace app {"));
        assert!(out.contains("    function boot(): void;"));
    }

    #[test]
    fn class_renders_modifiers_and_extends() {
        let out = render(serde_json::json!([
            {"kind": "class", "name": "Animal", "longname": "Animal"},
            {"kind": "class", "name": "Dog", "longname": "Dog", "augments": ["Animal"],
             "params": [{"name": "name", "type": {"names": ["string"]}}]},
            {"kind": "member", "name": "legs", "longname": "Dog#legs", "memberof": "Dog",
             "type": {"names": ["number"]}, "readonly": true},
            {"kind": "function", "name": "bark", "longname": "Dog.bark", "memberof": "Dog",
             "scope": "static"}
        ]));
        assert!(out.contains("declare class Dog extends Animal {"));
        assert!(out.contains("    constructor(name: string);"));
        assert!(out.contains("    readonly legs: number;"));
        assert!(out.contains("    static bark(): void;"));
    }

    #[test]
    fn enum_members_render_values() {
        let out = render(serde_json::json!([
            {"kind": "member", "name": "Color", "longname": "Color", "isEnum": true,
             "properties": [
                {"name": "RED", "type": {"names": ["number"]}, "defaultvalue": 0},
                {"name": "NAME", "type": {"names": ["string"]}, "defaultvalue": "red"}
             ]}
        ]));
        assert!(out.contains("declare enum Color {"));
        assert!(out.contains("    RED = 0,"));
        assert!(out.contains("    NAME = \"red\","));
    }

    #[test]
    fn overloads_render_as_sibling_lines() {
        let out = render(serde_json::json!([
            {"kind": "function", "name": "pick", "longname": "pick",
             "params": [{"name": "key", "type": {"names": ["string", "number"]}}]}
        ]));
        assert!(out.contains("declare function pick(key: string): void;"));
        assert!(out.contains("declare function pick(key: number): void;"));
    }

    #[test]
    fn type_alias_renders_function_type() {
        let out = render(serde_json::json!([
            {"kind": "typedef", "name": "Callback", "longname": "Callback",
             "type": {"names": ["function"]},
             "params": [{"name": "err", "type": {"names": ["Error"]}}]}
        ]));
        assert!(out.contains("declare type Callback = (err: Error) => void;"));
    }

    #[test]
    fn synthesized_interface_precedes_function() {
        let out = render(serde_json::json!([
            {"kind": "function", "name": "f", "longname": "f",
             "params": [
                {"name": "opts", "type": {"names": ["Object"]}},
                {"name": "opts.a", "type": {"names": ["string"]}}
             ]}
        ]));
        let iface = out.find("declare interface f_opts {").unwrap();
        let func = out.find("declare function f(opts: f_opts): void;").unwrap();
        assert!(iface < func);
    }
}
