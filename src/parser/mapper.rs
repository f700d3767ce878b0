//! Doclet Classifier & Mapper — turns one doclet into zero or more
//! declaration fragments.
//!
//! The mapper is side-effect-free: synthesized auxiliary interfaces (from
//! structural parameters) are returned ahead of the primary fragment and
//! the caller performs all table insertion.

use crate::comment;
use crate::doclet::{Doclet, PropertyDoc, ReturnDoc};
use crate::error::Error;
use crate::model::{Access, Body, Fragment, Modifiers, ParamDecl, Signature, TypeExpr};
use crate::parser::types::{is_array_notation, map_type_name, map_type_names};
use crate::sink::DiagnosticSink;

/// Map one doclet. An empty result means the doclet produces no output
/// (file/package records, unknown kinds).
pub fn map_doclet(
    doclet: &Doclet,
    include_examples: bool,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<Fragment>, Error> {
    match doclet.kind.as_str() {
        "function" => map_function(doclet, include_examples),
        "constant" | "member" => {
            if doclet.is_enum {
                Ok(vec![map_enum(doclet, include_examples)?])
            } else {
                Ok(vec![map_value(doclet, include_examples)])
            }
        }
        "class" => map_class(doclet, include_examples),
        "interface" => Ok(vec![base_fragment(
            doclet,
            Body::Interface { members: Vec::new() },
            include_examples,
        )]),
        "namespace" => Ok(vec![base_fragment(
            doclet,
            Body::Namespace { members: Vec::new() },
            include_examples,
        )]),
        "module" => Ok(vec![base_fragment(
            doclet,
            Body::Module { members: Vec::new() },
            include_examples,
        )]),
        "typedef" => map_typedef(doclet, include_examples),
        "enum" => Ok(vec![map_enum(doclet, include_examples)?]),
        "file" | "package" => Ok(Vec::new()),
        other => {
            sink.warn(&format!(
                "unknown doclet kind '{}' for {}, skipping",
                other, doclet.longname
            ));
            Ok(Vec::new())
        }
    }
}

fn owner_path(doclet: &Doclet) -> &str {
    doclet.memberof.as_deref().unwrap_or("")
}

/// Shared fragment scaffolding: identity, back-reference, comment, flags.
fn base_fragment(doclet: &Doclet, body: Body, include_examples: bool) -> Fragment {
    let mut frag = Fragment::new(&doclet.name, &doclet.longname, body);
    frag.memberof = doclet.memberof.clone();
    frag.comment = comment::normalize(&doclet.comment, include_examples);
    frag.modifiers = Modifiers {
        export: false,
        access: Access::from_tag(doclet.access.as_deref()),
        is_static: doclet.is_static(),
        readonly: doclet.readonly,
        optional: doclet.optional,
        is_abstract: doclet.is_abstract,
    };
    frag
}

// -- Values (constants, members) ----------------------------------------------

fn map_value(doclet: &Doclet, include_examples: bool) -> Fragment {
    let ty = map_type_names(doclet.type_names(), owner_path(doclet));
    let body = if doclet.kind == "constant" {
        Body::Const { ty }
    } else {
        Body::Property { ty }
    };
    base_fragment(doclet, body, include_examples)
}

// -- Functions ----------------------------------------------------------------

fn map_function(doclet: &Doclet, include_examples: bool) -> Result<Vec<Fragment>, Error> {
    let owner = owner_path(doclet);
    let (specs, mut out) = build_params(doclet, owner)?;
    for signature in expand_signatures(&specs, doclet.returns.first(), owner) {
        out.push(base_fragment(doclet, Body::Function(signature), include_examples));
    }
    Ok(out)
}

// -- Classes ------------------------------------------------------------------

fn map_class(doclet: &Doclet, include_examples: bool) -> Result<Vec<Fragment>, Error> {
    let owner = owner_path(doclet);
    let (specs, mut out) = build_params(doclet, owner)?;

    let mut members = Vec::new();
    if !doclet.hideconstructor {
        // Constructor signatures expand exactly like function overloads;
        // the synthesized void return is ignored on emission.
        for signature in expand_signatures(&specs, None, owner) {
            let mut ctor = Fragment::new(
                "constructor",
                format!("{}.constructor", doclet.longname),
                Body::Constructor(signature),
            );
            ctor.comment = comment::normalize(&doclet.comment, include_examples);
            members.push(ctor);
        }
    }

    let base = doclet.augments.first().map(|name| reference_name(name, owner));
    let mut frag = base_fragment(doclet, Body::Class { base, members }, include_examples);
    // The class comment is the classdesc; the regular comment documents
    // the constructor.
    frag.comment = doclet
        .classdesc
        .as_deref()
        .map(|desc| desc.trim().lines().map(str::to_string).collect())
        .unwrap_or_default();
    out.push(frag);
    Ok(out)
}

fn reference_name(name: &str, owner: &str) -> String {
    match map_type_name(name, owner) {
        TypeExpr::Name(normalized) => normalized,
        _ => name.to_string(),
    }
}

// -- Typedefs -----------------------------------------------------------------

fn map_typedef(doclet: &Doclet, include_examples: bool) -> Result<Vec<Fragment>, Error> {
    let owner = owner_path(doclet);

    if doclet.type_names() == ["function"] {
        let (specs, mut out) = build_params(doclet, owner)?;
        let signature = union_signature(&specs, doclet.returns.first(), owner);
        out.push(base_fragment(
            doclet,
            Body::TypeAlias {
                ty: TypeExpr::Function(Box::new(signature)),
            },
            include_examples,
        ));
        return Ok(out);
    }

    let members = doclet
        .properties
        .iter()
        .map(|prop| property_fragment(prop, &doclet.longname, owner))
        .collect();
    Ok(vec![base_fragment(
        doclet,
        Body::Interface { members },
        include_examples,
    )])
}

fn property_fragment(prop: &PropertyDoc, parent_longname: &str, owner: &str) -> Fragment {
    let mut frag = Fragment::new(
        &prop.name,
        format!("{}.{}", parent_longname, prop.name),
        Body::Property {
            ty: map_type_names(prop.type_names(), owner),
        },
    );
    frag.modifiers.optional = prop.optional;
    if let Some(desc) = prop.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        frag.comment = desc.lines().map(str::to_string).collect();
    }
    frag
}

// -- Enums --------------------------------------------------------------------

const PRIMITIVE_VALUE_TYPES: &[&str] = &["string", "number", "boolean", "bool"];

fn map_enum(doclet: &Doclet, include_examples: bool) -> Result<Fragment, Error> {
    if !doclet.is_enum {
        return Err(Error::Structure(format!(
            "doclet {} maps as an enum but does not carry the enum flag",
            doclet.longname
        )));
    }

    let mut members: Vec<Fragment> = Vec::new();
    for prop in &doclet.properties {
        // Idempotent by member name.
        if members.iter().any(|m| m.name == prop.name) {
            continue;
        }
        let mut member = Fragment::new(
            &prop.name,
            format!("{}.{}", doclet.longname, prop.name),
            Body::EnumMember {
                value: enum_member_value(prop),
            },
        );
        if let Some(desc) = prop.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            member.comment = desc.lines().map(str::to_string).collect();
        }
        members.push(member);
    }
    Ok(base_fragment(doclet, Body::Enum { members }, include_examples))
}

/// The initializer for an enum member; none when the declared type is not a
/// primitive shape.
fn enum_member_value(prop: &PropertyDoc) -> Option<String> {
    let names = prop.type_names();
    if !names.is_empty()
        && !names
            .iter()
            .all(|n| PRIMITIVE_VALUE_TYPES.contains(&n.to_lowercase().as_str()))
    {
        return None;
    }
    match prop.default_value.as_ref()? {
        serde_json::Value::String(s) => Some(format!("\"{}\"", s.replace('"', "\\\""))),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// -- Parameter scanning and structural synthesis ------------------------------

/// One scanned parameter, before overload expansion.
struct ParamSpec {
    name: String,
    type_names: Vec<String>,
    optional: bool,
    rest: bool,
    /// Set when this parameter's type is a synthesized structural interface.
    synth: Option<SynthRef>,
}

struct SynthRef {
    name: String,
    as_array: bool,
}

/// Scan the ordered parameter list, synthesizing an auxiliary interface for
/// every run of dotted sub-property entries.
fn build_params(doclet: &Doclet, owner: &str) -> Result<(Vec<ParamSpec>, Vec<Fragment>), Error> {
    let mut specs: Vec<ParamSpec> = Vec::new();
    let mut aux: Vec<Fragment> = Vec::new();
    // (root parameter name, interface under construction)
    let mut open: Option<(String, Fragment)> = None;

    for (index, param) in doclet.params.iter().enumerate() {
        if let Some(dot) = param.name.find('.') {
            let root_ref = param.name[..dot].trim_end_matches("[]");
            let prop_name = &param.name[dot + 1..];
            let Some((root_name, iface)) = open.as_mut() else {
                return Err(Error::Structure(format!(
                    "parameter '{}' of {} has no preceding structural root",
                    param.name, doclet.longname
                )));
            };
            if root_name != root_ref {
                return Err(Error::Structure(format!(
                    "parameter '{}' of {} does not extend the open structural parameter '{}'",
                    param.name, doclet.longname, root_name
                )));
            }
            let mut prop = Fragment::new(
                prop_name,
                format!("{}.{}", iface.name, prop_name),
                Body::Property {
                    ty: map_type_names(param.type_names(), owner),
                },
            );
            prop.modifiers.optional = param.optional;
            if let Some(desc) = param.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
                prop.comment = desc.lines().map(str::to_string).collect();
            }
            iface.members_mut().expect("interface fragment").push(prop);
            continue;
        }

        // A plain parameter ends any open run.
        if let Some((_, iface)) = open.take() {
            aux.push(iface);
        }

        let next_is_sub = doclet
            .params
            .get(index + 1)
            .map(|next| {
                next.name
                    .split_once('.')
                    .is_some_and(|(head, _)| head.trim_end_matches("[]") == param.name)
            })
            .unwrap_or(false);

        if next_is_sub {
            let synth_name = format!("{}_{}", doclet.name, param.name);
            let iface = Fragment::new(
                synth_name.clone(),
                synth_name.clone(),
                Body::Interface { members: Vec::new() },
            );
            open = Some((param.name.clone(), iface));
            specs.push(ParamSpec {
                name: param.name.clone(),
                type_names: Vec::new(),
                optional: param.optional,
                rest: param.variable,
                synth: Some(SynthRef {
                    name: synth_name,
                    as_array: param.type_names().iter().any(|n| is_array_notation(n)),
                }),
            });
        } else {
            specs.push(ParamSpec {
                name: param.name.clone(),
                type_names: param.type_names().to_vec(),
                optional: param.optional,
                rest: param.variable,
                synth: None,
            });
        }
    }
    if let Some((_, iface)) = open.take() {
        aux.push(iface);
    }

    Ok((specs, aux))
}

// -- Overload expansion -------------------------------------------------------

/// Expand a scanned parameter list into signatures.
///
/// A multi-type parameter yields one signature per type name, paired
/// index-wise with a multi-type return when both vary (positions past the
/// end of a shorter list reuse its last entry). This is deliberately not a
/// cross product across several multi-type parameters.
fn expand_signatures(
    specs: &[ParamSpec],
    ret: Option<&ReturnDoc>,
    owner: &str,
) -> Vec<Signature> {
    let ret_names: &[String] = ret.map(|r| r.type_names()).unwrap_or(&[]);
    let count = specs
        .iter()
        .filter(|s| s.synth.is_none())
        .map(|s| s.type_names.len())
        .chain(std::iter::once(ret_names.len()))
        .max()
        .unwrap_or(0)
        .max(1);

    if count == 1 {
        return vec![union_signature(specs, ret, owner)];
    }

    (0..count)
        .map(|i| Signature {
            params: specs.iter().map(|s| s.to_decl_at(i, owner)).collect(),
            returns: return_type_at(ret, i, owner),
        })
        .collect()
}

/// The unexpanded signature: every multi-type annotation stays a union.
fn union_signature(specs: &[ParamSpec], ret: Option<&ReturnDoc>, owner: &str) -> Signature {
    Signature {
        params: specs.iter().map(|s| s.to_decl(owner)).collect(),
        returns: match ret {
            None => TypeExpr::Void,
            Some(r) => map_type_names(r.type_names(), owner),
        },
    }
}

fn return_type_at(ret: Option<&ReturnDoc>, index: usize, owner: &str) -> TypeExpr {
    match ret {
        None => TypeExpr::Void,
        Some(r) => {
            let names = r.type_names();
            if names.len() > 1 {
                let picked = &names[index.min(names.len() - 1)];
                TypeExpr::singleton(map_type_name(picked, owner))
            } else {
                map_type_names(names, owner)
            }
        }
    }
}

impl ParamSpec {
    fn synth_type(&self, synth: &SynthRef) -> TypeExpr {
        let reference = TypeExpr::Name(synth.name.clone());
        let ty = if synth.as_array {
            TypeExpr::Array(Box::new(reference))
        } else {
            reference
        };
        TypeExpr::singleton(ty)
    }

    fn to_decl(&self, owner: &str) -> ParamDecl {
        let ty = match &self.synth {
            Some(synth) => self.synth_type(synth),
            None => map_type_names(&self.type_names, owner),
        };
        ParamDecl {
            name: self.name.clone(),
            ty,
            optional: self.optional,
            rest: self.rest,
        }
    }

    fn to_decl_at(&self, index: usize, owner: &str) -> ParamDecl {
        let ty = match &self.synth {
            Some(synth) => self.synth_type(synth),
            None if self.type_names.is_empty() => TypeExpr::Any,
            None => {
                let picked = &self.type_names[index.min(self.type_names.len() - 1)];
                TypeExpr::singleton(map_type_name(picked, owner))
            }
        };
        ParamDecl {
            name: self.name.clone(),
            ty,
            optional: self.optional,
            rest: self.rest,
        }
    }
}
