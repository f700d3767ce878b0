//! Input model for doclet records — the flat, JSON-serializable output of a
//! documentation-comment extraction tool (one record per documented symbol).
//!
//! Every field defaults so sparse records deserialize without noise; the
//! extraction tool only writes the fields a given symbol actually has.

use serde::Deserialize;

/// One parsed documentation-comment record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Doclet {
    /// function | class | interface | member | constant | namespace |
    /// typedef | module | enum | file | package
    pub kind: String,
    /// Short name of the symbol.
    pub name: String,
    /// Globally unique qualified identifier.
    pub longname: String,
    /// Longname of the logical parent container, when nested.
    pub memberof: Option<String>,
    /// static | instance | global | inner
    pub scope: Option<String>,
    /// Minimum version this symbol appears in (`@since`).
    pub since: Option<String>,
    /// public | protected | private
    pub access: Option<String>,
    /// Raw annotated comment text, including delimiters.
    pub comment: String,
    /// Leading description, already extracted by the doc generator.
    pub description: Option<String>,
    /// Class-level description (`@classdesc`), distinct from the
    /// constructor comment on class doclets.
    pub classdesc: Option<String>,
    #[serde(rename = "type")]
    pub type_info: Option<TypeInfo>,
    pub params: Vec<ParamDoc>,
    pub returns: Vec<ReturnDoc>,
    /// Structural properties (typedefs, enums).
    pub properties: Vec<PropertyDoc>,
    /// Base types (`@extends` / `@augments`).
    pub augments: Vec<String>,
    pub optional: bool,
    /// Rest parameter / repeatable member (`@param {...T}`).
    pub variable: bool,
    /// Abstract member (`@virtual` / `@abstract`).
    #[serde(rename = "virtual")]
    pub is_abstract: bool,
    pub readonly: bool,
    #[serde(rename = "isEnum")]
    pub is_enum: bool,
    /// `@hideconstructor` on a class.
    pub hideconstructor: bool,
    /// Set by the extraction tool when no doc comment was found.
    pub undocumented: bool,
    /// `@ignore`.
    pub ignore: bool,
}

impl Doclet {
    /// Type-name list, empty when the doclet carries no type information.
    pub fn type_names(&self) -> &[String] {
        self.type_info.as_ref().map(|t| t.names.as_slice()).unwrap_or(&[])
    }

    pub fn is_private(&self) -> bool {
        self.access.as_deref() == Some("private")
    }

    pub fn is_static(&self) -> bool {
        self.scope.as_deref() == Some("static")
    }
}

/// A type annotation: a list of type-name strings. More than one name
/// represents a union.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypeInfo {
    pub names: Vec<String>,
}

/// One entry of a doclet's ordered parameter list. Dotted names
/// (`opts.limit`) describe sub-properties of a preceding structural
/// parameter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParamDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_info: Option<TypeInfo>,
    pub optional: bool,
    pub variable: bool,
    pub description: Option<String>,
}

impl ParamDoc {
    pub fn type_names(&self) -> &[String] {
        self.type_info.as_ref().map(|t| t.names.as_slice()).unwrap_or(&[])
    }
}

/// A `@returns` entry. Only the first one is mapped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReturnDoc {
    #[serde(rename = "type")]
    pub type_info: Option<TypeInfo>,
    pub description: Option<String>,
}

impl ReturnDoc {
    pub fn type_names(&self) -> &[String] {
        self.type_info.as_ref().map(|t| t.names.as_slice()).unwrap_or(&[])
    }
}

/// A `@property` entry on a typedef or enum doclet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertyDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_info: Option<TypeInfo>,
    pub optional: bool,
    #[serde(rename = "defaultvalue")]
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
}

impl PropertyDoc {
    pub fn type_names(&self) -> &[String] {
        self.type_info.as_ref().map(|t| t.names.as_slice()).unwrap_or(&[])
    }
}
