//! Data model for mapped declarations — format-agnostic.
//!
//! A doclet maps to one or more [`Fragment`]s. Fragments stay flat and refer
//! to their parent by name (`memberof`) until membership resolution nests
//! them into a [`DeclarationTree`].

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A recursive type expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeExpr {
    Any,
    Void,
    /// A primitive or named reference, kept as written after normalization.
    Name(String),
    Array(Box<TypeExpr>),
    /// Order-preserving; a single-element union is still a union so single-
    /// and multi-type annotations flow through the same shape.
    Union(Vec<TypeExpr>),
    /// A generic application such as `Promise<string>`.
    Generic {
        base: String,
        args: Vec<TypeExpr>,
    },
    /// A function type, used by function-typedef aliases.
    Function(Box<Signature>),
}

impl TypeExpr {
    /// Wrap a single expression in the uniform union shape.
    pub fn singleton(expr: TypeExpr) -> TypeExpr {
        TypeExpr::Union(vec![expr])
    }

    fn needs_parens_in_array(&self) -> bool {
        match self {
            TypeExpr::Union(items) => items.len() > 1,
            TypeExpr::Function(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Any => write!(f, "any"),
            TypeExpr::Void => write!(f, "void"),
            TypeExpr::Name(name) => write!(f, "{}", name),
            TypeExpr::Array(inner) => {
                if inner.needs_parens_in_array() {
                    write!(f, "({})[]", inner)
                } else {
                    write!(f, "{}[]", inner)
                }
            }
            TypeExpr::Union(items) => {
                let rendered: Vec<String> = items.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", rendered.join(" | "))
            }
            TypeExpr::Generic { base, args } => {
                let rendered: Vec<String> = args.iter().map(|t| t.to_string()).collect();
                write!(f, "{}<{}>", base, rendered.join(", "))
            }
            TypeExpr::Function(sig) => {
                let params: Vec<String> = sig.params.iter().map(|p| p.to_string()).collect();
                write!(f, "({}) => {}", params.join(", "), sig.returns)
            }
        }
    }
}

/// One parameter of a function, method or constructor signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
    /// Rest parameter; rendered as `...name: T[]`.
    pub rest: bool,
}

impl fmt::Display for ParamDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rest {
            // A rest parameter's annotated type is the element type.
            let already_array = match &self.ty {
                TypeExpr::Array(_) => true,
                TypeExpr::Union(items) => {
                    items.len() == 1 && matches!(items[0], TypeExpr::Array(_))
                }
                _ => false,
            };
            let ty = if already_array {
                self.ty.clone()
            } else {
                TypeExpr::Array(Box::new(self.ty.clone()))
            };
            write!(f, "...{}: {}", self.name, ty)
        } else if self.optional {
            write!(f, "{}?: {}", self.name, self.ty)
        } else {
            write!(f, "{}: {}", self.name, self.ty)
        }
    }
}

/// A complete callable signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    pub params: Vec<ParamDecl>,
    pub returns: TypeExpr,
}

/// Visibility of a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn from_tag(tag: Option<&str>) -> Access {
        match tag {
            Some("private") => Access::Private,
            Some("protected") => Access::Protected,
            _ => Access::Public,
        }
    }
}

/// Modifier flags shared by every fragment kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Modifiers {
    pub export: bool,
    pub access: Access,
    pub is_static: bool,
    pub readonly: bool,
    pub optional: bool,
    pub is_abstract: bool,
}

/// One mapped declaration fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub name: String,
    pub longname: String,
    /// Name-based back-reference to the parent container, resolved later.
    pub memberof: Option<String>,
    /// Normalized doc comment, one entry per output line.
    pub comment: Vec<String>,
    pub modifiers: Modifiers,
    pub body: Body,
}

impl Fragment {
    pub fn new(name: impl Into<String>, longname: impl Into<String>, body: Body) -> Fragment {
        Fragment {
            name: name.into(),
            longname: longname.into(),
            memberof: None,
            comment: Vec::new(),
            modifiers: Modifiers::default(),
            body,
        }
    }

    /// Child members, for container kinds.
    pub fn members(&self) -> Option<&Vec<Fragment>> {
        match &self.body {
            Body::Class { members, .. }
            | Body::Interface { members }
            | Body::Namespace { members }
            | Body::Module { members }
            | Body::Enum { members } => Some(members),
            _ => None,
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut Vec<Fragment>> {
        match &mut self.body {
            Body::Class { members, .. }
            | Body::Interface { members }
            | Body::Namespace { members }
            | Body::Module { members }
            | Body::Enum { members } => Some(members),
            _ => None,
        }
    }
}

/// The closed set of declaration shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Body {
    Function(Signature),
    Method(Signature),
    Constructor(Signature),
    Class {
        /// Base-class reference (`@extends`), by name.
        base: Option<String>,
        members: Vec<Fragment>,
    },
    Interface {
        members: Vec<Fragment>,
    },
    Namespace {
        members: Vec<Fragment>,
    },
    Module {
        members: Vec<Fragment>,
    },
    Enum {
        members: Vec<Fragment>,
    },
    EnumMember {
        /// Rendered initializer; absent when the declared type is not a
        /// primitive shape.
        value: Option<String>,
    },
    Const {
        ty: TypeExpr,
    },
    Property {
        ty: TypeExpr,
    },
    TypeAlias {
        ty: TypeExpr,
    },
}

impl Body {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Body::Function(_) => "function",
            Body::Method(_) => "method",
            Body::Constructor(_) => "constructor",
            Body::Class { .. } => "class",
            Body::Interface { .. } => "interface",
            Body::Namespace { .. } => "namespace",
            Body::Module { .. } => "module",
            Body::Enum { .. } => "enum",
            Body::EnumMember { .. } => "enum member",
            Body::Const { .. } => "const",
            Body::Property { .. } => "property",
            Body::TypeAlias { .. } => "type alias",
        }
    }
}

/// The resolved, emission-ready output: top-level declarations keyed by
/// longname, in first-encounter order. A key holds more than one fragment
/// only for overload groups.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeclarationTree {
    entries: HashMap<String, Vec<Fragment>>,
    order: Vec<String>,
}

impl DeclarationTree {
    pub fn new() -> DeclarationTree {
        DeclarationTree::default()
    }

    /// Append a fragment under its longname, keeping first-encounter order.
    pub fn push(&mut self, longname: &str, fragment: Fragment) {
        if !self.entries.contains_key(longname) {
            self.order.push(longname.to_string());
        }
        self.entries.entry(longname.to_string()).or_default().push(fragment);
    }

    pub fn contains(&self, longname: &str) -> bool {
        self.entries.contains_key(longname)
    }

    pub fn get(&self, longname: &str) -> Option<&Vec<Fragment>> {
        self.entries.get(longname)
    }

    pub fn get_mut(&mut self, longname: &str) -> Option<&mut Vec<Fragment>> {
        self.entries.get_mut(longname)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Iterate top-level groups in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vec<Fragment>)> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|frags| (name.as_str(), frags)))
    }

    /// Mutable access to every group, in no particular order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Vec<Fragment>> {
        self.entries.values_mut()
    }
}
