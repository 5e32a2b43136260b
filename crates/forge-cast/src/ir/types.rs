//! Type references
//!
//! Two representations live here:
//!
//! - [`TypeRef`] is the serialized, jsii-shaped reference found in the IR.
//!   Optionality is not part of it; it rides on the enclosing value
//!   ([`OptionalValue`], a parameter or a property).
//! - [`CastType`] is the closed variant set the projection engine works
//!   with. Optionality is folded in as [`CastType::Optional`], which never
//!   wraps another `Optional`.
//!
//! # IR shapes
//!
//! | JSON | CastType |
//! |------|----------|
//! | `{"primitive": "string"}` | `Primitive(String)` |
//! | `{"collection": {"kind": "array", "elementtype": T}}` | `Collection { Array, T }` |
//! | `{"collection": {"kind": "map", "elementtype": T}}` | `Collection { Map, T }` |
//! | `{"union": {"types": [A, B]}}` | `Union([A, B])` |
//! | `{"fqn": "acme.Widget"}` | `Named("acme.Widget")` |
//! | absent (method without return) | `Void` |

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Primitive types of the IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastPrimitive {
    Boolean,
    Date,
    Number,
    String,
    Json,
    Any,
}

impl CastPrimitive {
    /// IR spelling of the primitive
    pub fn as_str(&self) -> &'static str {
        match self {
            CastPrimitive::Boolean => "boolean",
            CastPrimitive::Date => "date",
            CastPrimitive::Number => "number",
            CastPrimitive::String => "string",
            CastPrimitive::Json => "json",
            CastPrimitive::Any => "any",
        }
    }
}

/// Collection flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Array,
    Map,
}

/// Serialized type reference, as found in the IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Primitive { primitive: CastPrimitive },
    Collection { collection: CollectionRef },
    Union { union: UnionRef },
    Named { fqn: String },
}

/// Body of a collection reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub kind: CollectionKind,
    #[serde(rename = "elementtype")]
    pub element_type: Box<TypeRef>,
}

/// Body of a union reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionRef {
    pub types: Vec<TypeRef>,
}

impl TypeRef {
    /// Create a primitive reference
    pub fn primitive(primitive: CastPrimitive) -> Self {
        TypeRef::Primitive { primitive }
    }

    /// Create a named reference
    pub fn named(fqn: impl Into<String>) -> Self {
        TypeRef::Named { fqn: fqn.into() }
    }

    /// Create an array reference
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Collection {
            collection: CollectionRef {
                kind: CollectionKind::Array,
                element_type: Box::new(element),
            },
        }
    }

    /// Create a map reference
    pub fn map(element: TypeRef) -> Self {
        TypeRef::Collection {
            collection: CollectionRef {
                kind: CollectionKind::Map,
                element_type: Box::new(element),
            },
        }
    }

    /// Create a union reference
    pub fn union(types: Vec<TypeRef>) -> Self {
        TypeRef::Union {
            union: UnionRef { types },
        }
    }

    /// FQN of a named reference
    pub fn fqn(&self) -> Option<&str> {
        match self {
            TypeRef::Named { fqn } => Some(fqn),
            _ => None,
        }
    }
}

/// A type reference together with its optionality (method return values)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalValue {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// Type reference as seen by the projection engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastType {
    /// No value (a method without a return type)
    Void,
    Primitive(CastPrimitive),
    Collection {
        kind: CollectionKind,
        element: Box<CastType>,
    },
    Union(Vec<CastType>),
    /// Nullable wrapper, never nested
    Optional(Box<CastType>),
    /// Reference to a declaration by FQN
    Named(String),
}

impl CastType {
    /// Convert a serialized reference
    pub fn from_ref(ty: &TypeRef) -> Self {
        match ty {
            TypeRef::Primitive { primitive } => CastType::Primitive(*primitive),
            TypeRef::Collection { collection } => CastType::Collection {
                kind: collection.kind,
                element: Box::new(CastType::from_ref(&collection.element_type)),
            },
            TypeRef::Union { union } => {
                CastType::Union(union.types.iter().map(CastType::from_ref).collect())
            }
            TypeRef::Named { fqn } => CastType::Named(fqn.clone()),
        }
    }

    /// Convert a reference carrying an optionality flag
    pub fn from_value(ty: &TypeRef, optional: bool) -> Self {
        let inner = CastType::from_ref(ty);
        if optional {
            CastType::optional(inner)
        } else {
            inner
        }
    }

    /// Convert a method return value, `None` meaning no return type
    pub fn from_returns(returns: Option<&OptionalValue>) -> Self {
        match returns {
            Some(value) => CastType::from_value(&value.ty, value.optional),
            None => CastType::Void,
        }
    }

    /// Wrap in `Optional`, flattening an already-optional type
    pub fn optional(inner: CastType) -> Self {
        match inner {
            CastType::Optional(_) => {
                warn!(ty = %inner, "flattened nested optional type");
                inner
            }
            other => CastType::Optional(Box::new(other)),
        }
    }

    /// Create an array type
    pub fn array(element: CastType) -> Self {
        CastType::Collection {
            kind: CollectionKind::Array,
            element: Box::new(element),
        }
    }

    /// Create a map type
    pub fn map(element: CastType) -> Self {
        CastType::Collection {
            kind: CollectionKind::Map,
            element: Box::new(element),
        }
    }

    /// Create a named type
    pub fn named(fqn: impl Into<String>) -> Self {
        CastType::Named(fqn.into())
    }

    /// Whether this is the universal `any` type
    pub fn is_any(&self) -> bool {
        matches!(self, CastType::Primitive(CastPrimitive::Any))
    }

    /// Whether this type is optional
    pub fn is_optional(&self) -> bool {
        matches!(self, CastType::Optional(_))
    }

    /// Strip one level of optionality
    pub fn required(&self) -> &CastType {
        match self {
            CastType::Optional(inner) => inner,
            other => other,
        }
    }

    /// FQN of a named type (looking through optionality)
    pub fn named_fqn(&self) -> Option<&str> {
        match self.required() {
            CastType::Named(fqn) => Some(fqn),
            _ => None,
        }
    }

    /// All FQNs referenced anywhere in this type
    pub fn referenced_fqns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fqns(&mut out);
        out
    }

    fn collect_fqns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            CastType::Void | CastType::Primitive(_) => {}
            CastType::Collection { element, .. } => element.collect_fqns(out),
            CastType::Union(options) => {
                for option in options {
                    option.collect_fqns(out);
                }
            }
            CastType::Optional(inner) => inner.collect_fqns(out),
            CastType::Named(fqn) => out.push(fqn),
        }
    }

    /// Render with parentheses around unions (for use inside `T[]`)
    fn describe_with_parens(&self) -> String {
        match self {
            CastType::Union(_) => format!("({})", self),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastType::Void => write!(f, "void"),
            CastType::Primitive(p) => write!(f, "{}", p.as_str()),
            CastType::Collection {
                kind: CollectionKind::Array,
                element,
            } => write!(f, "{}[]", element.describe_with_parens()),
            CastType::Collection {
                kind: CollectionKind::Map,
                element,
            } => write!(f, "Map<string, {}>", element),
            CastType::Union(options) => {
                let parts: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                write!(f, "{}", parts.join(" | "))
            }
            CastType::Optional(inner) => write!(f, "{}?", inner.describe_with_parens()),
            CastType::Named(fqn) => write!(f, "{}", fqn),
        }
    }
}
