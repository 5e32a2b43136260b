//! Documentation blocks
//!
//! Docs are opaque text to the core; only the emitters look inside.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// API stability level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    Experimental,
    Stable,
    Deprecated,
    External,
}

impl Stability {
    /// IR spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Experimental => "experimental",
            Stability::Stable => "stable",
            Stability::Deprecated => "deprecated",
            Stability::External => "external",
        }
    }

    /// Stable and external APIs are stable by implication
    pub fn is_notable(&self) -> bool {
        matches!(self, Stability::Experimental | Stability::Deprecated)
    }
}

/// Documentation attached to a declaration or member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Docs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub see: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<Stability>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub subclassable: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom: IndexMap<String, String>,
}

impl Docs {
    /// Docs with only a summary
    pub fn summary(text: impl Into<String>) -> Self {
        Docs {
            summary: Some(text.into()),
            ..Default::default()
        }
    }

    /// Mark as deprecated
    pub fn with_deprecated(mut self, notice: impl Into<String>) -> Self {
        self.deprecated = Some(notice.into());
        self
    }

    /// Whether a deprecation notice is present
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    /// Whether no field carries content
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.remarks.is_none()
            && self.returns.is_none()
            && self.default.is_none()
            && self.deprecated.is_none()
            && self.example.is_none()
            && self.see.is_none()
            && self.stability.is_none()
            && !self.subclassable
            && self.custom.is_empty()
    }
}
