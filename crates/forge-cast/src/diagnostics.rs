//! Error types and diagnostics
//!
//! Every failure in forge-cast is fatal to the generation pass of the
//! assembly being processed. Errors fall into a small number of categories
//! so callers can tell user-fixable input problems apart from internal
//! invariant violations.

use std::fmt;
use thiserror::Error;

/// Result type for forge-cast operations
pub type CastResult<T> = Result<T, CastError>;

/// Main error type for forge-cast
#[derive(Debug, Error)]
pub enum CastError {
    /// Missing or inconsistent target module configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A type reference names an FQN nobody declared
    #[error("Could not locate type: \"{fqn}\"")]
    UnknownFqn { fqn: String },

    /// Two declarations normalize to the same target FQN
    #[error("Symbol collision: \"{fqn}\" is declared more than once after normalization")]
    SymbolCollision { fqn: String },

    /// More than one live member projects to the same target name
    #[error("Multiple non-deprecated members which map to the Python name \"{name}\"")]
    AmbiguousName { name: String },

    /// Every member projecting to the same target name is deprecated
    #[error("Multiple members which map to the Python name \"{name}\", but all of them are deprecated")]
    AllDeprecated { name: String },

    /// The member sorter made no progress
    #[error("Could not sort members (circular dependency?). Leftover: {}", .leftover.join(", "))]
    CircularDependency { leftover: Vec<String> },

    /// One alias is bound to two different imports
    #[error("Alias \"{alias}\" is bound to both \"{first}\" and \"{second}\"")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },

    /// Internal invariant violated (a bug, not bad input)
    #[error("Internal error: {0}")]
    Invariant(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IR (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CastError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        CastError::Config(message.into())
    }

    /// Create an unknown-FQN resolution error
    pub fn unknown(fqn: impl Into<String>) -> Self {
        CastError::UnknownFqn { fqn: fqn.into() }
    }

    /// Create an internal invariant error
    pub fn invariant(message: impl Into<String>) -> Self {
        CastError::Invariant(message.into())
    }

    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            CastError::Config(_) | CastError::ConfigParse(_) => ErrorCategory::Configuration,
            CastError::UnknownFqn { .. }
            | CastError::SymbolCollision { .. }
            | CastError::AmbiguousName { .. }
            | CastError::AllDeprecated { .. }
            | CastError::CircularDependency { .. }
            | CastError::AliasCollision { .. } => ErrorCategory::Resolution,
            CastError::Invariant(_) => ErrorCategory::Internal,
            CastError::Io(_) | CastError::Serialization(_) => ErrorCategory::Io,
        }
    }
}

/// Broad class of a [`CastError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad target configuration, detected before generation
    Configuration,
    /// The assembly cannot be projected consistently
    Resolution,
    /// Programmer error
    Internal,
    /// Reading or writing files
    Io,
}

impl ErrorCategory {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Resolution => "resolution",
            ErrorCategory::Internal => "internal",
            ErrorCategory::Io => "io",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_dependency_message() {
        let err = CastError::CircularDependency {
            leftover: vec!["Left".into(), "Right".into()],
        };
        assert_eq!(
            err.to_string(),
            "Could not sort members (circular dependency?). Leftover: Left, Right"
        );
        assert_eq!(err.category(), ErrorCategory::Resolution);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            CastError::config("no python target").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            CastError::invariant("wrong kind").category(),
            ErrorCategory::Internal
        );
        assert_eq!(CastError::unknown("Acme.Nope").category(), ErrorCategory::Resolution);
    }
}
