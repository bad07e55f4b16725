//! Error and diagnostic types for schema generation.
//!
//! Generation distinguishes two failure classes:
//!
//! - **Hard failures** ([`GenerateError`]) abort the whole run. No partial
//!   schema is returned.
//! - **Soft diagnostics** ([`Diagnostic`]) are collected while generation
//!   continues with a safe default, and are reported next to the output.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for generation operations.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Hard failure that aborts schema generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// A type shape has no representation on the wire.
    #[error("Unsupported shape '{type_name}' at {path}: {reason}")]
    UnsupportedShape {
        type_name: String,
        path: String,
        reason: String,
    },

    /// The object model has no usable name.
    #[error("Object model name is empty")]
    EmptyModelName,
}

impl GenerateError {
    /// Create an unsupported shape error.
    pub fn unsupported_shape(
        type_name: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedShape {
            type_name: type_name.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Category of a soft diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A leaf type could not be mapped and fell back to a default scalar.
    UnsupportedType,
    /// Two distinct shapes produced the same generated identifier.
    NamingCollision,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType => write!(f, "unsupported type"),
            Self::NamingCollision => write!(f, "naming collision"),
        }
    }
}

/// A soft problem found during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Canonical name of the offending type.
    pub type_name: String,
    /// Where the problem was found: a property or parameter path
    /// (`Model.Property`, `Model.Command(param)`), or `schema.<Message>` for
    /// problems with the emitted messages themselves.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' at {}: {}",
            self.kind, self.type_name, self.path, self.message
        )
    }
}

/// Side channel that accumulates soft diagnostics in emission order.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        type_name: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            type_name: type_name.into(),
            path: path.into(),
            message: message.into(),
        };

        tracing::warn!(
            kind = %diagnostic.kind,
            type_name = %diagnostic.type_name,
            path = %diagnostic.path,
            "{}",
            diagnostic.message
        );

        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
