//! # Error Types
//!
//! Errors raised by the data-model layer. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Build-time errors of the type library itself live in `tydef-schema`;
//! this crate only reports problems it can detect without a registry:
//! malformed names and unparseable resource strings.

use thiserror::Error;

/// Error constructing or parsing a [`QualifiedName`](crate::QualifiedName).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name has no `system/` prefix where one is required.
    #[error("type name '{0}' is not system-qualified (expected 'system/name')")]
    Unqualified(String),

    /// The system or name segment is empty.
    #[error("type name '{0}' has an empty system or name segment")]
    EmptySegment(String),
}

/// A resource string could not be parsed as YAML or JSON.
#[derive(Error, Debug, Clone)]
#[error("failed to parse resource: {reason}")]
pub struct ParseError {
    /// The original text that was handed to the parser.
    pub raw: String,
    /// The underlying parser message.
    pub reason: String,
}
