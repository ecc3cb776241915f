//! Error types for the form model and the session runner.

use argform_core::{SchemaError, SerializeError};
use thiserror::Error;

use crate::toolkit::ToolkitError;

/// Errors raised by [`Form`](crate::Form) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// No editable field is bound to the key.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The schema has no subcommand group with that name.
    #[error("unknown subcommand group: {0}")]
    UnknownGroup(String),
}

/// Errors raised while loading or saving a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors that end a form session.
///
/// `E` is the error type of the parser's entry point; parse failures on the
/// final argument vector are passed through unchanged.
#[derive(Debug, Error)]
pub enum SessionError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A serialization failure not tied to a single field.
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("toolkit failure: {0}")]
    Toolkit(#[from] ToolkitError),

    #[error(transparent)]
    Parse(E),
}
