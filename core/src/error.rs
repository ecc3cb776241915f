//! Error types for schema extraction and argument-vector reconstruction.
//!
//! [`SchemaError`] covers everything that prevents a parser definition from
//! being normalized; it is fatal and surfaces before any form is shown.
//! [`SerializeError`] covers failures while turning form values into tokens;
//! field-bound variants can be reported back into a still-open form.

use thiserror::Error;

use crate::state::FieldKey;
use crate::types::ArgumentKind;

/// Errors raised while extracting a [`Schema`](crate::Schema).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The source describes a parser dialect no adapter handles.
    #[error("unsupported parser: {0}")]
    UnsupportedParser(String),

    /// An argument uses a storage action the pipeline cannot represent.
    #[error("unsupported action `{action}` for argument `{argument}`")]
    UnsupportedArgument { argument: String, action: String },

    /// A custom value transformer declares no output type.
    #[error("custom type of argument `{argument}` declares no output type")]
    AmbiguousType { argument: String },

    /// Sub-parsers are nested deeper than one level.
    #[error("subcommands nested deeper than one level: {path}")]
    NestedSubcommands { path: String },

    /// A definition names a value type that is neither built in nor registered.
    #[error("unknown value type `{name}` for argument `{argument}`")]
    UnknownValueType { argument: String, name: String },

    /// A definition file has an extension no loader recognizes.
    #[error("unsupported definition document: {0}")]
    UnsupportedDocument(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while serializing form values into an argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// The value held by a field cannot be serialized for its kind.
    #[error("field `{field}` of kind {kind} cannot be serialized from value `{value}`")]
    UnhandledKind {
        field: FieldKey,
        kind: ArgumentKind,
        value: String,
    },

    /// A custom value transformer rejected the input.
    #[error("invalid value for `{field}`: {message}")]
    ValueTransform { field: FieldKey, message: String },

    /// A choice field holds a value outside its permitted list.
    #[error("invalid choice `{value}` for `{field}` (expected one of: {})", choices.join(", "))]
    InvalidChoice {
        field: FieldKey,
        value: String,
        choices: Vec<String>,
    },

    /// A counter is below its default, which would need a negative repeat.
    #[error("count for `{field}` is {value}, below its default of {baseline}")]
    NegativeRepeat {
        field: FieldKey,
        value: i64,
        baseline: i64,
    },

    /// A custom-typed field has no transformer attached.
    #[error("custom-typed field `{field}` has no value transformer")]
    MissingTransformer { field: FieldKey },

    /// The active group names no subcommand of the schema.
    #[error("unknown subcommand group: {0}")]
    UnknownGroup(String),
}

impl SerializeError {
    /// Key of the offending field for errors tied to one field.
    ///
    /// Such errors are recoverable: the form can show them next to the field
    /// and let the user correct the value.
    pub fn field(&self) -> Option<&FieldKey> {
        match self {
            Self::ValueTransform { field, .. }
            | Self::InvalidChoice { field, .. }
            | Self::NegativeRepeat { field, .. } => Some(field),
            Self::UnhandledKind { .. } | Self::MissingTransformer { .. } | Self::UnknownGroup(_) => {
                None
            }
        }
    }
}
