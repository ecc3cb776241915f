//! Raw action list as exposed by a parsing library.
//!
//! Adapters translate their parser's own argument objects into these types;
//! the extractor and the type resolver work only on this representation.

use crate::types::{SemanticType, ValueTransformer};

/// Storage action of a raw argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAction {
    /// Stores a single value.
    Store,
    /// Sets a boolean to `true` when present.
    StoreTrue,
    /// Sets a boolean to `false` when present.
    StoreFalse,
    /// Stores a fixed constant when present.
    StoreConst,
    /// Counts occurrences.
    Count,
    /// Accumulates one value per occurrence.
    Append,
    /// Shows help and exits.
    Help,
    /// Shows version information and exits.
    Version,
    /// Any action the pipeline does not know how to represent.
    Unsupported(String),
}

impl RawAction {
    /// Parses an argparse-style action name (`store`, `store_true`, ...).
    ///
    /// Unknown names map to [`RawAction::Unsupported`].
    ///
    /// # Examples
    ///
    /// ```
    /// use argform_core::RawAction;
    ///
    /// assert_eq!(RawAction::from_name("count"), RawAction::Count);
    /// assert_eq!(RawAction::from_name("extend"), RawAction::Unsupported("extend".into()));
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "store" | "set" => Self::Store,
            "store_true" | "set_true" => Self::StoreTrue,
            "store_false" | "set_false" => Self::StoreFalse,
            "store_const" => Self::StoreConst,
            "count" => Self::Count,
            "append" => Self::Append,
            "help" => Self::Help,
            "version" => Self::Version,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Store => "store",
            Self::StoreTrue => "store_true",
            Self::StoreFalse => "store_false",
            Self::StoreConst => "store_const",
            Self::Count => "count",
            Self::Append => "append",
            Self::Help => "help",
            Self::Version => "version",
            Self::Unsupported(name) => name,
        }
    }

    /// Returns `true` for actions that consume a value from the command line.
    pub fn takes_value(&self) -> bool {
        matches!(self, Self::Store | Self::Append)
    }
}

/// Explicit path annotation overriding the help-text heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathHint {
    File,
    Directory,
}

/// One argument as declared in the source parser.
#[derive(Debug, Clone)]
pub struct RawArgument {
    /// Option strings in declaration order; empty for positionals.
    pub option_strings: Vec<String>,
    /// Destination name.
    pub dest: String,
    pub action: RawAction,
    pub choices: Vec<String>,
    /// Default in its textual command-line form.
    pub default: Option<String>,
    pub help: Option<String>,
    /// Declared built-in value type.
    pub value_type: Option<SemanticType>,
    /// User-supplied value transformer.
    pub transformer: Option<ValueTransformer>,
    pub path_hint: Option<PathHint>,
    pub required: bool,
}

impl RawArgument {
    /// Creates a positional argument with no option strings.
    pub fn new(dest: &str, action: RawAction) -> Self {
        Self {
            option_strings: Vec::new(),
            dest: dest.to_string(),
            action,
            choices: Vec::new(),
            default: None,
            help: None,
            value_type: None,
            transformer: None,
            path_hint: None,
            required: false,
        }
    }

    /// Adds an option string.
    pub fn flag(mut self, option: &str) -> Self {
        self.option_strings.push(option.to_string());
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn value_type(mut self, value_type: SemanticType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn transformer(mut self, transformer: ValueTransformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub fn path_hint(mut self, hint: PathHint) -> Self {
        self.path_hint = Some(hint);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn is_positional(&self) -> bool {
        self.option_strings.is_empty()
    }
}

/// A sub-parser and its arguments.
///
/// `subparsers` is populated when the library nests sub-parsers more than
/// one level deep; the extractor rejects such definitions.
#[derive(Debug, Clone, Default)]
pub struct RawSubparser {
    pub name: String,
    pub help: Option<String>,
    pub arguments: Vec<RawArgument>,
    pub subparsers: Vec<RawSubparser>,
}

/// A complete parser definition.
#[derive(Debug, Clone, Default)]
pub struct RawParser {
    pub program: String,
    pub description: Option<String>,
    pub arguments: Vec<RawArgument>,
    pub subparsers: Vec<RawSubparser>,
}
