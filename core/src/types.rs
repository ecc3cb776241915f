//! Schema type definitions for normalized command-line arguments.
//!
//! This module defines the toolkit-agnostic data model produced by schema
//! extraction and consumed by the form model and the serializer. Every type
//! except [`ValueTransformer`] round-trips through JSON and YAML; transformers
//! are functions and are skipped during serialization.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::state::FieldKey;

/// Version of the schema contract (semver).
///
/// Embedded in every [`Schema`] to track compatibility of serialized schemas.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Semantic category governing how an argument renders and reconstructs.
///
/// # Examples
///
/// ```
/// use argform_core::ArgumentKind;
///
/// assert!(ArgumentKind::Counting.is_field());
/// assert!(!ArgumentKind::Display.is_field());
/// assert_eq!(ArgumentKind::AppendList.to_string(), "append_list");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    /// Single free-text value.
    Value,
    /// Boolean toggle; the token is emitted only when set.
    Flag,
    /// One value out of a fixed list.
    Choice,
    /// Repeatable counter (`-vvv`).
    Counting,
    /// Whitespace-separated values, one token pair per value.
    AppendList,
    /// Value passed through a user-supplied transformer.
    CustomTyped,
    /// Filesystem path to a file.
    FilePath,
    /// Filesystem path to a directory.
    DirectoryPath,
    /// "Display and exit" action (version); never serialized.
    Display,
}

impl ArgumentKind {
    /// Returns `true` when the kind produces an editable form field.
    pub fn is_field(self) -> bool {
        !matches!(self, Self::Display)
    }

    /// Stable snake_case label, identical to the serde representation.
    pub fn label(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Flag => "flag",
            Self::Choice => "choice",
            Self::Counting => "counting",
            Self::AppendList => "append_list",
            Self::CustomTyped => "custom_typed",
            Self::FilePath => "file_path",
            Self::DirectoryPath => "directory_path",
            Self::Display => "display",
        }
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declared scalar type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Free text (the default).
    #[default]
    Text,
    /// Signed integer.
    Integer,
    /// Floating point number.
    Float,
    /// Boolean.
    Boolean,
    /// Filesystem path.
    Path,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Path => "path",
        };
        f.write_str(label)
    }
}

/// Output of a [`ValueTransformer`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Path(PathBuf),
}

impl TypedValue {
    /// Semantic type of this value.
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Self::Text(_) => SemanticType::Text,
            Self::Integer(_) => SemanticType::Integer,
            Self::Float(_) => SemanticType::Float,
            Self::Boolean(_) => SemanticType::Boolean,
            Self::Path(_) => SemanticType::Path,
        }
    }

    /// Renders the value as a command-line token.
    ///
    /// The rendering is locale-independent so the token re-parses to the
    /// same value.
    ///
    /// # Examples
    ///
    /// ```
    /// use argform_core::TypedValue;
    ///
    /// assert_eq!(TypedValue::Integer(-42).to_token(), "-42");
    /// assert_eq!(TypedValue::Float(0.5).to_token(), "0.5");
    /// assert_eq!(TypedValue::Boolean(true).to_token(), "true");
    /// ```
    pub fn to_token(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Boolean(value) => value.to_string(),
            Self::Path(path) => path.to_string_lossy().into_owned(),
        }
    }
}

type TransformFn = dyn Fn(&str) -> Result<TypedValue, String> + Send + Sync;

/// A pure `raw → value` function attached to a custom-typed argument.
///
/// The output type is data, not something recovered by introspection.
/// Transformers built with [`ValueTransformer::new`] carry no declared output
/// type and are rejected by the type resolver.
///
/// # Examples
///
/// ```
/// use argform_core::{SemanticType, TypedValue, ValueTransformer};
///
/// let threads = ValueTransformer::returning(SemanticType::Integer, |raw| {
///     let n: i64 = raw.trim().parse().map_err(|e| format!("{e}"))?;
///     if n < 1 {
///         return Err(format!("thread count must be positive, got {n}"));
///     }
///     Ok(TypedValue::Integer(n))
/// });
///
/// assert_eq!(threads.apply("4"), Ok(TypedValue::Integer(4)));
/// assert!(threads.apply("0").is_err());
/// ```
#[derive(Clone)]
pub struct ValueTransformer {
    output: Option<SemanticType>,
    func: Arc<TransformFn>,
}

impl ValueTransformer {
    /// Creates a transformer without a declared output type.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str) -> Result<TypedValue, String> + Send + Sync + 'static,
    {
        Self {
            output: None,
            func: Arc::new(func),
        }
    }

    /// Creates a transformer declaring its output type.
    pub fn returning<F>(output: SemanticType, func: F) -> Self
    where
        F: Fn(&str) -> Result<TypedValue, String> + Send + Sync + 'static,
    {
        Self {
            output: Some(output),
            func: Arc::new(func),
        }
    }

    /// Declared output type, if any.
    pub fn declared_output(&self) -> Option<SemanticType> {
        self.output
    }

    /// Runs the transformer.
    ///
    /// A value whose type differs from the declared output is rejected.
    pub fn apply(&self, raw: &str) -> Result<TypedValue, String> {
        let value = (self.func)(raw)?;
        match self.output {
            Some(expected) if value.semantic_type() != expected => Err(format!(
                "transformer declared {expected} output but produced {}",
                value.semantic_type()
            )),
            _ => Ok(value),
        }
    }
}

impl fmt::Debug for ValueTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueTransformer")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Current or default value of a form field.
///
/// Flags hold [`Bool`](FieldValue::Bool), counters and integer spinners hold
/// [`Count`](FieldValue::Count), every other kind holds
/// [`Text`](FieldValue::Text). Values files deserialize untagged, so `true`,
/// `3` and `"out.txt"` all map naturally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Count(i32),
    Text(String),
}

impl FieldValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Neutral starting value for a kind when the parser declares no default.
    pub fn neutral_for(kind: ArgumentKind) -> Self {
        match kind {
            ArgumentKind::Flag => Self::Bool(false),
            ArgumentKind::Counting => Self::Count(0),
            _ => Self::Text(String::new()),
        }
    }

    /// Returns `true` for empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// Textual content for value-carrying kinds.
    ///
    /// Counts render as integers; booleans have no text form.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) => Some(Cow::Borrowed(text)),
            Self::Count(n) => Some(Cow::Owned(n.to_string())),
            Self::Bool(_) => None,
        }
    }

    /// Boolean content; accepts `"true"`/`"false"` text.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Count(_) => None,
        }
    }

    /// Integer content; accepts integer text and treats blank text as zero.
    pub fn as_count(&self) -> Option<i32> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Text(text) if text.trim().is_empty() => Some(0),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Count(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// One normalized command-line argument.
///
/// Use [`option`](ArgumentDescriptor::option) or
/// [`positional`](ArgumentDescriptor::positional) and chain the builder
/// methods.
///
/// # Examples
///
/// ```
/// use argform_core::{ArgumentDescriptor, ArgumentKind, FieldValue};
///
/// let verbose = ArgumentDescriptor::option("-v", "verbose", ArgumentKind::Counting)
///     .with_help("Increase verbosity");
/// assert_eq!(verbose.default, FieldValue::Count(0));
/// assert!(!verbose.is_positional());
///
/// let input = ArgumentDescriptor::positional("input", ArgumentKind::FilePath);
/// assert!(input.is_positional());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    /// Token emitted on the command line; `None` for positionals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_token: Option<String>,
    /// Remaining option strings declared for the same argument.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Destination the value is bound to.
    pub name: String,
    pub kind: ArgumentKind,
    /// Permitted values, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Value used when the field is never touched.
    #[serde(default)]
    pub default: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Declared scalar type of the value.
    #[serde(default)]
    pub value_type: SemanticType,
    #[serde(default)]
    pub required: bool,
    /// Present only for [`ArgumentKind::CustomTyped`].
    #[serde(skip)]
    pub transformer: Option<ValueTransformer>,
}

impl ArgumentDescriptor {
    /// Creates an optional argument addressed by `token`.
    pub fn option(token: &str, name: &str, kind: ArgumentKind) -> Self {
        Self {
            cli_token: Some(token.to_string()),
            ..Self::positional(name, kind)
        }
    }

    /// Creates a positional argument.
    pub fn positional(name: &str, kind: ArgumentKind) -> Self {
        Self {
            cli_token: None,
            aliases: Vec::new(),
            name: name.to_string(),
            kind,
            choices: Vec::new(),
            default: FieldValue::neutral_for(kind),
            help: None,
            value_type: SemanticType::Text,
            required: false,
            transformer: None,
        }
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: FieldValue) -> Self {
        self.default = default;
        self
    }

    /// Sets the permitted values.
    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Adds a help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Sets the declared value type.
    pub fn with_value_type(mut self, value_type: SemanticType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Attaches a value transformer; its declared output becomes the value type.
    pub fn with_transformer(mut self, transformer: ValueTransformer) -> Self {
        if let Some(output) = transformer.declared_output() {
            self.value_type = output;
        }
        self.transformer = Some(transformer);
        self
    }

    /// Marks the argument as required by the parser.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns `true` for positional arguments (no token).
    pub fn is_positional(&self) -> bool {
        self.cli_token.is_none()
    }

    /// Human-facing label: the help text, falling back to the token or name.
    pub fn label(&self) -> &str {
        self.help
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .or(self.cli_token.as_deref())
            .unwrap_or(&self.name)
    }
}

/// One named subcommand and the arguments scoped to it.
///
/// # Examples
///
/// ```
/// use argform_core::{ArgumentDescriptor, ArgumentKind, SubcommandGroup};
///
/// let sub = SubcommandGroup::new("sub1")
///     .with_argument(ArgumentDescriptor::positional("sub1_arg", ArgumentKind::Value));
/// assert_eq!(sub.name, "sub1");
/// assert_eq!(sub.own_arguments.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubcommandGroup {
    /// Subcommand token.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Arguments scoped to this subcommand, in declaration order.
    pub own_arguments: Vec<ArgumentDescriptor>,
}

impl SubcommandGroup {
    /// Creates an empty group.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Appends an argument.
    pub fn with_argument(mut self, argument: ArgumentDescriptor) -> Self {
        self.own_arguments.push(argument);
        self
    }
}

/// An argument together with the key of the value holder it binds to.
#[derive(Debug, Clone, Copy)]
pub struct ScopedArgument<'a> {
    /// Owning group, `None` for global arguments.
    pub group: Option<&'a str>,
    pub descriptor: &'a ArgumentDescriptor,
}

impl ScopedArgument<'_> {
    /// Key of the value holder bound to this argument.
    pub fn key(&self) -> FieldKey {
        FieldKey::for_scope(self.group, &self.descriptor.name)
    }
}

/// Root aggregate: global arguments and zero or one level of subcommands.
///
/// A schema without subcommands renders as a flat form; with subcommands it
/// renders one tab per group.
///
/// # Examples
///
/// ```
/// use argform_core::*;
///
/// let mut schema = Schema::new("prog");
/// schema.arguments.push(ArgumentDescriptor::option("--verbose", "verbose", ArgumentKind::Flag));
/// schema.subcommands.push(
///     SubcommandGroup::new("sub1")
///         .with_argument(ArgumentDescriptor::positional("sub1_arg", ArgumentKind::Value)),
/// );
///
/// assert!(schema.is_tabbed());
/// let scoped = schema.scoped_arguments(Some("sub1")).unwrap();
/// let names: Vec<_> = scoped.iter().map(|a| a.descriptor.name.as_str()).collect();
/// assert_eq!(names, vec!["sub1_arg", "verbose"]);
/// assert!(schema.scoped_arguments(Some("sub9")).is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Schema contract version (populated from [`SCHEMA_CONTRACT_VERSION`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Program name as the parser knows it.
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Global arguments, in declaration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentDescriptor>,
    #[serde(default)]
    pub subcommands: Vec<SubcommandGroup>,
}

impl Schema {
    /// Creates an empty schema for `program`.
    pub fn new(program: &str) -> Self {
        Self {
            schema_version: Some(SCHEMA_CONTRACT_VERSION.to_string()),
            program: program.to_string(),
            ..Default::default()
        }
    }

    /// Returns `true` when the schema renders as tabs.
    pub fn is_tabbed(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Finds a subcommand group by name.
    pub fn find_group(&self, name: &str) -> Option<&SubcommandGroup> {
        self.subcommands.iter().find(|g| g.name == name)
    }

    /// Names of all subcommand groups.
    pub fn group_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|g| g.name.as_str()).collect()
    }

    /// Active arguments for `group`: the group's own arguments followed by the
    /// global ones. Without a group, only the global arguments.
    ///
    /// Returns `None` if `group` names no subcommand.
    pub fn scoped_arguments(&self, group: Option<&str>) -> Option<Vec<ScopedArgument<'_>>> {
        let globals = self.arguments.iter().map(|descriptor| ScopedArgument {
            group: None,
            descriptor,
        });

        match group {
            None => Some(globals.collect()),
            Some(name) => {
                let found = self.find_group(name)?;
                Some(
                    found
                        .own_arguments
                        .iter()
                        .map(|descriptor| ScopedArgument {
                            group: Some(found.name.as_str()),
                            descriptor,
                        })
                        .chain(globals)
                        .collect(),
                )
            }
        }
    }

    /// Every argument in every scope, globals first.
    pub fn all_arguments(&self) -> Vec<ScopedArgument<'_>> {
        let mut all: Vec<ScopedArgument<'_>> = self
            .arguments
            .iter()
            .map(|descriptor| ScopedArgument {
                group: None,
                descriptor,
            })
            .collect();
        for group in &self.subcommands {
            all.extend(group.own_arguments.iter().map(|descriptor| ScopedArgument {
                group: Some(group.name.as_str()),
                descriptor,
            }));
        }
        all
    }

    /// Finds the descriptor bound to `key`.
    pub fn find_argument(&self, key: &FieldKey) -> Option<&ArgumentDescriptor> {
        match key.group.as_deref() {
            None => self.arguments.iter().find(|a| a.name == key.name),
            Some(group) => self
                .find_group(group)?
                .own_arguments
                .iter()
                .find(|a| a.name == key.name),
        }
    }
}
