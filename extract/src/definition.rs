//! Declarative parser definitions (JSON/YAML).
//!
//! A definition document describes a parser the way it would be declared in
//! code: option strings, an argparse-style action name, choices, a default,
//! a help text and a value type. [`DefinitionSource`] normalizes the document
//! and builds the equivalent [`clap::Command`] as its parse entry point.
//!
//! ```yaml
//! parser: clap
//! program: prog
//! version: "2.0"
//! arguments:
//!   - flags: ["--verbose", "-v"]
//!     action: count
//!   - flags: ["--version"]
//!     action: version
//! subcommands:
//!   - name: sub1
//!     arguments:
//!       - flags: ["sub1_arg"]
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use argform_core::{
    PathHint, RawAction, RawArgument, RawParser, RawSubparser, SchemaError, SemanticType,
    ValueTransformer,
};
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clap_source::{capture_with, parse_with};
use crate::{ParseEntry, SchemaSource};

/// The only parser dialect definition documents can describe.
pub const CLAP_PARSER: &str = "clap";

fn default_parser() -> String {
    CLAP_PARSER.to_string()
}

fn default_action() -> String {
    "store".to_string()
}

/// A scalar as written in a document (`3`, `0.5`, `true`, `"INFO"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Explicit kind annotation overriding the help-text heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindAnnotation {
    FilePath,
    DirectoryPath,
}

/// One argument of a definition document.
///
/// `flags` holds the option strings; a single entry without a leading dash
/// declares a positional argument of that name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentDefinition {
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Built-in type name (`str`, `int`, `float`, `bool`, `path`) or the
    /// name of a registered transformer.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<KindAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl ArgumentDefinition {
    /// Returns `true` for a single bare name, or a `dest` with no flags.
    pub fn is_positional(&self) -> bool {
        match self.flags.as_slice() {
            [] => true,
            [name] => !name.starts_with('-'),
            _ => false,
        }
    }

    /// Destination name: explicit `dest`, else derived from the first long
    /// option (`--dry-run` → `dry_run`), the first short option or the
    /// positional name.
    pub fn destination(&self) -> Option<String> {
        if let Some(dest) = &self.dest {
            return Some(dest.clone());
        }
        let long = self.flags.iter().find(|f| f.starts_with("--"));
        let first = long.or_else(|| self.flags.first())?;
        Some(first.trim_start_matches('-').replace('-', "_"))
    }
}

/// One subcommand of a definition document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcommandDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default)]
    pub arguments: Vec<ArgumentDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<SubcommandDefinition>,
}

/// A complete definition document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionDocument {
    #[serde(default = "default_parser")]
    pub parser: String,
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: Vec<ArgumentDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<SubcommandDefinition>,
}

impl DefinitionDocument {
    /// Loads a document, picking the format from the file extension
    /// (`.json`, `.yaml` or `.yml`).
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => {
                let reader = BufReader::new(File::open(path)?);
                Ok(serde_json::from_reader(reader)?)
            }
            Some("yaml" | "yml") => {
                let reader = BufReader::new(File::open(path)?);
                Ok(serde_yaml::from_reader(reader)?)
            }
            _ => Err(SchemaError::UnsupportedDocument(path.display().to_string())),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Named value transformers that definition documents can reference by `type`.
///
/// # Examples
///
/// ```
/// use argform_core::{SemanticType, TypedValue, ValueTransformer};
/// use argform_extract::TransformerRegistry;
///
/// let mut registry = TransformerRegistry::new();
/// registry.register(
///     "port",
///     ValueTransformer::returning(SemanticType::Integer, |raw| {
///         raw.parse::<u16>()
///             .map(|p| TypedValue::Integer(p.into()))
///             .map_err(|e| format!("{e}"))
///     }),
/// );
/// assert!(registry.get("port").is_some());
/// assert!(registry.get("str").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransformerRegistry {
    transformers: HashMap<String, ValueTransformer>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, transformer: ValueTransformer) {
        self.transformers.insert(name.to_string(), transformer);
    }

    pub fn get(&self, name: &str) -> Option<&ValueTransformer> {
        self.transformers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transformers.keys().map(String::as_str)
    }
}

/// Schema source and parse entry point backed by a definition document.
#[derive(Debug, Clone)]
pub struct DefinitionSource {
    path: Option<PathBuf>,
    raw: RawParser,
    command: Command,
}

impl DefinitionSource {
    /// Normalizes `document` and builds its clap command.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnsupportedParser`] unless `parser` is `clap`.
    /// - [`SchemaError::UnknownValueType`] for a `type` that is neither built
    ///   in nor registered.
    /// - [`SchemaError::UnsupportedArgument`] for unknown actions.
    /// - [`SchemaError::NestedSubcommands`] for subcommands of subcommands.
    /// - [`SchemaError::UnsupportedDocument`] for arguments clap cannot
    ///   express (multi-character short options, a version action without
    ///   a `version`).
    pub fn new(document: DefinitionDocument, registry: &TransformerRegistry) -> Result<Self, SchemaError> {
        if document.parser != CLAP_PARSER {
            return Err(SchemaError::UnsupportedParser(document.parser));
        }

        let raw = describe_document(&document, registry)?;
        let command = build_command(&document, &raw)?;
        Ok(Self {
            path: None,
            raw,
            command,
        })
    }

    /// Loads a document from disk.
    pub fn from_path(path: &Path, registry: &TransformerRegistry) -> Result<Self, SchemaError> {
        let document = DefinitionDocument::load(path)?;
        let mut source = Self::new(document, registry)?;
        debug!(path = %path.display(), program = %source.raw.program, "Loaded definition document");
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The clap command equivalent to the document.
    pub fn command(&self) -> &Command {
        &self.command
    }
}

impl SchemaSource for DefinitionSource {
    fn describe(&self) -> Result<RawParser, SchemaError> {
        Ok(self.raw.clone())
    }
}

impl ParseEntry for DefinitionSource {
    type Output = ArgMatches;
    type Error = clap::Error;

    fn parse_tokens(&self, tokens: &[String]) -> Result<ArgMatches, clap::Error> {
        parse_with(&self.command, tokens)
    }

    fn capture_display(&self, token: &str) -> Option<String> {
        capture_with(&self.command, token)
    }
}

fn describe_document(
    document: &DefinitionDocument,
    registry: &TransformerRegistry,
) -> Result<RawParser, SchemaError> {
    Ok(RawParser {
        program: document.program.clone(),
        description: document.description.clone(),
        arguments: describe_arguments(&document.arguments, registry)?,
        subparsers: document
            .subcommands
            .iter()
            .map(|sub| describe_subcommand(sub, registry))
            .collect::<Result<_, _>>()?,
    })
}

fn describe_subcommand(
    sub: &SubcommandDefinition,
    registry: &TransformerRegistry,
) -> Result<RawSubparser, SchemaError> {
    Ok(RawSubparser {
        name: sub.name.clone(),
        help: sub.help.clone(),
        arguments: describe_arguments(&sub.arguments, registry)?,
        subparsers: sub
            .subcommands
            .iter()
            .map(|nested| describe_subcommand(nested, registry))
            .collect::<Result<_, _>>()?,
    })
}

fn describe_arguments(
    definitions: &[ArgumentDefinition],
    registry: &TransformerRegistry,
) -> Result<Vec<RawArgument>, SchemaError> {
    definitions
        .iter()
        .enumerate()
        .map(|(index, definition)| describe_argument(index, definition, registry))
        .collect()
}

fn describe_argument(
    index: usize,
    definition: &ArgumentDefinition,
    registry: &TransformerRegistry,
) -> Result<RawArgument, SchemaError> {
    let dest = definition.destination().ok_or_else(|| {
        SchemaError::UnsupportedDocument(format!("argument #{index} declares no flags or dest"))
    })?;

    let mut raw = RawArgument::new(&dest, RawAction::from_name(&definition.action));
    if !definition.is_positional() {
        raw.option_strings = definition.flags.clone();
    }
    raw.choices = definition.choices.iter().map(Literal::to_string).collect();
    raw.default = definition.default.as_ref().map(Literal::to_string);
    raw.help = definition.help.clone();
    raw.path_hint = definition.kind.map(|kind| match kind {
        KindAnnotation::FilePath => PathHint::File,
        KindAnnotation::DirectoryPath => PathHint::Directory,
    });
    raw.required = definition.required.unwrap_or(
        definition.is_positional() && raw.action == RawAction::Store && raw.default.is_none(),
    );

    if let Some(name) = definition.value_type.as_deref() {
        match builtin_type(name) {
            Some(value_type) => raw.value_type = Some(value_type),
            None => {
                let transformer = registry.get(name).ok_or_else(|| SchemaError::UnknownValueType {
                    argument: dest.clone(),
                    name: name.to_string(),
                })?;
                raw.transformer = Some(transformer.clone());
            }
        }
    }
    if raw.value_type == Some(SemanticType::Path) && raw.path_hint.is_none() {
        raw.path_hint = Some(PathHint::File);
    }

    Ok(raw)
}

fn builtin_type(name: &str) -> Option<SemanticType> {
    match name {
        "str" | "string" => Some(SemanticType::Text),
        "int" | "integer" => Some(SemanticType::Integer),
        "float" => Some(SemanticType::Float),
        "bool" | "boolean" => Some(SemanticType::Boolean),
        "path" => Some(SemanticType::Path),
        _ => None,
    }
}

fn build_command(document: &DefinitionDocument, raw: &RawParser) -> Result<Command, SchemaError> {
    let mut command = Command::new(raw.program.clone())
        .disable_help_flag(true)
        .disable_version_flag(true)
        .disable_help_subcommand(true);
    if let Some(version) = &document.version {
        command = command.version(version.clone());
    }
    if let Some(description) = &raw.description {
        command = command.about(description.clone());
    }

    let has_subcommands = !raw.subparsers.is_empty();
    for argument in &raw.arguments {
        let global = has_subcommands
            && !argument.is_positional()
            && !argument.required
            && !matches!(argument.action, RawAction::Help | RawAction::Version);
        command = command.arg(build_arg(document, argument)?.global(global));
    }

    for sub in &raw.subparsers {
        if let Some(nested) = sub.subparsers.first() {
            return Err(SchemaError::NestedSubcommands {
                path: format!("{} {} {}", raw.program, sub.name, nested.name),
            });
        }
        let mut subcommand = Command::new(sub.name.clone()).disable_help_flag(true);
        if let Some(help) = &sub.help {
            subcommand = subcommand.about(help.clone());
        }
        for argument in &sub.arguments {
            subcommand = subcommand.arg(build_arg(document, argument)?);
        }
        command = command.subcommand(subcommand);
    }

    Ok(command)
}

fn build_arg(document: &DefinitionDocument, raw: &RawArgument) -> Result<Arg, SchemaError> {
    let action = match &raw.action {
        RawAction::Store => ArgAction::Set,
        RawAction::Append => ArgAction::Append,
        RawAction::StoreTrue | RawAction::StoreConst => ArgAction::SetTrue,
        RawAction::StoreFalse => ArgAction::SetFalse,
        RawAction::Count => ArgAction::Count,
        RawAction::Help => ArgAction::Help,
        RawAction::Version if document.version.is_some() => ArgAction::Version,
        RawAction::Version => {
            return Err(SchemaError::UnsupportedDocument(format!(
                "version action `{}` requires a document `version`",
                raw.dest
            )));
        }
        RawAction::Unsupported(name) => {
            return Err(SchemaError::UnsupportedArgument {
                argument: raw.dest.clone(),
                action: name.clone(),
            });
        }
    };

    let mut arg = Arg::new(raw.dest.clone()).action(action);
    let (mut has_long, mut has_short) = (false, false);
    for option in &raw.option_strings {
        if let Some(long) = option.strip_prefix("--") {
            arg = if has_long {
                arg.alias(long.to_string())
            } else {
                arg.long(long.to_string())
            };
            has_long = true;
        } else if let Some(short) = single_short(option) {
            arg = if has_short {
                arg.short_alias(short)
            } else {
                arg.short(short)
            };
            has_short = true;
        } else {
            return Err(SchemaError::UnsupportedDocument(format!(
                "option `{option}` of `{}` is not a valid clap flag",
                raw.dest
            )));
        }
    }

    if let Some(help) = &raw.help {
        arg = arg.help(help.clone());
    }

    if raw.action.takes_value() {
        // Integer fields and transformers can produce values like `-5`.
        arg = arg.allow_negative_numbers(true);
        if !raw.choices.is_empty() {
            arg = arg.value_parser(PossibleValuesParser::new(raw.choices.clone()));
        } else if let Some(transformer) = raw.transformer.clone() {
            arg = arg.value_parser(move |value: &str| {
                transformer.apply(value).map(|typed| typed.to_token())
            });
        } else {
            arg = match raw.value_type.unwrap_or_default() {
                SemanticType::Text => arg,
                SemanticType::Integer => arg.value_parser(clap::value_parser!(i64)),
                SemanticType::Float => arg.value_parser(clap::value_parser!(f64)),
                SemanticType::Boolean => arg.value_parser(clap::value_parser!(bool)),
                SemanticType::Path => arg.value_parser(clap::value_parser!(PathBuf)),
            };
        }
        if let Some(default) = &raw.default {
            arg = arg.default_value(default.clone());
        }
    } else if raw.action == RawAction::Count {
        if let Some(default) = &raw.default {
            arg = arg.default_value(default.clone());
        }
    }

    Ok(arg.required(raw.required))
}

fn single_short(option: &str) -> Option<char> {
    let mut chars = option.strip_prefix('-')?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '-' => Some(c),
        _ => None,
    }
}
