//! Adapter for [`clap::Command`] definitions.
//!
//! The command is cloned and built before it is walked, so the auto-generated
//! help and version arguments show up like any declared argument.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use argform_core::{
    PathHint, RawAction, RawArgument, RawParser, RawSubparser, SchemaError, SemanticType,
    ValueTransformer,
};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use tracing::debug;

use crate::{ParseEntry, SchemaSource};

/// Schema source and parse entry point backed by a [`clap::Command`].
///
/// clap value parsers are opaque, so custom-typed arguments need their
/// transformer registered by argument id with
/// [`with_transformer`](ClapSource::with_transformer).
///
/// # Examples
///
/// ```
/// use argform_core::{ArgumentKind, SemanticType, TypedValue, ValueTransformer};
/// use argform_extract::{ClapSource, SchemaSource};
/// use clap::{Arg, Command};
///
/// let command = Command::new("prog").arg(Arg::new("threads").long("threads"));
/// let source = ClapSource::new(command).with_transformer(
///     "threads",
///     ValueTransformer::returning(SemanticType::Integer, |raw| {
///         raw.parse().map(TypedValue::Integer).map_err(|e| format!("{e}"))
///     }),
/// );
///
/// let schema = source.extract().unwrap();
/// assert_eq!(schema.arguments[0].kind, ArgumentKind::CustomTyped);
/// ```
#[derive(Debug, Clone)]
pub struct ClapSource {
    command: Command,
    transformers: HashMap<String, ValueTransformer>,
}

impl ClapSource {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            transformers: HashMap::new(),
        }
    }

    /// Attaches a value transformer to the argument with id `id`.
    pub fn with_transformer(mut self, id: &str, transformer: ValueTransformer) -> Self {
        self.transformers.insert(id.to_string(), transformer);
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    fn describe_arguments(&self, command: &Command, inherited: &HashSet<String>) -> Vec<RawArgument> {
        command
            .get_arguments()
            .filter(|arg| !inherited.contains(arg.get_id().as_str()))
            .map(|arg| self.describe_argument(arg))
            .collect()
    }

    fn describe_argument(&self, arg: &Arg) -> RawArgument {
        let id = arg.get_id().as_str();
        let action = raw_action(arg.get_action());

        let mut raw = RawArgument::new(id, action);
        if let Some(long) = arg.get_long() {
            raw.option_strings.push(format!("--{long}"));
        }
        if let Some(short) = arg.get_short() {
            raw.option_strings.push(format!("-{short}"));
        }

        if raw.action.takes_value() {
            raw.choices = arg
                .get_possible_values()
                .iter()
                .filter(|value| !value.is_hide_set())
                .map(|value| value.get_name().to_string())
                .collect();
            raw.value_type = semantic_type(arg);
        }

        let defaults: Vec<String> = arg
            .get_default_values()
            .iter()
            .map(|value| value.to_string_lossy().into_owned())
            .collect();
        if !defaults.is_empty() {
            raw.default = Some(defaults.join(" "));
        }

        raw.help = arg.get_help().map(|help| help.to_string());
        raw.path_hint = match arg.get_value_hint() {
            ValueHint::FilePath | ValueHint::ExecutablePath => Some(PathHint::File),
            ValueHint::DirPath => Some(PathHint::Directory),
            _ => None,
        };
        raw.required = arg.is_required_set();
        raw.transformer = self.transformers.get(id).cloned();

        debug!(argument = id, action = raw.action.name(), "Described clap argument");
        raw
    }

    fn describe_subcommand(&self, command: &Command, inherited: &HashSet<String>) -> RawSubparser {
        RawSubparser {
            name: command.get_name().to_string(),
            help: command.get_about().map(|about| about.to_string()),
            arguments: self.describe_arguments(command, inherited),
            subparsers: visible_subcommands(command)
                .map(|sub| self.describe_subcommand(sub, inherited))
                .collect(),
        }
    }
}

impl SchemaSource for ClapSource {
    fn describe(&self) -> Result<RawParser, SchemaError> {
        let mut command = self.command.clone();
        command.build();

        // Global arguments are propagated into every subcommand; they belong
        // to the top-level scope only.
        let globals: HashSet<String> = command
            .get_arguments()
            .filter(|arg| arg.is_global_set())
            .map(|arg| arg.get_id().as_str().to_string())
            .collect();

        Ok(RawParser {
            program: command.get_name().to_string(),
            description: command.get_about().map(|about| about.to_string()),
            arguments: self.describe_arguments(&command, &HashSet::new()),
            subparsers: visible_subcommands(&command)
                .map(|sub| self.describe_subcommand(sub, &globals))
                .collect(),
        })
    }
}

impl ParseEntry for ClapSource {
    type Output = ArgMatches;
    type Error = clap::Error;

    fn parse_tokens(&self, tokens: &[String]) -> Result<ArgMatches, clap::Error> {
        parse_with(&self.command, tokens)
    }

    fn capture_display(&self, token: &str) -> Option<String> {
        capture_with(&self.command, token)
    }
}

/// Maps a clap action to its raw counterpart.
fn raw_action(action: &ArgAction) -> RawAction {
    match action {
        ArgAction::Set => RawAction::Store,
        ArgAction::Append => RawAction::Append,
        ArgAction::SetTrue => RawAction::StoreTrue,
        ArgAction::SetFalse => RawAction::StoreFalse,
        ArgAction::Count => RawAction::Count,
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong => RawAction::Help,
        ArgAction::Version => RawAction::Version,
        other => RawAction::Unsupported(format!("{other:?}").to_lowercase()),
    }
}

/// Semantic type of the value parser's output, for the builtin types clap
/// knows how to parse.
fn semantic_type(arg: &Arg) -> Option<SemanticType> {
    let output = arg.get_value_parser().type_id();
    let is = |ids: &[TypeId]| ids.iter().any(|id| output == *id);

    if is(&[
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<isize>(),
        TypeId::of::<usize>(),
    ]) {
        Some(SemanticType::Integer)
    } else if is(&[TypeId::of::<f32>(), TypeId::of::<f64>()]) {
        Some(SemanticType::Float)
    } else if is(&[TypeId::of::<bool>()]) {
        Some(SemanticType::Boolean)
    } else if is(&[TypeId::of::<PathBuf>()]) {
        Some(SemanticType::Path)
    } else if is(&[TypeId::of::<String>()]) {
        Some(SemanticType::Text)
    } else {
        None
    }
}

fn visible_subcommands(command: &Command) -> impl Iterator<Item = &Command> {
    let auto_help = !command.is_disable_help_subcommand_set();
    command
        .get_subcommands()
        .filter(move |sub| !(auto_help && sub.get_name() == "help"))
}

pub(crate) fn parse_with(command: &Command, tokens: &[String]) -> Result<ArgMatches, clap::Error> {
    let argv = std::iter::once(command.get_name().to_string()).chain(tokens.iter().cloned());
    command.clone().try_get_matches_from(argv)
}

pub(crate) fn capture_with(command: &Command, token: &str) -> Option<String> {
    match command
        .clone()
        .try_get_matches_from([command.get_name(), token])
    {
        Err(err) if err.kind() == ErrorKind::DisplayVersion => {
            Some(err.to_string().trim_end().to_string())
        }
        Err(err) => {
            debug!(token, error = %err, "Display capture failed");
            None
        }
        Ok(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argform_core::ArgumentKind;

    #[test]
    fn test_raw_action_mapping() {
        assert_eq!(raw_action(&ArgAction::Set), RawAction::Store);
        assert_eq!(raw_action(&ArgAction::SetFalse), RawAction::StoreFalse);
        assert_eq!(raw_action(&ArgAction::HelpShort), RawAction::Help);
        assert_eq!(raw_action(&ArgAction::Version), RawAction::Version);
    }

    #[test]
    fn test_auto_help_is_described_then_stripped() {
        let source = ClapSource::new(Command::new("prog").arg(Arg::new("name").long("name")));

        let raw = source.describe().unwrap();
        assert!(raw.arguments.iter().any(|a| a.action == RawAction::Help));

        let schema = source.extract().unwrap();
        let names: Vec<_> = schema.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["name"]);
    }

    #[test]
    fn test_long_preferred_over_short() {
        let source = ClapSource::new(
            Command::new("prog").arg(Arg::new("outfile").short('o').long("outfile")),
        );
        let schema = source.extract().unwrap();
        let outfile = &schema.arguments[0];
        assert_eq!(outfile.cli_token.as_deref(), Some("--outfile"));
        assert_eq!(outfile.aliases, vec!["-o"]);
    }

    #[test]
    fn test_value_hint_overrides_heuristic() {
        let source = ClapSource::new(
            Command::new("prog").arg(
                Arg::new("cache")
                    .long("cache")
                    .help("path to the cache file")
                    .value_hint(ValueHint::DirPath),
            ),
        );
        let schema = source.extract().unwrap();
        assert_eq!(schema.arguments[0].kind, ArgumentKind::DirectoryPath);
    }

    #[test]
    fn test_append_action_maps_to_list() {
        let source = ClapSource::new(
            Command::new("prog").arg(Arg::new("pass").long("pass").action(ArgAction::Append)),
        );
        assert_eq!(
            source.extract().unwrap().arguments[0].kind,
            ArgumentKind::AppendList
        );
    }

    #[test]
    fn test_value_parser_sets_value_type() {
        let source = ClapSource::new(
            Command::new("prog")
                .arg(
                    Arg::new("jobs")
                        .long("jobs")
                        .value_parser(clap::value_parser!(i64))
                        .default_value("4"),
                )
                .arg(Arg::new("ratio").long("ratio").value_parser(clap::value_parser!(f64)))
                .arg(Arg::new("name").long("name")),
        );
        let schema = source.extract().unwrap();
        let types: Vec<_> = schema.arguments.iter().map(|a| a.value_type).collect();
        assert_eq!(
            types,
            vec![SemanticType::Integer, SemanticType::Float, SemanticType::Text]
        );
        assert_eq!(schema.arguments[0].default, argform_core::FieldValue::Count(4));
    }

    #[test]
    fn test_capture_display_returns_version_text() {
        let source = ClapSource::new(Command::new("prog").version("2.0"));
        assert_eq!(source.capture_display("--version").as_deref(), Some("prog 2.0"));
        assert!(source.capture_display("--nope").is_none());
    }
}
