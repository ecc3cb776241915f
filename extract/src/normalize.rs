//! Normalization of a raw action list into a [`Schema`].

use argform_core::{
    ArgumentDescriptor, ArgumentKind, FieldValue, RawAction, RawArgument, RawParser, Schema,
    SchemaError, SemanticType, SubcommandGroup, resolve_kind,
};
use tracing::{debug, warn};

/// Normalizes a described parser.
///
/// Help actions are dropped. Everything else keeps its declaration order,
/// both for the global arguments and within each subcommand.
///
/// # Errors
///
/// - [`SchemaError::NestedSubcommands`] if any sub-parser has sub-parsers of
///   its own.
/// - Any error of [`resolve_kind`] for an individual argument.
///
/// # Examples
///
/// ```
/// use argform_core::{ArgumentKind, RawAction, RawArgument, RawParser};
/// use argform_extract::extract_schema;
///
/// let raw = RawParser {
///     program: "prog".into(),
///     arguments: vec![
///         RawArgument::new("help", RawAction::Help).flag("-h").flag("--help"),
///         RawArgument::new("seed", RawAction::Store).flag("--seed").default("0"),
///     ],
///     ..Default::default()
/// };
///
/// let schema = extract_schema(raw).unwrap();
/// assert_eq!(schema.arguments.len(), 1);
/// assert_eq!(schema.arguments[0].kind, ArgumentKind::Value);
/// ```
pub fn extract_schema(raw: RawParser) -> Result<Schema, SchemaError> {
    let mut schema = Schema::new(&raw.program);
    schema.description = raw.description;
    schema.arguments = normalize_scope(raw.arguments, None)?;

    for sub in raw.subparsers {
        if let Some(nested) = sub.subparsers.first() {
            return Err(SchemaError::NestedSubcommands {
                path: format!("{} {} {}", raw.program, sub.name, nested.name),
            });
        }

        let own_arguments = normalize_scope(sub.arguments, Some(&sub.name))?;
        schema.subcommands.push(SubcommandGroup {
            name: sub.name,
            help: sub.help,
            own_arguments,
        });
    }

    debug!(
        program = %schema.program,
        arguments = schema.arguments.len(),
        subcommands = schema.subcommands.len(),
        "Extracted schema"
    );
    Ok(schema)
}

fn normalize_scope(
    arguments: Vec<RawArgument>,
    scope: Option<&str>,
) -> Result<Vec<ArgumentDescriptor>, SchemaError> {
    let mut normalized = Vec::with_capacity(arguments.len());
    let mut positionals = 0usize;

    for raw in arguments {
        if raw.action == RawAction::Help {
            debug!(argument = %raw.dest, "Skipping help action");
            continue;
        }
        let descriptor = normalize_argument(raw)?;
        if descriptor.is_positional() && descriptor.kind.is_field() {
            positionals += 1;
        }
        normalized.push(descriptor);
    }

    if positionals > 1 {
        warn!(
            scope = scope.unwrap_or("<global>"),
            positionals,
            "More than one positional argument in scope; values are emitted in declaration order"
        );
    }

    Ok(normalized)
}

/// Normalizes one raw argument into a descriptor.
///
/// The first option string becomes the token and the rest become aliases.
/// Defaults are converted to the holder shape of the resolved kind: flags
/// always start unset, counters and integer values hold a count, everything
/// else holds text.
pub fn normalize_argument(raw: RawArgument) -> Result<ArgumentDescriptor, SchemaError> {
    let kind = resolve_kind(&raw)?;
    let value_type = raw
        .transformer
        .as_ref()
        .and_then(|t| t.declared_output())
        .or(raw.value_type)
        .unwrap_or_default();
    let default = convert_default(&raw, kind, value_type);

    let mut options = raw.option_strings.into_iter();
    let cli_token = options.next();
    let aliases = options.collect();

    debug!(argument = %raw.dest, %kind, "Normalized argument");

    Ok(ArgumentDescriptor {
        cli_token,
        aliases,
        name: raw.dest,
        kind,
        choices: raw.choices,
        default,
        help: raw.help,
        value_type,
        required: raw.required,
        transformer: if kind == ArgumentKind::CustomTyped {
            raw.transformer
        } else {
            None
        },
    })
}

fn convert_default(raw: &RawArgument, kind: ArgumentKind, value_type: SemanticType) -> FieldValue {
    let text = raw.default.as_deref().map(str::trim);

    match kind {
        ArgumentKind::Flag => FieldValue::Bool(false),
        ArgumentKind::Display => FieldValue::default(),
        ArgumentKind::Counting => match text.map(str::parse::<i32>) {
            None => FieldValue::Count(0),
            Some(Ok(count)) => FieldValue::Count(count),
            Some(Err(_)) => {
                warn!(argument = %raw.dest, default = ?raw.default, "Counter default is not an integer; using 0");
                FieldValue::Count(0)
            }
        },
        ArgumentKind::Value if value_type == SemanticType::Integer => {
            match text.and_then(|t| t.parse::<i32>().ok()) {
                Some(count) => FieldValue::Count(count),
                None => FieldValue::text(raw.default.clone().unwrap_or_default()),
            }
        }
        _ => FieldValue::text(raw.default.clone().unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argform_core::{RawSubparser, TypedValue, ValueTransformer};

    fn subparser(name: &str, arguments: Vec<RawArgument>) -> RawSubparser {
        RawSubparser {
            name: name.to_string(),
            arguments,
            ..Default::default()
        }
    }

    #[test]
    fn test_preserves_order_and_strips_help() {
        let raw = RawParser {
            program: "prog".into(),
            arguments: vec![
                RawArgument::new("help", RawAction::Help).flag("-h"),
                RawArgument::new("zeta", RawAction::StoreTrue).flag("--zeta"),
                RawArgument::new("alpha", RawAction::Store).flag("--alpha"),
                RawArgument::new("infile", RawAction::Store),
            ],
            ..Default::default()
        };

        let schema = extract_schema(raw).unwrap();
        let names: Vec<_> = schema.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "infile"]);
    }

    #[test]
    fn test_token_and_aliases() {
        let raw = RawArgument::new("outfile", RawAction::Store)
            .flag("--outfile")
            .flag("-o");
        let descriptor = normalize_argument(raw).unwrap();
        assert_eq!(descriptor.cli_token.as_deref(), Some("--outfile"));
        assert_eq!(descriptor.aliases, vec!["-o"]);
    }

    #[test]
    fn test_default_conversion() {
        let flag = normalize_argument(
            RawArgument::new("quiet", RawAction::StoreFalse)
                .flag("--quiet")
                .default("true"),
        )
        .unwrap();
        assert_eq!(flag.default, FieldValue::Bool(false));

        let counter = normalize_argument(
            RawArgument::new("verbose", RawAction::Count).flag("-v").default("2"),
        )
        .unwrap();
        assert_eq!(counter.default, FieldValue::Count(2));

        let seed = normalize_argument(
            RawArgument::new("seed", RawAction::Store)
                .flag("--seed")
                .value_type(SemanticType::Integer)
                .default("7"),
        )
        .unwrap();
        assert_eq!(seed.default, FieldValue::Count(7));

        let name = normalize_argument(RawArgument::new("name", RawAction::Store).flag("--name"))
            .unwrap();
        assert_eq!(name.default, FieldValue::text(""));
    }

    #[test]
    fn test_bad_counter_default_falls_back_to_zero() {
        let counter = normalize_argument(
            RawArgument::new("verbose", RawAction::Count).flag("-v").default("lots"),
        )
        .unwrap();
        assert_eq!(counter.default, FieldValue::Count(0));
    }

    #[test]
    fn test_version_becomes_display() {
        let raw = RawParser {
            program: "prog".into(),
            arguments: vec![RawArgument::new("version", RawAction::Version).flag("--version")],
            ..Default::default()
        };
        let schema = extract_schema(raw).unwrap();
        assert_eq!(schema.arguments[0].kind, ArgumentKind::Display);
    }

    #[test]
    fn test_transformer_kept_only_for_custom_kind() {
        let transformer = ValueTransformer::returning(SemanticType::Integer, |raw| {
            raw.parse().map(TypedValue::Integer).map_err(|e| format!("{e}"))
        });

        let custom = normalize_argument(
            RawArgument::new("threads", RawAction::Store)
                .flag("--threads")
                .transformer(transformer.clone()),
        )
        .unwrap();
        assert_eq!(custom.kind, ArgumentKind::CustomTyped);
        assert_eq!(custom.value_type, SemanticType::Integer);
        assert!(custom.transformer.is_some());

        let choice = normalize_argument(
            RawArgument::new("level", RawAction::Store)
                .flag("--level")
                .choices(&["1", "2"])
                .transformer(transformer),
        )
        .unwrap();
        assert_eq!(choice.kind, ArgumentKind::Choice);
        assert!(choice.transformer.is_none());
    }

    #[test]
    fn test_subcommands_keep_own_arguments() {
        let raw = RawParser {
            program: "prog".into(),
            arguments: vec![RawArgument::new("verbose", RawAction::StoreTrue).flag("--verbose")],
            subparsers: vec![
                subparser("sub1", vec![RawArgument::new("sub1_arg", RawAction::Store)]),
                subparser("sub2", vec![RawArgument::new("sub2_arg", RawAction::Store)]),
            ],
            ..Default::default()
        };

        let schema = extract_schema(raw).unwrap();
        assert_eq!(schema.group_names(), vec!["sub1", "sub2"]);
        assert_eq!(schema.subcommands[1].own_arguments[0].name, "sub2_arg");
        assert_eq!(schema.arguments.len(), 1);
    }

    #[test]
    fn test_rejects_nested_subcommands() {
        let mut outer = subparser("remote", Vec::new());
        outer.subparsers.push(subparser("add", Vec::new()));
        let raw = RawParser {
            program: "git".into(),
            subparsers: vec![outer],
            ..Default::default()
        };

        let err = extract_schema(raw).unwrap_err();
        assert!(matches!(err, SchemaError::NestedSubcommands { ref path } if path == "git remote add"));
    }

    #[test]
    fn test_unsupported_action_fails_extraction() {
        let raw = RawParser {
            program: "prog".into(),
            arguments: vec![
                RawArgument::new("items", RawAction::Unsupported("extend".into())).flag("--items"),
            ],
            ..Default::default()
        };
        assert!(matches!(
            extract_schema(raw),
            Err(SchemaError::UnsupportedArgument { .. })
        ));
    }
}
