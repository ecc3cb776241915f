//! Argument-vector reconstruction.
//!
//! [`serialize`] turns a filled-in [`FormState`] back into the exact token
//! sequence a user would have typed, so the source parser can consume it
//! unchanged.
//!
//! # Example
//!
//! ```
//! use argform_core::*;
//!
//! let mut schema = Schema::new("prog");
//! schema.arguments.push(ArgumentDescriptor::option("--tag", "tag", ArgumentKind::AppendList));
//!
//! let mut state = FormState::from_defaults(&schema);
//! state.set(FieldKey::global("tag"), FieldValue::text("a b c"));
//!
//! let argv = serialize(&schema, None, &state).unwrap();
//! assert_eq!(argv, vec!["--tag", "a", "--tag", "b", "--tag", "c"]);
//! ```

use tracing::debug;

use crate::error::SerializeError;
use crate::state::{FieldKey, FormState};
use crate::types::{ArgumentDescriptor, ArgumentKind, FieldValue, Schema};

/// Serializes form values into an argument vector.
///
/// With an `active_group`, the subcommand token comes first, followed by the
/// group's own arguments and then the global ones. Without one, only the
/// global arguments are serialized. Arguments are processed in declaration
/// order; fields missing from `state` use their descriptor default.
///
/// Blank text emits nothing for single-value kinds, so a form left at its
/// defaults reproduces the parser's own defaults.
///
/// # Errors
///
/// - [`SerializeError::UnknownGroup`] if `active_group` names no subcommand.
/// - [`SerializeError::InvalidChoice`] for a selection outside the choices.
/// - [`SerializeError::NegativeRepeat`] for a counter below its default.
/// - [`SerializeError::ValueTransform`] when a custom transformer fails.
/// - [`SerializeError::MissingTransformer`] for a custom-typed field without
///   a transformer (e.g. a schema loaded back from JSON).
/// - [`SerializeError::UnhandledKind`] when a field holds a value its kind
///   cannot serialize.
pub fn serialize(
    schema: &Schema,
    active_group: Option<&str>,
    state: &FormState,
) -> Result<Vec<String>, SerializeError> {
    let Some(arguments) = schema.scoped_arguments(active_group) else {
        return Err(SerializeError::UnknownGroup(
            active_group.unwrap_or_default().to_string(),
        ));
    };

    let mut tokens = Vec::new();
    if let Some(group) = active_group {
        tokens.push(group.to_string());
    }

    for scoped in arguments {
        let key = scoped.key();
        let value = state.get(&key).unwrap_or(&scoped.descriptor.default);
        let before = tokens.len();
        emit(scoped.descriptor, &key, value, &mut tokens)?;
        debug!(
            field = %key,
            kind = %scoped.descriptor.kind,
            emitted = tokens.len() - before,
            "Serialized field"
        );
    }

    Ok(tokens)
}

fn emit(
    descriptor: &ArgumentDescriptor,
    key: &FieldKey,
    value: &FieldValue,
    out: &mut Vec<String>,
) -> Result<(), SerializeError> {
    let token = descriptor.cli_token.as_deref();

    match descriptor.kind {
        ArgumentKind::Value | ArgumentKind::FilePath | ArgumentKind::DirectoryPath => {
            let text = text_of(descriptor, key, value)?;
            if !text.trim().is_empty() {
                push_pair(out, token, text);
            }
        }
        ArgumentKind::Flag => {
            let enabled = value.as_bool().ok_or_else(|| unhandled(descriptor, key, value))?;
            if let (true, Some(token)) = (enabled, token) {
                out.push(token.to_string());
            }
        }
        ArgumentKind::Choice => {
            let text = text_of(descriptor, key, value)?;
            if text.trim().is_empty() {
                return Ok(());
            }
            if !descriptor.choices.iter().any(|choice| *choice == text) {
                return Err(SerializeError::InvalidChoice {
                    field: key.clone(),
                    value: text,
                    choices: descriptor.choices.clone(),
                });
            }
            push_pair(out, token, text);
        }
        ArgumentKind::Counting => {
            let token = token.ok_or_else(|| unhandled(descriptor, key, value))?;
            let current = value.as_count().ok_or_else(|| unhandled(descriptor, key, value))?;
            let baseline = descriptor
                .default
                .as_count()
                .ok_or_else(|| unhandled(descriptor, key, &descriptor.default))?;
            let repeat = i64::from(current) - i64::from(baseline);
            if repeat < 0 {
                return Err(SerializeError::NegativeRepeat {
                    field: key.clone(),
                    value: i64::from(current),
                    baseline: i64::from(baseline),
                });
            }
            out.extend(std::iter::repeat_n(token.to_string(), repeat as usize));
        }
        ArgumentKind::AppendList => {
            let text = text_of(descriptor, key, value)?;
            for item in text.split_whitespace() {
                push_pair(out, token, item.to_string());
            }
        }
        ArgumentKind::CustomTyped => {
            let text = text_of(descriptor, key, value)?;
            if text.trim().is_empty() {
                return Ok(());
            }
            let transformer =
                descriptor
                    .transformer
                    .as_ref()
                    .ok_or_else(|| SerializeError::MissingTransformer {
                        field: key.clone(),
                    })?;
            let typed = transformer
                .apply(&text)
                .map_err(|message| SerializeError::ValueTransform {
                    field: key.clone(),
                    message,
                })?;
            push_pair(out, token, typed.to_token());
        }
        ArgumentKind::Display => {}
    }

    Ok(())
}

fn push_pair(out: &mut Vec<String>, token: Option<&str>, value: String) {
    if let Some(token) = token {
        out.push(token.to_string());
    }
    out.push(value);
}

fn text_of(
    descriptor: &ArgumentDescriptor,
    key: &FieldKey,
    value: &FieldValue,
) -> Result<String, SerializeError> {
    value
        .as_text()
        .map(|text| text.into_owned())
        .ok_or_else(|| unhandled(descriptor, key, value))
}

fn unhandled(descriptor: &ArgumentDescriptor, key: &FieldKey, value: &FieldValue) -> SerializeError {
    SerializeError::UnhandledKind {
        field: key.clone(),
        kind: descriptor.kind,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SemanticType, SubcommandGroup, TypedValue, ValueTransformer};

    fn threads() -> ValueTransformer {
        ValueTransformer::returning(SemanticType::Integer, |raw| {
            let n: i64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("`{raw}` is not an integer"))?;
            if n < 1 {
                return Err(format!("thread count {n} is not valid"));
            }
            Ok(TypedValue::Integer(n))
        })
    }

    fn flat_schema() -> Schema {
        let mut schema = Schema::new("prog");
        schema.arguments.extend([
            ArgumentDescriptor::positional("infile", ArgumentKind::FilePath)
                .with_default(FieldValue::text("graph.txt")),
            ArgumentDescriptor::option("--loglevel", "loglevel", ArgumentKind::Choice)
                .with_choices(&["DEBUG", "INFO", "WARNING"]),
            ArgumentDescriptor::option("--seed", "seed", ArgumentKind::Value)
                .with_default(FieldValue::text("0")),
            ArgumentDescriptor::option("--all-signal", "all_signal", ArgumentKind::Flag),
            ArgumentDescriptor::option("-n", "nb_to_return", ArgumentKind::Counting)
                .with_default(FieldValue::Count(1)),
            ArgumentDescriptor::option("--tag", "tag", ArgumentKind::AppendList),
            ArgumentDescriptor::option("--thread", "thread", ArgumentKind::CustomTyped)
                .with_transformer(threads())
                .with_default(FieldValue::text("1")),
            ArgumentDescriptor::option("--version", "version", ArgumentKind::Display),
        ]);
        schema
    }

    fn set(state: &mut FormState, name: &str, value: FieldValue) {
        state.set(FieldKey::global(name), value);
    }

    #[test]
    fn test_defaults_serialize_in_declaration_order() {
        let schema = flat_schema();
        let state = FormState::from_defaults(&schema);

        let argv = serialize(&schema, None, &state).unwrap();
        assert_eq!(argv, vec!["graph.txt", "--seed", "0", "--thread", "1"]);
    }

    #[test]
    fn test_missing_state_uses_defaults() {
        let schema = flat_schema();
        let argv = serialize(&schema, None, &FormState::new()).unwrap();
        assert_eq!(argv, vec!["graph.txt", "--seed", "0", "--thread", "1"]);
    }

    #[test]
    fn test_flag_toggle_is_idempotent() {
        let schema = flat_schema();
        let mut state = FormState::from_defaults(&schema);
        let baseline = serialize(&schema, None, &state).unwrap();

        set(&mut state, "all_signal", FieldValue::Bool(true));
        let with_flag = serialize(&schema, None, &state).unwrap();
        assert_eq!(with_flag.len(), baseline.len() + 1);
        assert!(with_flag.contains(&"--all-signal".to_string()));

        set(&mut state, "all_signal", FieldValue::Bool(false));
        assert_eq!(serialize(&schema, None, &state).unwrap(), baseline);
    }

    #[test]
    fn test_counting_subtracts_default() {
        let schema = flat_schema();
        let mut state = FormState::from_defaults(&schema);

        set(&mut state, "nb_to_return", FieldValue::Count(1));
        let argv = serialize(&schema, None, &state).unwrap();
        assert_eq!(argv.iter().filter(|t| *t == "-n").count(), 0);

        set(&mut state, "nb_to_return", FieldValue::Count(4));
        let argv = serialize(&schema, None, &state).unwrap();
        assert_eq!(argv.iter().filter(|t| *t == "-n").count(), 3);
    }

    #[test]
    fn test_counting_below_default_fails_fast() {
        let schema = flat_schema();
        let mut state = FormState::from_defaults(&schema);
        set(&mut state, "nb_to_return", FieldValue::Count(0));

        let err = serialize(&schema, None, &state).unwrap_err();
        assert_eq!(
            err,
            SerializeError::NegativeRepeat {
                field: FieldKey::global("nb_to_return"),
                value: 0,
                baseline: 1,
            }
        );
        assert_eq!(err.field(), Some(&FieldKey::global("nb_to_return")));
    }

    #[test]
    fn test_append_list_pairs_token_with_each_item() {
        let schema = flat_schema();
        let mut state = FormState::from_defaults(&schema);
        set(&mut state, "tag", FieldValue::text("a b c"));

        let argv = serialize(&schema, None, &state).unwrap();
        let start = argv.iter().position(|t| t == "--tag").unwrap();
        assert_eq!(
            &argv[start..start + 6],
            &["--tag", "a", "--tag", "b", "--tag", "c"]
        );
    }

    #[test]
    fn test_choice_rejects_unknown_value() {
        let schema = flat_schema();
        let mut state = FormState::from_defaults(&schema);
        set(&mut state, "loglevel", FieldValue::text("TRACE"));

        let err = serialize(&schema, None, &state).unwrap_err();
        assert!(matches!(err, SerializeError::InvalidChoice { ref value, .. } if value == "TRACE"));

        set(&mut state, "loglevel", FieldValue::text("INFO"));
        let argv = serialize(&schema, None, &state).unwrap();
        assert!(argv.windows(2).any(|w| w == ["--loglevel", "INFO"]));
    }

    #[test]
    fn test_custom_typed_runs_transformer() {
        let schema = flat_schema();
        let mut state = FormState::from_defaults(&schema);
        set(&mut state, "thread", FieldValue::text(" 42 "));

        let argv = serialize(&schema, None, &state).unwrap();
        assert!(argv.windows(2).any(|w| w == ["--thread", "42"]));
    }

    #[test]
    fn test_custom_typed_failure_names_field() {
        let schema = flat_schema();
        let mut state = FormState::from_defaults(&schema);
        set(&mut state, "thread", FieldValue::text("many"));

        let err = serialize(&schema, None, &state).unwrap_err();
        assert_eq!(err.field(), Some(&FieldKey::global("thread")));
        assert!(err.to_string().contains("`many` is not an integer"));
    }

    #[test]
    fn test_custom_typed_without_transformer() {
        let mut schema = Schema::new("prog");
        schema.arguments.push(
            ArgumentDescriptor::option("--thread", "thread", ArgumentKind::CustomTyped)
                .with_default(FieldValue::text("1")),
        );
        let err = serialize(&schema, None, &FormState::new()).unwrap_err();
        assert!(matches!(err, SerializeError::MissingTransformer { .. }));
    }

    #[test]
    fn test_integer_spinner_value_is_stringified() {
        let mut schema = Schema::new("prog");
        schema.arguments.push(
            ArgumentDescriptor::option("--width", "width", ArgumentKind::Value)
                .with_value_type(SemanticType::Integer)
                .with_default(FieldValue::Count(300)),
        );
        let argv = serialize(&schema, None, &FormState::new()).unwrap();
        assert_eq!(argv, vec!["--width", "300"]);
    }

    #[test]
    fn test_mismatched_holder_is_unhandled() {
        let schema = flat_schema();
        let mut state = FormState::from_defaults(&schema);
        set(&mut state, "seed", FieldValue::Bool(true));

        let err = serialize(&schema, None, &state).unwrap_err();
        assert!(matches!(
            err,
            SerializeError::UnhandledKind { kind: ArgumentKind::Value, .. }
        ));
    }

    #[test]
    fn test_subcommand_token_first_then_own_then_global() {
        let mut schema = Schema::new("prog");
        schema
            .arguments
            .push(ArgumentDescriptor::option("--verbose", "verbose", ArgumentKind::Flag));
        schema.subcommands.push(
            SubcommandGroup::new("sub1")
                .with_argument(ArgumentDescriptor::positional("sub1_arg", ArgumentKind::Value)),
        );
        schema.subcommands.push(
            SubcommandGroup::new("sub2")
                .with_argument(ArgumentDescriptor::positional("sub2_arg", ArgumentKind::Value)),
        );

        let mut state = FormState::from_defaults(&schema);
        state.set(FieldKey::scoped("sub1", "sub1_arg"), FieldValue::text("x"));
        state.set(FieldKey::scoped("sub2", "sub2_arg"), FieldValue::text("y"));
        state.set(FieldKey::global("verbose"), FieldValue::Bool(true));

        let argv = serialize(&schema, Some("sub1"), &state).unwrap();
        assert_eq!(argv, vec!["sub1", "x", "--verbose"]);

        let err = serialize(&schema, Some("sub3"), &state).unwrap_err();
        assert_eq!(err, SerializeError::UnknownGroup("sub3".into()));
    }

    #[test]
    fn test_blank_values_emit_nothing() {
        let mut schema = Schema::new("prog");
        schema.arguments.extend([
            ArgumentDescriptor::option("--outfile", "outfile", ArgumentKind::Value),
            ArgumentDescriptor::positional("target", ArgumentKind::DirectoryPath),
            ArgumentDescriptor::option("--level", "level", ArgumentKind::Choice)
                .with_choices(&["a", "b"]),
        ]);
        let mut state = FormState::from_defaults(&schema);
        state.set(FieldKey::global("outfile"), FieldValue::text("   "));

        assert!(serialize(&schema, None, &state).unwrap().is_empty());
    }
}
