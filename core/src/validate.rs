//! Structural schema validation.
//!
//! Catches schemas that would render or serialize incorrectly, such as
//! malformed tokens, two arguments sharing a token in one scope, or a
//! custom-typed field without a transformer.
//!
//! # Examples
//!
//! ```
//! use argform_core::*;
//!
//! let mut schema = Schema::new("prog");
//! schema.arguments.push(ArgumentDescriptor::option("--verbose", "verbose", ArgumentKind::Flag));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: a bare word is not a flag token
//! let mut bad = Schema::new("prog");
//! bad.arguments.push(ArgumentDescriptor::option("verbose", "verbose", ArgumentKind::Flag));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{ArgumentDescriptor, ArgumentKind, Schema};

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Program name is empty or whitespace-only.
    #[error("schema program cannot be empty")]
    EmptyProgramName,
    /// Token does not start with a dash.
    #[error("invalid option token: {0}")]
    InvalidToken(String),
    /// Short token is not a single dash followed by at least one character.
    #[error("invalid short flag format: {0}")]
    InvalidShortFlag(String),
    /// Long token does not start with `--` or is too short.
    #[error("invalid long flag format: {0}")]
    InvalidLongFlag(String),
    /// Two arguments in the same scope share a token.
    #[error("duplicate flag in scope: {0}")]
    DuplicateFlag(String),
    /// Two arguments in the same scope share a destination name.
    #[error("duplicate argument name in scope: {0}")]
    DuplicateName(String),
    /// Two subcommands share a name.
    #[error("duplicate subcommand: {0}")]
    DuplicateSubcommand(String),
    /// A choice argument has no choices.
    #[error("choice argument has no choices: {0}")]
    EmptyChoices(String),
    /// The default of a choice argument is not one of its choices.
    #[error("default `{value}` of `{field}` is not one of its choices")]
    DefaultNotInChoices { field: String, value: String },
    /// A custom-typed argument has no transformer attached.
    #[error("custom-typed argument has no transformer: {0}")]
    MissingTransformer(String),
}

/// Validates a schema.
///
/// Scopes are checked independently: the global arguments alone, then each
/// group's own arguments together with the global ones, since both end up
/// in the same argument vector.
///
/// # Examples
///
/// ```
/// use argform_core::*;
///
/// let mut schema = Schema::new("prog");
/// schema.arguments.push(ArgumentDescriptor::option("--name", "name", ArgumentKind::Value));
/// schema.subcommands.push(
///     SubcommandGroup::new("run")
///         .with_argument(ArgumentDescriptor::option("--name", "run_name", ArgumentKind::Value)),
/// );
///
/// let errors = validate_schema(&schema);
/// assert_eq!(errors, vec![ValidationError::DuplicateFlag("--name".into())]);
/// ```
pub fn validate_schema(schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if schema.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgramName);
        return errors;
    }

    let globals: Vec<&ArgumentDescriptor> = schema.arguments.iter().collect();
    errors.extend(validate_scope(&globals));
    if !errors.is_empty() {
        return errors;
    }

    let mut seen_groups = HashSet::new();
    for group in &schema.subcommands {
        if !seen_groups.insert(group.name.as_str()) {
            errors.push(ValidationError::DuplicateSubcommand(group.name.clone()));
            return errors;
        }

        let scope: Vec<&ArgumentDescriptor> =
            group.own_arguments.iter().chain(schema.arguments.iter()).collect();
        errors.extend(validate_scope(&scope));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_scope(arguments: &[&ArgumentDescriptor]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut seen_names = HashSet::new();

    for argument in arguments {
        if !seen_names.insert(argument.name.as_str()) {
            errors.push(ValidationError::DuplicateName(argument.name.clone()));
            return errors;
        }

        for token in argument.cli_token.iter().chain(argument.aliases.iter()) {
            if let Some(error) = check_token(token) {
                errors.push(error);
                return errors;
            }
            if !seen_tokens.insert(token.as_str()) {
                errors.push(ValidationError::DuplicateFlag(token.clone()));
                return errors;
            }
        }

        match argument.kind {
            ArgumentKind::Choice if argument.choices.is_empty() => {
                errors.push(ValidationError::EmptyChoices(argument.name.clone()));
                return errors;
            }
            ArgumentKind::Choice => {
                let default = argument.default.to_string();
                if !default.is_empty() && !argument.choices.contains(&default) {
                    errors.push(ValidationError::DefaultNotInChoices {
                        field: argument.name.clone(),
                        value: default,
                    });
                    return errors;
                }
            }
            ArgumentKind::CustomTyped if argument.transformer.is_none() => {
                errors.push(ValidationError::MissingTransformer(argument.name.clone()));
                return errors;
            }
            _ => {}
        }
    }

    errors
}

fn check_token(token: &str) -> Option<ValidationError> {
    if token.starts_with("--") {
        (token.len() < 3).then(|| ValidationError::InvalidLongFlag(token.to_string()))
    } else if token.starts_with('-') {
        (token.len() < 2).then(|| ValidationError::InvalidShortFlag(token.to_string()))
    } else {
        Some(ValidationError::InvalidToken(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, SubcommandGroup};

    #[test]
    fn test_accepts_valid_tabbed_schema() {
        let mut schema = Schema::new("prog");
        schema
            .arguments
            .push(ArgumentDescriptor::option("--foo", "foo", ArgumentKind::Flag));
        schema.subcommands.push(
            SubcommandGroup::new("a")
                .with_argument(ArgumentDescriptor::positional("bar", ArgumentKind::Value)),
        );
        schema.subcommands.push(
            SubcommandGroup::new("b").with_argument(
                ArgumentDescriptor::option("--baz", "baz", ArgumentKind::Choice)
                    .with_choices(&["X", "Y", "Z"]),
            ),
        );

        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_rejects_empty_program() {
        let schema = Schema::new("  ");
        assert_eq!(validate_schema(&schema), vec![ValidationError::EmptyProgramName]);
    }

    #[test]
    fn test_rejects_bad_tokens() {
        let mut schema = Schema::new("prog");
        schema
            .arguments
            .push(ArgumentDescriptor::option("--", "x", ArgumentKind::Flag));
        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::InvalidLongFlag("--".into())]
        );

        let mut schema = Schema::new("prog");
        schema
            .arguments
            .push(ArgumentDescriptor::option("-", "x", ArgumentKind::Flag));
        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::InvalidShortFlag("-".into())]
        );
    }

    #[test]
    fn test_rejects_duplicate_alias() {
        let mut schema = Schema::new("prog");
        let mut outfile = ArgumentDescriptor::option("--outfile", "outfile", ArgumentKind::Value);
        outfile.aliases.push("-o".into());
        schema.arguments.push(outfile);
        schema
            .arguments
            .push(ArgumentDescriptor::option("-o", "other", ArgumentKind::Flag));

        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::DuplicateFlag("-o".into())]
        );
    }

    #[test]
    fn test_same_name_in_different_groups_is_fine() {
        let mut schema = Schema::new("prog");
        for name in ["a", "b"] {
            schema.subcommands.push(
                SubcommandGroup::new(name)
                    .with_argument(ArgumentDescriptor::positional("target", ArgumentKind::Value)),
            );
        }
        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_rejects_duplicate_subcommand() {
        let mut schema = Schema::new("prog");
        schema.subcommands.push(SubcommandGroup::new("a"));
        schema.subcommands.push(SubcommandGroup::new("a"));
        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::DuplicateSubcommand("a".into())]
        );
    }

    #[test]
    fn test_choice_checks() {
        let mut schema = Schema::new("prog");
        schema
            .arguments
            .push(ArgumentDescriptor::option("--level", "level", ArgumentKind::Choice));
        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::EmptyChoices("level".into())]
        );

        let mut schema = Schema::new("prog");
        schema.arguments.push(
            ArgumentDescriptor::option("--level", "level", ArgumentKind::Choice)
                .with_choices(&["a", "b"])
                .with_default(FieldValue::text("c")),
        );
        assert!(matches!(
            validate_schema(&schema).as_slice(),
            [ValidationError::DefaultNotInChoices { .. }]
        ));
    }

    #[test]
    fn test_rejects_custom_without_transformer() {
        let mut schema = Schema::new("prog");
        schema.arguments.push(ArgumentDescriptor::option(
            "--thread",
            "thread",
            ArgumentKind::CustomTyped,
        ));
        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::MissingTransformer("thread".into())]
        );
    }
}
