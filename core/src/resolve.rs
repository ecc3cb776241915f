//! Type resolution: raw argument → semantic [`ArgumentKind`].
//!
//! Several signals can apply to the same argument, so they are checked in a
//! fixed priority order and the first match wins:
//!
//! 1. non-empty choices → [`ArgumentKind::Choice`];
//! 2. a user-supplied transformer → [`ArgumentKind::CustomTyped`] (its output
//!    type must be declared);
//! 3. an explicit path annotation;
//! 4. the help-text keyword heuristic (see [`help_heuristic`]);
//! 5. the storage action's intrinsic kind.

use crate::error::SchemaError;
use crate::raw::{PathHint, RawAction, RawArgument};
use crate::types::ArgumentKind;

/// Resolves the kind of one raw argument.
///
/// Version actions resolve to [`ArgumentKind::Display`] before any other
/// signal is considered. Unknown actions are rejected up front, even when
/// choices are present, since their token layout cannot be reconstructed.
///
/// # Errors
///
/// - [`SchemaError::UnsupportedArgument`] for help actions (which the
///   extractor strips beforehand) and unknown actions.
/// - [`SchemaError::AmbiguousType`] for a transformer without a declared
///   output type.
///
/// # Examples
///
/// ```
/// use argform_core::{resolve_kind, ArgumentKind, RawAction, RawArgument};
///
/// let level = RawArgument::new("loglevel", RawAction::Store)
///     .flag("--loglevel")
///     .choices(&["DEBUG", "INFO"]);
/// assert_eq!(resolve_kind(&level).unwrap(), ArgumentKind::Choice);
///
/// let infile = RawArgument::new("infile", RawAction::Store)
///     .help("path to file containing the graph data");
/// assert_eq!(resolve_kind(&infile).unwrap(), ArgumentKind::FilePath);
/// ```
pub fn resolve_kind(raw: &RawArgument) -> Result<ArgumentKind, SchemaError> {
    match &raw.action {
        RawAction::Version => return Ok(ArgumentKind::Display),
        RawAction::Help | RawAction::Unsupported(_) => return Err(unsupported(raw)),
        _ => {}
    }

    if !raw.choices.is_empty() {
        return Ok(ArgumentKind::Choice);
    }

    if let Some(transformer) = &raw.transformer {
        return match transformer.declared_output() {
            Some(_) => Ok(ArgumentKind::CustomTyped),
            None => Err(SchemaError::AmbiguousType {
                argument: raw.dest.clone(),
            }),
        };
    }

    // Path detection only applies to single-value arguments; a toggle or a
    // counter whose help mentions a file path is still a toggle.
    if raw.action == RawAction::Store {
        match raw.path_hint {
            Some(PathHint::File) => return Ok(ArgumentKind::FilePath),
            Some(PathHint::Directory) => return Ok(ArgumentKind::DirectoryPath),
            None => {}
        }
        if let Some(kind) = raw.help.as_deref().and_then(help_heuristic) {
            return Ok(kind);
        }
    }

    match raw.action {
        RawAction::Store => Ok(ArgumentKind::Value),
        RawAction::StoreTrue | RawAction::StoreFalse | RawAction::StoreConst => {
            Ok(ArgumentKind::Flag)
        }
        RawAction::Count => Ok(ArgumentKind::Counting),
        RawAction::Append => Ok(ArgumentKind::AppendList),
        RawAction::Version => Ok(ArgumentKind::Display),
        RawAction::Help | RawAction::Unsupported(_) => Err(unsupported(raw)),
    }
}

fn unsupported(raw: &RawArgument) -> SchemaError {
    SchemaError::UnsupportedArgument {
        argument: raw.dest.clone(),
        action: raw.action.name().to_string(),
    }
}

/// Best-effort path classification from help text.
///
/// A case-insensitive substring scan: "path" together with "file" means a
/// file path, "path" together with "directory" a directory path. It can
/// misclassify; adapters that know better set a [`PathHint`] instead.
///
/// # Examples
///
/// ```
/// use argform_core::{help_heuristic, ArgumentKind};
///
/// assert_eq!(help_heuristic("Path to the output FILE"), Some(ArgumentKind::FilePath));
/// assert_eq!(help_heuristic("path of the cache directory"), Some(ArgumentKind::DirectoryPath));
/// assert_eq!(help_heuristic("output file"), None);
/// ```
pub fn help_heuristic(help: &str) -> Option<ArgumentKind> {
    let lower = help.to_lowercase();
    if !lower.contains("path") {
        return None;
    }
    if lower.contains("file") {
        Some(ArgumentKind::FilePath)
    } else if lower.contains("directory") {
        Some(ArgumentKind::DirectoryPath)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SemanticType, TypedValue, ValueTransformer};

    fn integer_transformer() -> ValueTransformer {
        ValueTransformer::returning(SemanticType::Integer, |raw| {
            raw.parse().map(TypedValue::Integer).map_err(|e| format!("{e}"))
        })
    }

    #[test]
    fn test_intrinsic_kinds() {
        let cases = [
            (RawAction::Store, ArgumentKind::Value),
            (RawAction::StoreTrue, ArgumentKind::Flag),
            (RawAction::StoreFalse, ArgumentKind::Flag),
            (RawAction::StoreConst, ArgumentKind::Flag),
            (RawAction::Count, ArgumentKind::Counting),
            (RawAction::Append, ArgumentKind::AppendList),
            (RawAction::Version, ArgumentKind::Display),
        ];
        for (action, expected) in cases {
            let raw = RawArgument::new("x", action).flag("--x");
            assert_eq!(resolve_kind(&raw).unwrap(), expected);
        }
    }

    #[test]
    fn test_choices_win_over_transformer_and_heuristic() {
        let raw = RawArgument::new("color", RawAction::Store)
            .choices(&["red", "green"])
            .transformer(integer_transformer())
            .help("path to file");
        assert_eq!(resolve_kind(&raw).unwrap(), ArgumentKind::Choice);
    }

    #[test]
    fn test_transformer_wins_over_heuristic() {
        let raw = RawArgument::new("infile", RawAction::Store)
            .transformer(integer_transformer())
            .help("path to file");
        assert_eq!(resolve_kind(&raw).unwrap(), ArgumentKind::CustomTyped);
    }

    #[test]
    fn test_undeclared_transformer_is_ambiguous() {
        let raw = RawArgument::new("thread", RawAction::Store)
            .flag("--thread")
            .transformer(ValueTransformer::new(|raw| Ok(TypedValue::Text(raw.into()))));
        let err = resolve_kind(&raw).unwrap_err();
        assert!(matches!(err, SchemaError::AmbiguousType { ref argument } if argument == "thread"));
    }

    #[test]
    fn test_path_hint_overrides_heuristic() {
        let raw = RawArgument::new("out", RawAction::Store)
            .help("path to file")
            .path_hint(PathHint::Directory);
        assert_eq!(resolve_kind(&raw).unwrap(), ArgumentKind::DirectoryPath);
    }

    #[test]
    fn test_heuristic_ignores_toggles() {
        let raw = RawArgument::new("dry", RawAction::StoreTrue)
            .flag("--dry")
            .help("do not write the file at path");
        assert_eq!(resolve_kind(&raw).unwrap(), ArgumentKind::Flag);
    }

    #[test]
    fn test_heuristic_file_before_directory() {
        assert_eq!(
            help_heuristic("path to a file or directory"),
            Some(ArgumentKind::FilePath)
        );
    }

    #[test]
    fn test_unsupported_action_names_it() {
        let raw = RawArgument::new("items", RawAction::Unsupported("extend".into()))
            .flag("--items")
            .choices(&["a"]);
        let err = resolve_kind(&raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported action `extend` for argument `items`"
        );
    }
}
