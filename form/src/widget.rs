//! Widget requirements per field kind.

use argform_core::{ArgumentDescriptor, ArgumentKind, FieldValue, SemanticType};
use serde::Serialize;

/// What kind of input control a field needs.
///
/// The toolkit decides how to draw it; this only states the requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetSpec {
    TextLine,
    Checkbox,
    Dropdown { choices: Vec<String> },
    /// Integer input bounded to the given range.
    Spinner { min: i32, max: i32 },
    FilePicker,
    DirectoryPicker,
}

impl WidgetSpec {
    /// Widget for a descriptor.
    ///
    /// Integer values get a spinner only when their default is numeric;
    /// otherwise a blank text line keeps "not given" distinguishable from 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use argform_core::{ArgumentDescriptor, ArgumentKind};
    /// use argform_form::WidgetSpec;
    ///
    /// let level = ArgumentDescriptor::option("--level", "level", ArgumentKind::Choice)
    ///     .with_choices(&["DEBUG", "INFO"]);
    /// assert_eq!(
    ///     WidgetSpec::for_argument(&level),
    ///     WidgetSpec::Dropdown { choices: vec!["DEBUG".into(), "INFO".into()] }
    /// );
    /// ```
    pub fn for_argument(descriptor: &ArgumentDescriptor) -> Self {
        match descriptor.kind {
            ArgumentKind::Choice => Self::Dropdown {
                choices: descriptor.choices.clone(),
            },
            ArgumentKind::Flag => Self::Checkbox,
            ArgumentKind::Counting => Self::spinner(),
            ArgumentKind::Value
                if descriptor.value_type == SemanticType::Integer
                    && matches!(descriptor.default, FieldValue::Count(_)) =>
            {
                Self::spinner()
            }
            ArgumentKind::FilePath => Self::FilePicker,
            ArgumentKind::DirectoryPath => Self::DirectoryPicker,
            ArgumentKind::Value
            | ArgumentKind::AppendList
            | ArgumentKind::CustomTyped
            | ArgumentKind::Display => Self::TextLine,
        }
    }

    fn spinner() -> Self {
        Self::Spinner {
            min: i32::MIN,
            max: i32::MAX,
        }
    }
}

/// Read-only text shown for a display-and-exit action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayLabel {
    /// Owning group, `None` for global actions.
    pub group: Option<String>,
    pub name: String,
    pub token: Option<String>,
    /// Captured output of the action, or its help text until captured.
    pub text: String,
}
