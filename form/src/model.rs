//! The form model: bound fields, groups and live values.

use std::collections::BTreeMap;
use std::fmt;

use argform_core::{
    ArgumentKind, FieldKey, FieldValue, FormState, Schema, ScopedArgument, SerializeError,
    serialize,
};
use argform_extract::ParseEntry;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::FormError;
use crate::widget::{DisplayLabel, WidgetSpec};

/// One editable field bound to a value holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub key: FieldKey,
    /// Help text, falling back to the token or name.
    pub label: String,
    pub token: Option<String>,
    pub kind: ArgumentKind,
    pub widget: WidgetSpec,
    pub required: bool,
}

impl FormField {
    fn from_scoped(scoped: &ScopedArgument<'_>) -> Self {
        let descriptor = scoped.descriptor;
        Self {
            key: scoped.key(),
            label: descriptor.label().to_string(),
            token: descriptor.cli_token.clone(),
            kind: descriptor.kind,
            widget: WidgetSpec::for_argument(descriptor),
            required: descriptor.required,
        }
    }
}

/// Fields shown together: the whole flat form, or one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroup {
    /// Subcommand name; `None` for a flat form.
    pub name: Option<String>,
    pub help: Option<String>,
    pub fields: Vec<FormField>,
}

type Listener = Box<dyn FnMut(&FieldKey, &FieldValue)>;

/// A form built from a [`Schema`].
///
/// Without subcommands there is a single unnamed group holding the global
/// fields. With subcommands there is one group per subcommand holding its own
/// fields followed by the global ones; global fields keep the same key in
/// every group, so editing one on any tab edits them all.
///
/// # Examples
///
/// ```
/// use argform_core::*;
/// use argform_form::Form;
///
/// let mut schema = Schema::new("prog");
/// schema.arguments.push(ArgumentDescriptor::option("--verbose", "verbose", ArgumentKind::Flag));
/// schema.subcommands.push(
///     SubcommandGroup::new("sub1")
///         .with_argument(ArgumentDescriptor::positional("sub1_arg", ArgumentKind::Value)),
/// );
/// schema.subcommands.push(SubcommandGroup::new("sub2"));
///
/// let mut form = Form::build(schema);
/// assert_eq!(form.groups().len(), 2);
/// assert_eq!(form.active_group(), Some("sub1"));
///
/// form.set_value(&FieldKey::scoped("sub1", "sub1_arg"), FieldValue::text("x")).unwrap();
/// form.set_value(&FieldKey::global("verbose"), FieldValue::Bool(true)).unwrap();
/// assert_eq!(form.serialize_active().unwrap(), vec!["sub1", "x", "--verbose"]);
/// ```
pub struct Form {
    schema: Schema,
    groups: Vec<FieldGroup>,
    labels: Vec<DisplayLabel>,
    state: FormState,
    active: Option<String>,
    revision: u64,
    errors: BTreeMap<FieldKey, String>,
    notice: Option<String>,
    listeners: Vec<Listener>,
}

impl Form {
    /// Builds the form and populates every holder with its default.
    pub fn build(schema: Schema) -> Self {
        let groups = if schema.is_tabbed() {
            schema
                .subcommands
                .iter()
                .map(|group| FieldGroup {
                    name: Some(group.name.clone()),
                    help: group.help.clone(),
                    fields: fields_of(&schema, Some(&group.name)),
                })
                .collect()
        } else {
            vec![FieldGroup {
                name: None,
                help: schema.description.clone(),
                fields: fields_of(&schema, None),
            }]
        };

        let labels = schema
            .all_arguments()
            .into_iter()
            .filter(|scoped| !scoped.descriptor.kind.is_field())
            .map(|scoped| DisplayLabel {
                group: scoped.group.map(String::from),
                name: scoped.descriptor.name.clone(),
                token: scoped.descriptor.cli_token.clone(),
                text: scoped.descriptor.label().to_string(),
            })
            .collect();

        let state = FormState::from_defaults(&schema);
        let active = schema.subcommands.first().map(|group| group.name.clone());
        debug!(
            program = %schema.program,
            groups = groups.len(),
            fields = state.len(),
            "Built form"
        );

        Self {
            schema,
            groups,
            labels,
            state,
            active,
            revision: 0,
            errors: BTreeMap::new(),
            notice: None,
            listeners: Vec::new(),
        }
    }

    /// Replaces label texts with what the parser actually prints for them.
    pub fn capture_labels<P: ParseEntry + ?Sized>(&mut self, parser: &P) {
        for label in &mut self.labels {
            let Some(token) = label.token.as_deref() else {
                continue;
            };
            match parser.capture_display(token) {
                Some(text) => label.text = text,
                None => warn!(token, "Could not capture display text"),
            }
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn groups(&self) -> &[FieldGroup] {
        &self.groups
    }

    pub fn labels(&self) -> &[DisplayLabel] {
        &self.labels
    }

    pub fn is_tabbed(&self) -> bool {
        self.schema.is_tabbed()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Name of the selected tab; `None` for a flat form.
    pub fn active_group(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The group whose fields are currently shown.
    pub fn active_fields(&self) -> &FieldGroup {
        let index = self
            .active
            .as_deref()
            .and_then(|name| {
                self.groups
                    .iter()
                    .position(|g| g.name.as_deref() == Some(name))
            })
            .unwrap_or(0);
        &self.groups[index]
    }

    /// Selects the tab of subcommand `name`.
    pub fn select_group(&mut self, name: &str) -> Result<(), FormError> {
        if self.schema.find_group(name).is_none() {
            return Err(FormError::UnknownGroup(name.to_string()));
        }
        if self.active.as_deref() != Some(name) {
            self.active = Some(name.to_string());
            self.revision += 1;
        }
        Ok(())
    }

    /// Counter bumped by every change of value or selected tab.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn value(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.state.get(key)
    }

    /// Updates a holder and notifies the listeners.
    ///
    /// Any error previously reported for the field is cleared.
    pub fn set_value(&mut self, key: &FieldKey, value: FieldValue) -> Result<(), FormError> {
        let editable = self
            .schema
            .find_argument(key)
            .is_some_and(|descriptor| descriptor.kind.is_field());
        if !editable {
            return Err(FormError::UnknownField(key.to_string()));
        }

        self.errors.remove(key);
        self.notice = None;
        self.state.set(key.clone(), value);
        self.revision += 1;

        if let Some(value) = self.state.get(key) {
            for listener in &mut self.listeners {
                listener(key, value);
            }
        }
        Ok(())
    }

    /// Resolves a field reference as written by a user.
    ///
    /// `group.name` addresses a subcommand's own field; a bare name looks in
    /// the active scope, where the group's own fields shadow global ones.
    pub fn resolve_key(&self, reference: &str) -> Option<FieldKey> {
        if let Some((group, name)) = reference.split_once('.') {
            let key = FieldKey::scoped(group, name);
            if self.schema.find_argument(&key).is_some() {
                return Some(key);
            }
        }
        self.schema
            .scoped_arguments(self.active.as_deref())?
            .into_iter()
            .find(|scoped| scoped.descriptor.name == reference && scoped.descriptor.kind.is_field())
            .map(|scoped| scoped.key())
    }

    /// Registers a callback fired after every [`set_value`](Form::set_value).
    pub fn on_value_changed<F>(&mut self, listener: F)
    where
        F: FnMut(&FieldKey, &FieldValue) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Shows an error next to a field until its value changes.
    pub fn report_error(&mut self, key: FieldKey, message: impl Into<String>) {
        self.errors.insert(key, message.into());
    }

    /// Shows an error not tied to one field, such as a parser rejection.
    pub fn report_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn errors(&self) -> &BTreeMap<FieldKey, String> {
        &self.errors
    }

    pub fn error_for(&self, key: &FieldKey) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Serializes the active scope.
    pub fn serialize_active(&self) -> Result<Vec<String>, SerializeError> {
        serialize(&self.schema, self.active.as_deref(), &self.state)
    }

    /// Serializes the active scope, reporting field-bound failures.
    ///
    /// Returns `Ok(None)` when a failure was reported on a field; the user
    /// can correct it and commit again. Other failures are returned.
    pub fn try_serialize(&mut self) -> Result<Option<Vec<String>>, SerializeError> {
        match self.serialize_active() {
            Ok(argv) => Ok(Some(argv)),
            Err(err) => match err.field().cloned() {
                Some(key) => {
                    warn!(field = %key, error = %err, "Field value rejected");
                    self.report_error(key, err.to_string());
                    Ok(None)
                }
                None => Err(err),
            },
        }
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("program", &self.schema.program)
            .field("groups", &self.groups.len())
            .field("active", &self.active)
            .field("revision", &self.revision)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

fn fields_of(schema: &Schema, group: Option<&str>) -> Vec<FormField> {
    schema
        .scoped_arguments(group)
        .unwrap_or_default()
        .iter()
        .filter(|scoped| scoped.descriptor.kind.is_field())
        .map(FormField::from_scoped)
        .collect()
}
