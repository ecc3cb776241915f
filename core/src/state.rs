//! Live form values keyed by field.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{FieldValue, Schema};

/// Identifies one value holder.
///
/// Global arguments have no group, so every tab of a tabbed form shares the
/// same holder for them. Group-own arguments are scoped to their group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub name: String,
}

impl FieldKey {
    /// Key of a global argument.
    pub fn global(name: &str) -> Self {
        Self {
            group: None,
            name: name.to_string(),
        }
    }

    /// Key of an argument owned by `group`.
    pub fn scoped(group: &str, name: &str) -> Self {
        Self {
            group: Some(group.to_string()),
            name: name.to_string(),
        }
    }

    pub fn for_scope(group: Option<&str>, name: &str) -> Self {
        Self {
            group: group.map(String::from),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{group}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Mapping from field key to current value.
///
/// Populated with defaults when the form is built, mutated by user
/// interaction and read once by the serializer.
///
/// # Examples
///
/// ```
/// use argform_core::*;
///
/// let mut schema = Schema::new("prog");
/// schema.arguments.push(
///     ArgumentDescriptor::option("--seed", "seed", ArgumentKind::Value)
///         .with_default(FieldValue::text("0")),
/// );
///
/// let mut state = FormState::from_defaults(&schema);
/// assert_eq!(state.get(&FieldKey::global("seed")), Some(&FieldValue::text("0")));
///
/// state.set(FieldKey::global("seed"), FieldValue::text("7"));
/// assert_eq!(state.get(&FieldKey::global("seed")), Some(&FieldValue::text("7")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<FieldKey, FieldValue>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding the default of every field in every scope.
    pub fn from_defaults(schema: &Schema) -> Self {
        let mut state = Self::new();
        for scoped in schema.all_arguments() {
            if scoped.descriptor.kind.is_field() {
                state.set(scoped.key(), scoped.descriptor.default.clone());
            }
        }
        state
    }

    pub fn get(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Stores a value, returning the previous one.
    pub fn set(&mut self, key: FieldKey, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(key, value)
    }

    /// Stores a value addressed by argument name within the active scope.
    ///
    /// The active group's own arguments shadow global ones. Returns the key
    /// that was written, or `None` if no argument in scope has that name.
    pub fn set_named(
        &mut self,
        schema: &Schema,
        group: Option<&str>,
        name: &str,
        value: FieldValue,
    ) -> Option<FieldKey> {
        let key = schema
            .scoped_arguments(group)?
            .into_iter()
            .find(|scoped| scoped.descriptor.name == name && scoped.descriptor.kind.is_field())?
            .key();
        self.set(key.clone(), value);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.values.iter()
    }
}
