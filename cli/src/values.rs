//! Values files: field values applied to a form without prompting.
//!
//! ```yaml
//! subcommand: sub2
//! values:
//!   sub2_arg: y
//!   verbose: true
//! ```
//!
//! Keys are field names, or `group.name` for a subcommand's own field.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use argform_core::FieldValue;
use argform_form::Form;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValuesFile {
    /// Subcommand to serialize; the first one when omitted.
    #[serde(default)]
    pub subcommand: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, FieldValue>,
}

impl ValuesFile {
    /// Loads a `.json` file, or YAML for any other extension.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&text)
                .map_err(|err| format!("Invalid values file '{}': {err}", path.display()))
        } else {
            serde_yaml::from_str(&text)
                .map_err(|err| format!("Invalid values file '{}': {err}", path.display()))
        }
    }

    /// Selects the subcommand and sets every listed value on `form`.
    ///
    /// `group` overrides the file's `subcommand`.
    pub fn apply(&self, form: &mut Form, group: Option<&str>) -> Result<(), String> {
        if let Some(group) = group.or(self.subcommand.as_deref()) {
            form.select_group(group).map_err(|err| err.to_string())?;
        }

        for (reference, value) in &self.values {
            let key = form
                .resolve_key(reference)
                .ok_or_else(|| format!("unknown field `{reference}`"))?;
            form.set_value(&key, value.clone())
                .map_err(|err| err.to_string())?;
        }
        Ok(())
    }
}
