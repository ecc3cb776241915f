//! Session configuration.
//!
//! Controls the escape hatch and the interactive output view. Every key is
//! optional; missing keys take their defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! title: Graph solver
//! escape:
//!   env_var: ARGFORM_SKIP_FORM
//!   flag: --no-form
//!   bypass_with_arguments: true
//! interactive:
//!   autorun: true
//!   tabulate: true
//!   tab_names: [summary, details]
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable that skips the form by default.
pub const DEFAULT_ESCAPE_ENV: &str = "ARGFORM_SKIP_FORM";

/// Passthrough flag that skips the form by default.
pub const DEFAULT_ESCAPE_FLAG: &str = "--no-form";

/// When the form is bypassed and literal arguments go straight to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscapeConfig {
    /// Variable that, when set to a non-empty value other than `0`, skips the
    /// form. `None` disables the check.
    pub env_var: Option<String>,
    /// Flag that skips the form; removed before the arguments are parsed.
    pub flag: Option<String>,
    /// Skip the form whenever literal arguments are present.
    pub bypass_with_arguments: bool,
}

impl Default for EscapeConfig {
    fn default() -> Self {
        Self {
            env_var: Some(DEFAULT_ESCAPE_ENV.to_string()),
            flag: Some(DEFAULT_ESCAPE_FLAG.to_string()),
            bypass_with_arguments: true,
        }
    }
}

/// Settings of the interactive output view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveConfig {
    /// Re-run the callback after every edit.
    pub autorun: bool,
    /// Show each element of a sequence output in its own tab.
    pub tabulate: bool,
    /// Tab names, in order; unnamed tabs fall back to `tab N`.
    pub tab_names: Vec<String>,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            autorun: true,
            tabulate: false,
            tab_names: Vec::new(),
        }
    }
}

/// Top-level session configuration.
///
/// # Examples
///
/// ```
/// use argform_form::SessionConfig;
///
/// let config: SessionConfig = serde_yaml::from_str("interactive: { tabulate: true }").unwrap();
/// assert!(config.interactive.tabulate);
/// assert!(config.interactive.autorun);
/// assert_eq!(config.escape.flag.as_deref(), Some("--no-form"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Window or prompt title; defaults to the program name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub escape: EscapeConfig,
    pub interactive: InteractiveConfig,
}

impl SessionConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
