//! Escape hatch: skip the form and parse literal arguments.
//!
//! Checked before any extraction or UI state exists.

use std::ffi::OsString;

use tracing::debug;

use crate::config::EscapeConfig;

/// Why the form was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassReason {
    /// The configured environment variable is set.
    Environment(String),
    /// The passthrough flag was given.
    Flag(String),
    /// Literal arguments were given.
    Arguments,
}

/// Decides whether a session bypasses the form.
///
/// # Examples
///
/// ```
/// use argform_form::{BypassReason, EscapeConfig, EscapeHatch};
///
/// let hatch = EscapeHatch::new(EscapeConfig::default());
/// let args = vec!["--no-form".to_string(), "in.txt".to_string()];
///
/// let (reason, literal) = hatch.check_with(&args, |_| None).unwrap();
/// assert_eq!(reason, BypassReason::Flag("--no-form".into()));
/// assert_eq!(literal, vec!["in.txt"]);
///
/// assert!(hatch.check_with(&[], |_| None).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EscapeHatch {
    config: EscapeConfig,
}

impl EscapeHatch {
    pub fn new(config: EscapeConfig) -> Self {
        Self { config }
    }

    /// Checks `args` against the process environment.
    pub fn check(&self, args: &[String]) -> Option<(BypassReason, Vec<String>)> {
        self.check_with(args, |name| std::env::var_os(name))
    }

    /// Checks `args`, reading environment variables through `env`.
    ///
    /// Returns the reason and the literal arguments to parse, with the
    /// passthrough flag removed. The environment variable wins over the flag,
    /// which wins over the mere presence of arguments.
    pub fn check_with<F>(&self, args: &[String], env: F) -> Option<(BypassReason, Vec<String>)>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let literal: Vec<String> = match &self.config.flag {
            Some(flag) => args.iter().filter(|arg| *arg != flag).cloned().collect(),
            None => args.to_vec(),
        };

        if let Some(var) = &self.config.env_var {
            if env(var).is_some_and(|value| is_enabled(&value)) {
                debug!(env_var = %var, "Form bypassed by environment");
                return Some((BypassReason::Environment(var.clone()), literal));
            }
        }

        if let Some(flag) = &self.config.flag {
            if literal.len() != args.len() {
                debug!(%flag, "Form bypassed by passthrough flag");
                return Some((BypassReason::Flag(flag.clone()), literal));
            }
        }

        if self.config.bypass_with_arguments && !args.is_empty() {
            debug!(arguments = args.len(), "Form bypassed by literal arguments");
            return Some((BypassReason::Arguments, literal));
        }

        None
    }
}

fn is_enabled(value: &OsString) -> bool {
    let value = value.to_string_lossy();
    let value = value.trim();
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}
