//! Toolkit-agnostic form model and session runner.
//!
//! - [`Form`]: bound fields per [`FieldGroup`] (one tab per subcommand),
//!   live values, listeners and per-field errors.
//! - [`WidgetSpec`]: the input control each field kind needs.
//! - [`Toolkit`]: the seam a concrete widget toolkit implements.
//! - [`run_form`]: escape hatch, extraction, event loop and final parse.
//! - [`InteractiveSession`]: the same loop, re-running a callback on every
//!   accepted argument vector.
//!
//! # Example
//!
//! ```
//! use argform_core::{FieldKey, FieldValue};
//! use argform_extract::ClapSource;
//! use argform_form::{Form, FormEvent, SessionConfig, Toolkit, ToolkitError, run_form};
//! use clap::{Arg, ArgAction, Command};
//!
//! struct Scripted(Vec<FormEvent>);
//!
//! impl Toolkit for Scripted {
//!     fn next_event(&mut self, _form: &Form) -> Result<FormEvent, ToolkitError> {
//!         if self.0.is_empty() {
//!             return Err(ToolkitError::Closed);
//!         }
//!         Ok(self.0.remove(0))
//!     }
//! }
//!
//! let source = ClapSource::new(
//!     Command::new("prog").arg(Arg::new("verbose").short('v').action(ArgAction::Count)),
//! );
//! let mut toolkit = Scripted(vec![
//!     FormEvent::Edited { key: FieldKey::global("verbose"), value: FieldValue::Count(2) },
//!     FormEvent::Commit,
//! ]);
//!
//! let outcome = run_form(&source, &mut toolkit, &SessionConfig::default(), &[]).unwrap();
//! assert_eq!(outcome.argv().unwrap(), ["-v", "-v"]);
//! assert_eq!(outcome.parsed().unwrap().get_count("verbose"), 2);
//! ```

mod config;
mod error;
mod escape;
mod interactive;
mod model;
mod session;
mod toolkit;
mod widget;

pub use config::{
    DEFAULT_ESCAPE_ENV, DEFAULT_ESCAPE_FLAG, EscapeConfig, InteractiveConfig, SessionConfig,
};
pub use error::{ConfigError, FormError, SessionError};
pub use escape::{BypassReason, EscapeHatch};
pub use interactive::{InteractiveResult, InteractiveSession, OutputPane, OutputTab, OutputValue};
pub use model::{FieldGroup, Form, FormField};
pub use session::{SessionOutcome, run_form};
pub use toolkit::{FormEvent, Toolkit, ToolkitError};
pub use widget::{DisplayLabel, WidgetSpec};
