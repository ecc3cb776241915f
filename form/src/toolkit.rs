//! The widget toolkit seam.
//!
//! A toolkit draws the form and turns user interaction into [`FormEvent`]s.
//! The session runner owns the loop; the toolkit never mutates the form
//! directly.

use argform_core::{FieldKey, FieldValue};
use thiserror::Error;

use crate::interactive::OutputPane;
use crate::model::Form;

/// User interaction, as reported by a toolkit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// A field was edited.
    Edited { key: FieldKey, value: FieldValue },
    /// Another subcommand tab was selected.
    SelectGroup(String),
    /// Explicit request to run the callback (interactive sessions).
    RunNow,
    /// Accept the form.
    Commit,
    /// Close the form without producing an argument vector.
    Cancel,
}

/// Errors reported by a toolkit.
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure inside the toolkit backend.
    #[error("{0}")]
    Backend(String),

    /// The toolkit stopped producing events.
    #[error("event stream closed")]
    Closed,
}

/// A concrete widget toolkit.
pub trait Toolkit {
    /// Presents `form` (with any reported errors) and waits for the next event.
    fn next_event(&mut self, form: &Form) -> Result<FormEvent, ToolkitError>;

    /// Replaces the output view of an interactive session.
    fn show_output(&mut self, _output: &OutputPane) -> Result<(), ToolkitError> {
        Ok(())
    }
}

impl<T: Toolkit + ?Sized> Toolkit for &mut T {
    fn next_event(&mut self, form: &Form) -> Result<FormEvent, ToolkitError> {
        (**self).next_event(form)
    }

    fn show_output(&mut self, output: &OutputPane) -> Result<(), ToolkitError> {
        (**self).show_output(output)
    }
}
