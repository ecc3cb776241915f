//! The form session: escape hatch, extraction, event loop, parse.

use argform_extract::{ParseEntry, SchemaSource};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::escape::EscapeHatch;
use crate::model::Form;
use crate::toolkit::{FormEvent, Toolkit};

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome<T> {
    /// The form was committed and the parser accepted the argument vector.
    Committed { argv: Vec<String>, parsed: T },
    /// The escape hatch fired; `argv` are the literal arguments.
    Bypassed { argv: Vec<String>, parsed: T },
    /// The user closed the form. No argument vector exists.
    Cancelled,
}

impl<T> SessionOutcome<T> {
    /// Parsed result, unless the session was cancelled.
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Committed { parsed, .. } | Self::Bypassed { parsed, .. } => Some(parsed),
            Self::Cancelled => None,
        }
    }

    /// Argument vector handed to the parser, unless the session was cancelled.
    pub fn argv(&self) -> Option<&[String]> {
        match self {
            Self::Committed { argv, .. } | Self::Bypassed { argv, .. } => Some(argv),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> SessionOutcome<U> {
        match self {
            Self::Committed { argv, parsed } => SessionOutcome::Committed {
                argv,
                parsed: f(parsed),
            },
            Self::Bypassed { argv, parsed } => SessionOutcome::Bypassed {
                argv,
                parsed: f(parsed),
            },
            Self::Cancelled => SessionOutcome::Cancelled,
        }
    }
}

pub(crate) enum Prepared<T> {
    Bypassed(SessionOutcome<T>),
    Ready(Form),
}

/// Runs the escape hatch and, when it does not fire, builds the form.
pub(crate) fn prepare<S>(
    source: &S,
    config: &SessionConfig,
    args: &[String],
) -> Result<Prepared<S::Output>, SessionError<S::Error>>
where
    S: SchemaSource + ParseEntry + ?Sized,
{
    let hatch = EscapeHatch::new(config.escape.clone());
    if let Some((reason, literal)) = hatch.check(args) {
        info!(?reason, arguments = literal.len(), "Skipping form");
        let parsed = source.parse_tokens(&literal).map_err(SessionError::Parse)?;
        return Ok(Prepared::Bypassed(SessionOutcome::Bypassed {
            argv: literal,
            parsed,
        }));
    }

    let schema = source.extract()?;
    let mut form = Form::build(schema);
    form.capture_labels(source);
    Ok(Prepared::Ready(form))
}

/// Runs a form session.
///
/// The escape hatch is checked first; when it fires, the literal arguments
/// go straight to the parser. Otherwise the schema is extracted, the form is
/// built and the toolkit drives the loop until the form is committed or
/// cancelled.
///
/// On commit, a failure tied to one field (such as a rejected custom value)
/// is reported on the still-open form instead of ending the session. The
/// committed vector is parsed once; parse errors are returned unchanged.
pub fn run_form<S, T>(
    source: &S,
    toolkit: &mut T,
    config: &SessionConfig,
    args: &[String],
) -> Result<SessionOutcome<S::Output>, SessionError<S::Error>>
where
    S: SchemaSource + ParseEntry + ?Sized,
    T: Toolkit + ?Sized,
{
    let mut form = match prepare(source, config, args)? {
        Prepared::Bypassed(outcome) => return Ok(outcome),
        Prepared::Ready(form) => form,
    };

    loop {
        match toolkit.next_event(&form)? {
            FormEvent::Edited { key, value } => form.set_value(&key, value)?,
            FormEvent::SelectGroup(name) => form.select_group(&name)?,
            FormEvent::RunNow => debug!("Run request ignored outside interactive sessions"),
            FormEvent::Cancel => {
                info!(program = %form.schema().program, "Form cancelled");
                return Ok(SessionOutcome::Cancelled);
            }
            FormEvent::Commit => {
                let Some(argv) = form.try_serialize()? else {
                    continue;
                };
                info!(program = %form.schema().program, tokens = argv.len(), "Form committed");
                let parsed = source.parse_tokens(&argv).map_err(|err| {
                    warn!(error = %err, "Parser rejected the committed arguments");
                    SessionError::Parse(err)
                })?;
                return Ok(SessionOutcome::Committed { argv, parsed });
            }
        }
    }
}
