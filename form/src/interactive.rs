//! Interactive sessions: re-run a callback on the parsed arguments while the
//! form stays open, and show its output next to the form.

use argform_extract::{ParseEntry, SchemaSource};
use tracing::{debug, info, warn};

use crate::config::{InteractiveConfig, SessionConfig};
use crate::error::SessionError;
use crate::model::Form;
use crate::session::{Prepared, SessionOutcome, prepare};
use crate::toolkit::{FormEvent, Toolkit};

/// Value returned by an interactive callback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputValue {
    /// Nothing to show yet.
    #[default]
    Empty,
    /// One block of text.
    Scalar(String),
    /// Values shown one after the other; with `tabulate`, one tab each.
    Sequence(Vec<OutputValue>),
    /// Values always shown one tab each.
    Tabs(Vec<OutputValue>),
}

impl OutputValue {
    fn lines(&self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::Scalar(text) => text.lines().map(String::from).collect(),
            Self::Sequence(items) | Self::Tabs(items) => {
                items.iter().flat_map(OutputValue::lines).collect()
            }
        }
    }
}

impl From<String> for OutputValue {
    fn from(text: String) -> Self {
        Self::Scalar(text)
    }
}

impl From<&str> for OutputValue {
    fn from(text: &str) -> Self {
        Self::Scalar(text.to_string())
    }
}

/// One tab of an [`OutputPane`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTab {
    /// `None` when the output is not tabbed.
    pub name: Option<String>,
    pub lines: Vec<String>,
}

/// Rendered callback output, ready for a toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputPane {
    pub tabs: Vec<OutputTab>,
}

impl OutputPane {
    /// Lays out `value` according to `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argform_form::{InteractiveConfig, OutputPane, OutputValue};
    ///
    /// let config = InteractiveConfig {
    ///     tabulate: true,
    ///     tab_names: vec!["first".into()],
    ///     ..Default::default()
    /// };
    /// let value = OutputValue::Sequence(vec!["a".into(), "b".into()]);
    ///
    /// let pane = OutputPane::render(&value, &config);
    /// let names: Vec<_> = pane.tabs.iter().map(|t| t.name.as_deref()).collect();
    /// assert_eq!(names, vec![Some("first"), Some("tab 2")]);
    /// ```
    pub fn render(value: &OutputValue, config: &InteractiveConfig) -> Self {
        let tabbed = match value {
            OutputValue::Tabs(items) => Some(items),
            OutputValue::Sequence(items) if config.tabulate => Some(items),
            _ => None,
        };

        let tabs = match tabbed {
            Some(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| OutputTab {
                    name: Some(
                        config
                            .tab_names
                            .get(index)
                            .cloned()
                            .unwrap_or_else(|| format!("tab {}", index + 1)),
                    ),
                    lines: item.lines(),
                })
                .collect(),
            None => vec![OutputTab {
                name: None,
                lines: value.lines(),
            }],
        };

        Self { tabs }
    }
}

/// Parsed result of an interactive session with the last callback output.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveResult<T> {
    pub parsed: T,
    /// Output of the last callback run; empty when the form was bypassed.
    pub output: OutputValue,
}

/// A form session that runs `callback` on every accepted argument vector.
///
/// Every [`FormEvent::RunNow`], every edit when `autorun` is on, and the
/// final commit serialize and parse the form, then run the callback and push
/// its output to the toolkit. While the form is open, parser rejections are
/// reported on the form and do not end the session.
pub struct InteractiveSession<'a, S: ?Sized, F> {
    source: &'a S,
    callback: F,
    config: SessionConfig,
}

impl<'a, S, F> InteractiveSession<'a, S, F>
where
    S: SchemaSource + ParseEntry + ?Sized,
    F: FnMut(&S::Output) -> OutputValue,
{
    pub fn new(source: &'a S, callback: F) -> Self {
        Self {
            source,
            callback,
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the session to completion.
    pub fn run<T>(
        mut self,
        toolkit: &mut T,
        args: &[String],
    ) -> Result<SessionOutcome<InteractiveResult<S::Output>>, SessionError<S::Error>>
    where
        T: Toolkit + ?Sized,
    {
        let mut form = match prepare(self.source, &self.config, args)? {
            Prepared::Bypassed(outcome) => {
                return Ok(outcome.map(|parsed| InteractiveResult {
                    parsed,
                    output: OutputValue::Empty,
                }));
            }
            Prepared::Ready(form) => form,
        };

        loop {
            match toolkit.next_event(&form)? {
                FormEvent::Edited { key, value } => {
                    form.set_value(&key, value)?;
                    if self.config.interactive.autorun {
                        self.live_run(&mut form, toolkit)?;
                    }
                }
                FormEvent::SelectGroup(name) => {
                    form.select_group(&name)?;
                    if self.config.interactive.autorun {
                        self.live_run(&mut form, toolkit)?;
                    }
                }
                FormEvent::RunNow => self.live_run(&mut form, toolkit)?,
                FormEvent::Cancel => {
                    info!(program = %form.schema().program, "Interactive form cancelled");
                    return Ok(SessionOutcome::Cancelled);
                }
                FormEvent::Commit => {
                    let Some(argv) = form.try_serialize()? else {
                        continue;
                    };
                    let parsed = self
                        .source
                        .parse_tokens(&argv)
                        .map_err(SessionError::Parse)?;
                    let output = (self.callback)(&parsed);
                    info!(program = %form.schema().program, tokens = argv.len(), "Interactive form committed");
                    return Ok(SessionOutcome::Committed {
                        argv,
                        parsed: InteractiveResult { parsed, output },
                    });
                }
            }
        }
    }

    fn live_run<T>(
        &mut self,
        form: &mut Form,
        toolkit: &mut T,
    ) -> Result<(), SessionError<S::Error>>
    where
        T: Toolkit + ?Sized,
    {
        let Some(argv) = form.try_serialize()? else {
            return Ok(());
        };

        match self.source.parse_tokens(&argv) {
            Ok(parsed) => {
                let output = (self.callback)(&parsed);
                let pane = OutputPane::render(&output, &self.config.interactive);
                debug!(revision = form.revision(), tabs = pane.tabs.len(), "Refreshed output");
                toolkit.show_output(&pane)?;
            }
            Err(err) => {
                warn!(error = %err, "Live run rejected by parser");
                form.report_notice(err.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untabulated_sequence_is_one_pane() {
        let value = OutputValue::Sequence(vec!["a\nb".into(), "c".into()]);
        let pane = OutputPane::render(&value, &InteractiveConfig::default());
        assert_eq!(
            pane.tabs,
            vec![OutputTab {
                name: None,
                lines: vec!["a".into(), "b".into(), "c".into()]
            }]
        );
    }

    #[test]
    fn test_explicit_tabs_ignore_tabulate() {
        let value = OutputValue::Tabs(vec!["x".into(), OutputValue::Empty]);
        let pane = OutputPane::render(&value, &InteractiveConfig::default());
        assert_eq!(pane.tabs.len(), 2);
        assert_eq!(pane.tabs[1].name.as_deref(), Some("tab 2"));
        assert!(pane.tabs[1].lines.is_empty());
    }

    #[test]
    fn test_scalar_with_tabulate_stays_single() {
        let config = InteractiveConfig {
            tabulate: true,
            ..Default::default()
        };
        let pane = OutputPane::render(&"42".into(), &config);
        assert_eq!(pane.tabs.len(), 1);
        assert_eq!(pane.tabs[0].name, None);
    }
}
