//! Prompt-per-field terminal toolkit built on `dialoguer`.
//!
//! The active fields are listed in a menu; picking one prompts for a new
//! value with the control its [`WidgetSpec`] asks for. Prompts and the form
//! header go to stderr, leaving stdout for the argument vector.

use argform_core::FieldValue;
use argform_form::{Form, FormEvent, FormField, Toolkit, ToolkitError, WidgetSpec};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

const NO_CHOICE: &str = "(none)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEntry {
    /// Index into the active group's fields.
    Field(usize),
    SwitchGroup,
    Commit,
    Cancel,
}

pub struct DialoguerToolkit {
    theme: ColorfulTheme,
    title: Option<String>,
}

impl DialoguerToolkit {
    pub fn new(title: Option<String>) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            title,
        }
    }

    fn print_header(&self, form: &Form) {
        let title = self
            .title
            .as_deref()
            .unwrap_or(form.schema().program.as_str());
        match form.active_group() {
            Some(group) => eprintln!("\n{title} [{group}]"),
            None => eprintln!("\n{title}"),
        }
        if let Some(help) = &form.active_fields().help {
            eprintln!("  {help}");
        }
        for label in form.labels() {
            eprintln!("  {}", label.text);
        }
        if let Some(notice) = form.notice() {
            eprintln!("  ! {notice}");
        }
    }

    /// Prompts for a field; `None` when the prompt was dismissed.
    fn prompt_field(
        &self,
        form: &Form,
        field: &FormField,
    ) -> Result<Option<FieldValue>, ToolkitError> {
        let current = form.value(&field.key).cloned().unwrap_or_default();
        let prompt = field.label.as_str();

        match &field.widget {
            WidgetSpec::Checkbox => {
                let checked = Confirm::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .default(current.as_bool().unwrap_or(false))
                    .interact_opt()
                    .map_err(backend)?;
                Ok(checked.map(FieldValue::Bool))
            }
            WidgetSpec::Dropdown { choices } => {
                let mut items = vec![NO_CHOICE.to_string()];
                items.extend(choices.iter().cloned());
                let selected = current.to_string();
                let default = choices
                    .iter()
                    .position(|choice| *choice == selected)
                    .map_or(0, |index| index + 1);

                let picked = Select::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .items(&items)
                    .default(default)
                    .interact_opt()
                    .map_err(backend)?;
                Ok(picked.map(|index| match index {
                    0 => FieldValue::text(""),
                    index => FieldValue::text(items[index].clone()),
                }))
            }
            WidgetSpec::Spinner { .. } => {
                let value = Input::<i32>::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .default(current.as_count().unwrap_or(0))
                    .interact_text()
                    .map_err(backend)?;
                Ok(Some(FieldValue::Count(value)))
            }
            WidgetSpec::FilePicker | WidgetSpec::DirectoryPicker | WidgetSpec::TextLine => {
                let prompt = match field.widget {
                    WidgetSpec::FilePicker => format!("{prompt} (file)"),
                    WidgetSpec::DirectoryPicker => format!("{prompt} (directory)"),
                    _ => prompt.to_string(),
                };
                let text = Input::<String>::with_theme(&self.theme)
                    .with_prompt(prompt)
                    .with_initial_text(current.to_string())
                    .allow_empty(true)
                    .interact_text()
                    .map_err(backend)?;
                Ok(Some(FieldValue::text(text)))
            }
        }
    }

    fn prompt_group(&self, form: &Form) -> Result<Option<String>, ToolkitError> {
        let names = form.schema().group_names();
        let default = form
            .active_group()
            .and_then(|active| names.iter().position(|name| *name == active))
            .unwrap_or(0);

        let picked = Select::with_theme(&self.theme)
            .with_prompt("Subcommand")
            .items(&names)
            .default(default)
            .interact_opt()
            .map_err(backend)?;
        Ok(picked.map(|index| names[index].to_string()))
    }
}

impl Toolkit for DialoguerToolkit {
    fn next_event(&mut self, form: &Form) -> Result<FormEvent, ToolkitError> {
        self.print_header(form);

        let entries = menu_entries(form);
        let items: Vec<String> = entries.iter().map(|entry| entry_line(form, *entry)).collect();

        loop {
            let picked = Select::with_theme(&self.theme)
                .with_prompt("Edit a field, or commit")
                .items(&items)
                .default(0)
                .interact_opt()
                .map_err(backend)?;
            let Some(index) = picked else {
                return Ok(FormEvent::Cancel);
            };

            match entries[index] {
                MenuEntry::Field(field) => {
                    let field = &form.active_fields().fields[field];
                    if let Some(value) = self.prompt_field(form, field)? {
                        return Ok(FormEvent::Edited {
                            key: field.key.clone(),
                            value,
                        });
                    }
                }
                MenuEntry::SwitchGroup => {
                    if let Some(name) = self.prompt_group(form)? {
                        return Ok(FormEvent::SelectGroup(name));
                    }
                }
                MenuEntry::Commit => return Ok(FormEvent::Commit),
                MenuEntry::Cancel => return Ok(FormEvent::Cancel),
            }
        }
    }
}

fn backend(err: dialoguer::Error) -> ToolkitError {
    ToolkitError::Backend(err.to_string())
}

fn menu_entries(form: &Form) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = (0..form.active_fields().fields.len())
        .map(MenuEntry::Field)
        .collect();
    if form.groups().len() > 1 {
        entries.push(MenuEntry::SwitchGroup);
    }
    entries.push(MenuEntry::Commit);
    entries.push(MenuEntry::Cancel);
    entries
}

fn entry_line(form: &Form, entry: MenuEntry) -> String {
    match entry {
        MenuEntry::Field(index) => {
            let field = &form.active_fields().fields[index];
            let shown = form
                .value(&field.key)
                .map(describe_value)
                .unwrap_or_default();
            let required = if field.required { " *" } else { "" };
            let mut line = format!("{}{required}: {shown}", field.label);
            if let Some(error) = form.error_for(&field.key) {
                line.push_str(&format!("  ! {error}"));
            }
            line
        }
        MenuEntry::SwitchGroup => "Switch subcommand".to_string(),
        MenuEntry::Commit => "Commit".to_string(),
        MenuEntry::Cancel => "Cancel".to_string(),
    }
}

fn describe_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(true) => "on".to_string(),
        FieldValue::Bool(false) => "off".to_string(),
        FieldValue::Count(n) => n.to_string(),
        FieldValue::Text(text) if text.is_empty() => "-".to_string(),
        FieldValue::Text(text) => text.clone(),
    }
}
