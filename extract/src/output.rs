//! Output formatting for schemas.

use argform_core::{ArgumentDescriptor, Schema};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Formats a schema in the requested output format.
pub fn format_schema(schema: &Schema, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(schema)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(schema).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(schema_to_markdown(schema)),
        OutputFormat::Table => Ok(schema_to_table(schema)),
    }
}

fn token_column(argument: &ArgumentDescriptor) -> String {
    match &argument.cli_token {
        Some(token) if argument.aliases.is_empty() => token.clone(),
        Some(token) => format!("{token}, {}", argument.aliases.join(", ")),
        None => format!("<{}>", argument.name),
    }
}

fn arguments_to_markdown(out: &mut String, arguments: &[ArgumentDescriptor]) {
    out.push_str("| Argument | Kind | Default | Description |\n");
    out.push_str("|----------|------|---------|-------------|\n");
    for arg in arguments {
        let desc = arg.help.as_deref().unwrap_or("");
        let default = arg.default.to_string();
        out.push_str(&format!(
            "| `{}` | {} | {default} | {desc} |\n",
            token_column(arg),
            arg.kind
        ));
    }
    out.push('\n');
}

fn schema_to_markdown(schema: &Schema) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", schema.program));

    if let Some(ref desc) = schema.description {
        out.push_str(&format!("{desc}\n\n"));
    }

    if !schema.arguments.is_empty() {
        out.push_str("## Arguments\n\n");
        arguments_to_markdown(&mut out, &schema.arguments);
    }

    for group in &schema.subcommands {
        out.push_str(&format!("## Subcommand `{}`\n\n", group.name));
        if let Some(ref help) = group.help {
            out.push_str(&format!("{help}\n\n"));
        }
        if !group.own_arguments.is_empty() {
            arguments_to_markdown(&mut out, &group.own_arguments);
        }
    }

    out
}

fn arguments_to_table(out: &mut String, arguments: &[ArgumentDescriptor], indent: &str) {
    let max_name = arguments
        .iter()
        .map(|a| token_column(a).len())
        .max()
        .unwrap_or(4);
    let max_kind = arguments
        .iter()
        .map(|a| a.kind.label().len())
        .max()
        .unwrap_or(4);

    for arg in arguments {
        let desc = arg.help.as_deref().unwrap_or("");
        out.push_str(&format!(
            "{indent}{:<name_width$}  {:<kind_width$}  {desc}\n",
            token_column(arg),
            arg.kind.label(),
            name_width = max_name,
            kind_width = max_kind
        ));
    }
}

fn schema_to_table(schema: &Schema) -> String {
    let mut out = String::new();

    out.push_str(&format!("Program: {}\n", schema.program));
    if let Some(ref desc) = schema.description {
        out.push_str(&format!("  {desc}\n"));
    }

    if !schema.arguments.is_empty() {
        out.push_str("\nArguments:\n");
        arguments_to_table(&mut out, &schema.arguments, "  ");
    }

    if !schema.subcommands.is_empty() {
        out.push_str("\nSubcommands:\n");
        for group in &schema.subcommands {
            let help = group.help.as_deref().unwrap_or("");
            out.push_str(&format!("  {}  {help}\n", group.name));
            arguments_to_table(&mut out, &group.own_arguments, "    ");
        }
    }

    out
}
