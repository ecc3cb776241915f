use std::path::{Path, PathBuf};

use argform_core::{Schema, validate_schema};
use argform_extract::{DefinitionSource, OutputFormat, ParseEntry, SchemaSource, format_schema};
use argform_form::{
    DisplayLabel, FieldGroup, Form, SessionConfig, SessionError, SessionOutcome, run_form,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod terminal;
mod transformers;
mod values;

use terminal::DialoguerToolkit;
use transformers::builtin_registry;
use values::ValuesFile;

/// Exit status of a cancelled form.
const EXIT_CANCELLED: i32 = 130;

/// How an argument vector is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ArgvFormat {
    /// JSON array of tokens.
    Json,
    /// One token per line.
    Lines,
    /// Shell-quoted command line, program name first.
    Shell,
}

#[derive(Debug, Parser)]
#[command(name = "argform", version)]
#[command(about = "Forms from command-line parser definitions, and argument vectors back")]
struct Cli {
    /// Log extraction and serialization details to stderr.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the normalized schema of a definition document.
    Inspect(InspectArgs),
    /// Check definition documents for structural problems.
    Validate(ValidateArgs),
    /// Serialize a values file into the argument vector the parser expects.
    Serialize(SerializeArgs),
    /// Fill in a definition's form on the terminal and print the argument vector.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Definition document (JSON or YAML).
    definition: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Print the form layout (groups, fields, widgets) instead of the schema.
    #[arg(long)]
    form: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Definition documents (JSON or YAML).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct SerializeArgs {
    /// Definition document (JSON or YAML).
    definition: PathBuf,
    /// Values file (JSON or YAML); defaults only when omitted.
    #[arg(long)]
    values: Option<PathBuf>,
    /// Subcommand to serialize, overriding the values file.
    #[arg(long)]
    group: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    output: ArgvFormat,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Definition document (JSON or YAML).
    definition: PathBuf,
    /// Session config (YAML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    output: ArgvFormat,
    /// Arguments for the program; the escape hatch may pass them straight
    /// to the parser.
    #[arg(last = true)]
    args: Vec<String>,
}

/// Form layout printed by `inspect --form`.
#[derive(Debug, Serialize)]
struct FormLayout<'a> {
    program: &'a str,
    tabbed: bool,
    groups: &'a [FieldGroup],
    labels: &'a [DisplayLabel],
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Validate(args) => run_validate(args),
        Command::Serialize(args) => run_serialize(args),
        Command::Run(args) => run_run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("argform=debug,argform_core=debug,argform_extract=debug,argform_form=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_definition(path: &Path) -> Result<DefinitionSource, String> {
    let source = DefinitionSource::from_path(path, &builtin_registry())
        .map_err(|err| format!("'{}': {err}", path.display()))?;
    debug!(definition = %path.display(), "Loaded definition");
    Ok(source)
}

fn extract(source: &DefinitionSource, path: &Path) -> Result<Schema, String> {
    source
        .extract()
        .map_err(|err| format!("'{}': {err}", path.display()))
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let source = load_definition(&args.definition)?;
    let schema = extract(&source, &args.definition)?;

    if !args.form {
        print!("{}", ensure_newline(format_schema(&schema, args.format)?));
        return Ok(());
    }

    let mut form = Form::build(schema);
    form.capture_labels(&source);
    let layout = FormLayout {
        program: &form.schema().program,
        tabbed: form.is_tabbed(),
        groups: form.groups(),
        labels: form.labels(),
    };
    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&layout)
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        OutputFormat::Yaml => {
            serde_yaml::to_string(&layout).map_err(|e| format!("YAML serialization failed: {e}"))?
        }
        OutputFormat::Markdown | OutputFormat::Table => {
            return Err("the form layout prints as json or yaml only".to_string());
        }
    };
    print!("{}", ensure_newline(rendered));
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut failed = 0;

    for path in &args.inputs {
        let loaded = load_definition(path).and_then(|source| extract(&source, path));
        let problems: Vec<String> = match loaded {
            Ok(schema) => validate_schema(&schema)
                .into_iter()
                .map(|err| err.to_string())
                .collect(),
            Err(err) => vec![err],
        };

        if problems.is_empty() {
            println!("ok: {}", path.display());
        } else {
            failed += 1;
            for problem in problems {
                eprintln!("{}: {problem}", path.display());
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{failed} of {} definition(s) failed validation",
            args.inputs.len()
        ));
    }
    println!("Validated {} definition(s).", args.inputs.len());
    Ok(())
}

fn run_serialize(args: SerializeArgs) -> Result<(), String> {
    let source = load_definition(&args.definition)?;
    let schema = extract(&source, &args.definition)?;
    let values = match &args.values {
        Some(path) => ValuesFile::load(path)?,
        None => ValuesFile::default(),
    };

    let mut form = Form::build(schema);
    values.apply(&mut form, args.group.as_deref())?;
    let argv = form.serialize_active().map_err(|err| err.to_string())?;

    source
        .parse_tokens(&argv)
        .map_err(|err| format!("parser rejected the arguments: {}", parser_message(&err)))?;
    info!(program = %form.schema().program, tokens = argv.len(), "Serialized values");

    println!("{}", format_argv(&form.schema().program, &argv, args.output)?);
    Ok(())
}

fn run_run(args: RunArgs) -> Result<(), String> {
    let source = load_definition(&args.definition)?;
    let config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .map_err(|err| format!("'{}': {err}", path.display()))?,
        None => SessionConfig::default(),
    };
    let program = source.command().get_name().to_string();

    let mut toolkit = DialoguerToolkit::new(config.title.clone());
    let outcome = run_form(&source, &mut toolkit, &config, &args.args).map_err(|err| match err {
        SessionError::Parse(err) => {
            format!("parser rejected the arguments: {}", parser_message(&err))
        }
        other => other.to_string(),
    })?;

    match outcome {
        SessionOutcome::Committed { argv, .. } | SessionOutcome::Bypassed { argv, .. } => {
            println!("{}", format_argv(&program, &argv, args.output)?);
            Ok(())
        }
        SessionOutcome::Cancelled => {
            eprintln!("Form cancelled.");
            std::process::exit(EXIT_CANCELLED);
        }
    }
}

fn format_argv(program: &str, argv: &[String], format: ArgvFormat) -> Result<String, String> {
    match format {
        ArgvFormat::Json => {
            serde_json::to_string(argv).map_err(|e| format!("JSON serialization failed: {e}"))
        }
        ArgvFormat::Lines => Ok(argv.join("\n")),
        ArgvFormat::Shell => {
            let words = std::iter::once(program).chain(argv.iter().map(String::as_str));
            shlex::try_join(words).map_err(|e| format!("cannot quote arguments: {e}"))
        }
    }
}

/// First paragraph of a clap error, without the `error:` prefix.
fn parser_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let summary: Vec<&str> = rendered
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect();
    summary.join(" ").trim_start_matches("error: ").to_string()
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_argv_json_and_lines() {
        let argv = tokens(&["--seed", "3"]);
        assert_eq!(
            format_argv("graph", &argv, ArgvFormat::Json).unwrap(),
            r#"["--seed","3"]"#
        );
        assert_eq!(format_argv("graph", &argv, ArgvFormat::Lines).unwrap(), "--seed\n3");
    }

    #[test]
    fn test_format_argv_shell_quotes() {
        let argv = tokens(&["--outfile", "my file.txt"]);
        assert_eq!(
            format_argv("graph", &argv, ArgvFormat::Shell).unwrap(),
            "graph --outfile 'my file.txt'"
        );
    }

    #[test]
    fn test_shell_rejects_nul_bytes() {
        let argv = tokens(&["a\0b"]);
        assert!(format_argv("graph", &argv, ArgvFormat::Shell).is_err());
    }

    #[test]
    fn test_parser_message_strips_prefix_and_usage() {
        let err = clap::Command::new("prog")
            .arg(clap::Arg::new("input").required(true))
            .try_get_matches_from(["prog"])
            .unwrap_err();
        let message = parser_message(&err);
        assert!(message.starts_with("the following required arguments were not provided"));
        assert!(!message.contains("Usage"));
    }

    #[test]
    fn test_ensure_newline() {
        assert_eq!(ensure_newline("a".into()), "a\n");
        assert_eq!(ensure_newline("a\n".into()), "a\n");
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
