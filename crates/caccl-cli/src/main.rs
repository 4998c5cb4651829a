// crates/caccl-cli/src/main.rs
// ============================================================================
// Module: CACCL CLI Entry Point
// Description: Command dispatcher for config resolution and artifact output.
// Purpose: Let operators resolve, validate, and document CACCL configs.
// Dependencies: caccl-config, clap, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! `caccl` loads a partial configuration file, resolves it, and prints the
//! decision trace next to the resolved configuration. It also emits the
//! generated schema, option docs, and example file. Rejected configurations
//! exit with a failure code after printing the trace recorded so far.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use caccl_config::DerivedFlags;
use caccl_config::DiagnosticTrace;
use caccl_config::OptionId;
use caccl_config::OptionView;
use caccl_config::PartialConfig;
use caccl_config::ResolutionKind;
use caccl_config::ResolvedConfig;
use caccl_config::Setting;
use caccl_config::Target;
use caccl_config::ValidationError;
use caccl_config::options_schema;
use caccl_config::partial_toml_example;
use caccl_config::registry;
use caccl_config::resolve;
use caccl_config::verify_options_docs;
use caccl_config::write_options_docs;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CACCL_LOG";
/// Log filter used when [`LOG_ENV`] is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";
/// Default docs location, relative to the working directory.
const DEFAULT_DOCS_PATH: &str = "docs/configuration/options.md";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "caccl",
    about = "Resolve and document CACCL toolkit configurations.",
    disable_version_flag = true
)]
struct Cli {
    /// Print the CLI version and exit.
    #[arg(long = "version", short = 'V', action = ArgAction::SetTrue)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Resolve a partial config and print the decision trace.
    Resolve(ConfigResolveCommand),
    /// Resolve a partial config and print a one-line verdict.
    Validate(ConfigValidateCommand),
    /// Generate or check the option reference docs.
    Docs(ConfigDocsCommand),
    /// Print the JSON schema for partial config files.
    Schema,
    /// Print the canonical example config file.
    Example,
}

/// Arguments for `config resolve`.
#[derive(Args, Debug)]
struct ConfigResolveCommand {
    /// Optional config file path (defaults to caccl.toml or `CACCL_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the target named in the file.
    #[arg(long, value_enum, value_name = "TARGET")]
    target: Option<TargetArg>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to caccl.toml or `CACCL_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the target named in the file.
    #[arg(long, value_enum, value_name = "TARGET")]
    target: Option<TargetArg>,
}

/// Arguments for `config docs`.
#[derive(Args, Debug)]
struct ConfigDocsCommand {
    /// Output path (defaults to docs/configuration/options.md).
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
    /// Verify the existing file instead of writing it.
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,
}

/// Target selector accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TargetArg {
    /// Server-side toolkit instance.
    Server,
    /// Request-only client instance.
    Client,
}

impl From<TargetArg> for Target {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Server => Self::Server,
            TargetArg::Client => Self::Client,
        }
    }
}

/// Output formats for `config resolve`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    /// Aligned text report.
    Text,
    /// JSON document.
    Json,
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// JSON report emitted by `config resolve --format json`.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ResolveReport<'a> {
    /// Resolution succeeded.
    Resolved {
        /// Decisions for every option.
        trace: &'a DiagnosticTrace,
        /// Rendered config with sensitive values redacted.
        config: Value,
        /// Derived enablement flags.
        derived: DerivedFlags,
    },
    /// Resolution was rejected.
    Rejected {
        /// Decisions made before the failing option.
        trace: &'a DiagnosticTrace,
        /// Rejection details.
        error: ErrorReport,
    },
}

/// Machine-readable description of a [`ValidationError`].
#[derive(Serialize)]
struct ErrorReport {
    /// Stable error kind label.
    kind: &'static str,
    /// Options named by the error.
    options: Vec<&'static str>,
    /// Operator-facing message.
    message: String,
}

impl From<&ValidationError> for ErrorReport {
    fn from(error: &ValidationError) -> Self {
        Self {
            kind: error.kind_name(),
            options: error.options().into_iter().map(OptionId::name).collect(),
            message: error.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for operator-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Installs the stderr log subscriber.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("caccl {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Resolve(command) => command_config_resolve(&command),
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Docs(command) => command_config_docs(&command),
        ConfigCommand::Schema => command_config_schema(),
        ConfigCommand::Example => command_config_example(),
    }
}

/// Loads a partial config and applies the target override.
fn load_partial(path: Option<&Path>, target: Option<TargetArg>) -> CliResult<PartialConfig> {
    let mut partial = PartialConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    if let Some(target) = target {
        partial.target = target.into();
    }
    debug!(target_override = target.is_some(), "partial config loaded");
    Ok(partial)
}

/// Executes `config resolve`.
fn command_config_resolve(command: &ConfigResolveCommand) -> CliResult<ExitCode> {
    let partial = load_partial(command.config.as_deref(), command.target)?;
    match (resolve(&partial), command.format) {
        (Ok(resolution), FormatArg::Text) => {
            write_stdout_text(&resolution.trace.render_text())?;
            write_stdout_text(&render_config_text(&resolution.config))?;
            Ok(ExitCode::SUCCESS)
        }
        (Ok(resolution), FormatArg::Json) => {
            write_json(&ResolveReport::Resolved {
                trace: &resolution.trace,
                config: resolution.config.to_json(),
                derived: resolution.config.derived(),
            })?;
            Ok(ExitCode::SUCCESS)
        }
        (Err(failure), FormatArg::Text) => {
            write_stdout_text(&failure.trace.render_text())?;
            write_stderr_line(&format!("configuration rejected: {}", failure.error))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            Ok(ExitCode::FAILURE)
        }
        (Err(failure), FormatArg::Json) => {
            write_json(&ResolveReport::Rejected {
                trace: &failure.trace,
                error: ErrorReport::from(&failure.error),
            })?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes `config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let partial = load_partial(command.config.as_deref(), command.target)?;
    match resolve(&partial) {
        Ok(resolution) => {
            let warnings = resolution.trace.warnings().count();
            write_stdout_line(&format!(
                "config valid: {} target, {warnings} warning(s)",
                partial.target
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            write_stdout_line(&format!("config rejected: {}", failure.error))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes `config docs`.
fn command_config_docs(command: &ConfigDocsCommand) -> CliResult<ExitCode> {
    let path = command.out.as_deref();
    let shown = path.map_or_else(|| DEFAULT_DOCS_PATH.to_string(), |path| path.display().to_string());
    if command.check {
        verify_options_docs(path).map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&format!("option docs up to date: {shown}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else {
        write_options_docs(path).map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&format!("wrote option docs: {shown}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `config schema`.
fn command_config_schema() -> CliResult<ExitCode> {
    write_json(&options_schema())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config example`.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_text(&partial_toml_example())?;
    Ok(ExitCode::SUCCESS)
}

/// Renders the resolved config as `name = value` lines.
///
/// Ignored options are listed separately by name only.
fn render_config_text(config: &ResolvedConfig) -> String {
    let mut active = Vec::new();
    let mut ignored = Vec::new();
    for spec in registry::registry() {
        match config.setting(spec.id) {
            Some(Setting::Active(Some(value))) => {
                active.push(format!("  {} = {}", spec.id, value.render(spec.sensitive)));
            }
            Some(Setting::Active(None)) => active.push(format!("  {} = (unset)", spec.id)),
            Some(Setting::Inapplicable(_)) | None => ignored.push(spec.id.name()),
        }
    }
    let mut out = format!("\nresolved configuration ({} target):\n", config.target());
    for line in active {
        out.push_str(&line);
        out.push('\n');
    }
    if !ignored.is_empty() {
        let _ = writeln!(out, "{}: {}", ResolutionKind::Ignored, ignored.join(", "));
    }
    out
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes preformatted text to stdout without adding a newline.
fn write_stdout_text(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes pretty JSON followed by a newline to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
