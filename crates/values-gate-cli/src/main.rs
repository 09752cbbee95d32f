// crates/values-gate-cli/src/main.rs
// ============================================================================
// Module: Values Gate CLI Entry Point
// Description: Command dispatcher for values validation and env reference checks.
// Purpose: Provide a safe, localized CLI in front of the rendering pipeline.
// Dependencies: clap, values-gate-config, values-gate-core, serde, thiserror, tracing.
// ============================================================================

//! ## Overview
//! The values gate CLI resolves chart values (defaults, values files, `--set`
//! overrides), validates them against the configured rule set, and checks
//! the environment wiring of rendered workloads. All user-facing strings are
//! routed through the i18n catalog; violation messages are printed verbatim.
//! Security posture: inputs are untrusted and must be validated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use values_gate_cli::logging;
use values_gate_cli::t;
use values_gate_config::GateConfig;
use values_gate_config::RulesSource;
use values_gate_config::ValuesResolver;
use values_gate_config::load_rule_set;
use values_gate_core::Configuration;
use values_gate_core::EnvRefResolver;
use values_gate_core::EnvVar;
use values_gate_core::ReportMode;
use values_gate_core::RuleExplanation;
use values_gate_core::RuleOutcome;
use values_gate_core::RuleSet;
use values_gate_core::ValidationResult;
use values_gate_core::Workload;
use values_gate_core::explain;
use values_gate_core::validate;
use values_gate_core::verify_env;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a container env list input.
const MAX_ENV_LIST_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "values-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate resolved chart values against the rule set.
    Validate(ValidateCommand),
    /// Rule set inspection.
    Rules {
        /// Selected rules subcommand.
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Environment reference utilities.
    Env {
        /// Selected env subcommand.
        #[command(subcommand)]
        command: EnvCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Rules subcommands.
#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// List the compiled rules in reporting order.
    List(RulesListCommand),
}

/// Env subcommands.
#[derive(Subcommand, Debug)]
enum EnvCommand {
    /// Print the expected env references for a workload.
    Refs(EnvRefsCommand),
    /// Compare a rendered container env list with the expected references.
    Verify(EnvVerifyCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the tool configuration.
    Validate(ConfigValidateCommand),
}

/// Arguments shared by every command that resolves values.
#[derive(Args, Debug)]
struct ValuesArgs {
    /// Optional config file path (defaults to values-gate.toml or env override).
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Values file applied after chart defaults (repeatable, in order).
    #[arg(short = 'f', long = "values", value_name = "PATH")]
    values: Vec<PathBuf>,
    /// Override `key=value[,key=value]` (repeatable, applied after files).
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
    /// String-only override (repeatable, applied after `--set`).
    #[arg(long = "set-string", value_name = "KEY=VALUE")]
    set_string: Vec<String>,
    /// Skip chart defaults.
    #[arg(long, action = ArgAction::SetTrue)]
    no_defaults: bool,
}

/// Arguments for values validation.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Values inputs.
    #[command(flatten)]
    values: ValuesArgs,
    /// Rule source (`builtin` or a rule file path), overriding the config.
    #[arg(long, value_name = "PATH")]
    rules: Option<String>,
    /// Report only the first violation.
    #[arg(long, action = ArgAction::SetTrue)]
    fail_fast: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Include a per-rule explanation.
    #[arg(long, action = ArgAction::SetTrue)]
    explain: bool,
}

/// Arguments for rule listing.
#[derive(Args, Debug)]
struct RulesListCommand {
    /// Optional config file path.
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Rule source (`builtin` or a rule file path), overriding the config.
    #[arg(long, value_name = "PATH")]
    rules: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for env reference listing.
#[derive(Args, Debug)]
struct EnvRefsCommand {
    /// Values inputs.
    #[command(flatten)]
    values: ValuesArgs,
    /// Workload whose env wiring is listed.
    #[arg(long, value_enum)]
    workload: WorkloadArg,
    /// Release name, overriding the config.
    #[arg(long, value_name = "NAME")]
    release: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for env verification.
#[derive(Args, Debug)]
struct EnvVerifyCommand {
    /// Values inputs.
    #[command(flatten)]
    values: ValuesArgs,
    /// Workload whose env wiring is checked.
    #[arg(long, value_enum)]
    workload: WorkloadArg,
    /// Release name, overriding the config.
    #[arg(long, value_name = "NAME")]
    release: Option<String>,
    /// Rendered container env list (YAML or JSON).
    #[arg(long, value_name = "PATH")]
    actual: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to values-gate.toml or env override).
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Output formats.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Workloads accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum WorkloadArg {
    /// The keycloak setup job.
    KeycloakSetup,
    /// The platform server.
    Server,
}

impl From<WorkloadArg> for Workload {
    fn from(value: WorkloadArg) -> Self {
        match value {
            WorkloadArg::KeycloakSetup => Self::KeycloakSetup,
            WorkloadArg::Server => Self::Server,
        }
    }
}

/// Container env input: a bare list or a container spec with `env`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnvListInput {
    /// Bare env list.
    List(Vec<EnvVar>),
    /// Container spec carrying an `env` list.
    Container {
        /// Env entries.
        env: Vec<EnvVar>,
    },
}

impl EnvListInput {
    /// Returns the env entries.
    fn into_entries(self) -> Vec<EnvVar> {
        match self {
            Self::List(entries)
            | Self::Container {
                env: entries,
            } => entries,
        }
    }
}

/// JSON report for `validate`.
#[derive(Serialize)]
struct ValidateReport<'a> {
    /// Validation result after applying the report mode.
    result: &'a ValidationResult,
    /// Per-rule explanations when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    explanations: Option<&'a [RuleExplanation]>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
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
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    logging::init().map_err(|err| CliError::new(t!("logging.init_failed", error = err)))?;

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Rules {
            command,
        } => command_rules(&command),
        Commands::Env {
            command,
        } => command_env(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.values.config.as_deref())?;
    let values = resolve_values(&command.values, &config)?;
    let rules = load_rules(&config, command.rules.as_deref())?;
    let mode = if command.fail_fast { ReportMode::FailFast } else { config.validation.report };
    let explanations = command.explain.then(|| explain(&values, &rules));
    let result = apply_report_mode(validate(&values, &rules), mode);

    match command.format {
        OutputFormat::Json => {
            write_json(&ValidateReport {
                result: &result,
                explanations: explanations.as_deref(),
            })?;
            Ok(exit_code(result.is_valid()))
        }
        OutputFormat::Text => {
            if let Some(explanations) = &explanations {
                render_explanations(explanations)?;
            }
            result.into_result(mode).map_err(|err| CliError::new(err.to_string()))?;
            write_stdout_line(&t!("validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Truncates violations to the first one in fail-fast mode.
fn apply_report_mode(result: ValidationResult, mode: ReportMode) -> ValidationResult {
    match (result, mode) {
        (ValidationResult::Invalid(mut violations), ReportMode::FailFast) => {
            violations.truncate(1);
            ValidationResult::Invalid(violations)
        }
        (result, _) => result,
    }
}

/// Writes per-rule explanations as text.
fn render_explanations(explanations: &[RuleExplanation]) -> CliResult<()> {
    let mut output = String::new();
    for explanation in explanations {
        let rule = explanation.rule_id.as_str();
        let line = match &explanation.outcome {
            RuleOutcome::Gated {
                evaluated,
            } => {
                let conditions = evaluated
                    .iter()
                    .map(|(condition, outcome)| format!("{condition} -> {outcome}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                t!("validate.explain.gated", rule = rule, conditions = conditions)
            }
            RuleOutcome::Satisfied => t!("validate.explain.satisfied", rule = rule),
            RuleOutcome::Violated {
                violation,
            } => t!("validate.explain.violated", rule = rule, message = violation.message),
        };
        output.push_str(&line);
        output.push('\n');
    }
    write_stdout_bytes(output.as_bytes()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Rules Commands
// ============================================================================

/// Dispatches rules subcommands.
fn command_rules(command: &RulesCommand) -> CliResult<ExitCode> {
    match command {
        RulesCommand::List(command) => command_rules_list(command),
    }
}

/// Executes the `rules list` command.
fn command_rules_list(command: &RulesListCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let rules = load_rules(&config, command.rules.as_deref())?;
    match command.format {
        OutputFormat::Json => write_json(rules.rules())?,
        OutputFormat::Text => {
            if rules.is_empty() {
                write_stdout_line(&t!("rules.list.empty"))
                    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
                return Ok(ExitCode::SUCCESS);
            }
            let mut output = String::new();
            for rule in &rules {
                output.push_str(&t!(
                    "rules.list.entry",
                    id = rule.id(),
                    key = rule.key(),
                    when = rule.when(),
                    guard = rule.guard()
                ));
                output.push('\n');
            }
            write_stdout_bytes(output.as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Env Commands
// ============================================================================

/// Dispatches env subcommands.
fn command_env(command: &EnvCommand) -> CliResult<ExitCode> {
    match command {
        EnvCommand::Refs(command) => command_env_refs(command),
        EnvCommand::Verify(command) => command_env_verify(command),
    }
}

/// Executes the `env refs` command.
fn command_env_refs(command: &EnvRefsCommand) -> CliResult<ExitCode> {
    let config =
        load_config_with_release(command.values.config.as_deref(), command.release.as_deref())?;
    let values = resolve_values(&command.values, &config)?;
    let expected = EnvRefResolver::new(&values, &config.release.name)
        .expected_env(command.workload.into())
        .map_err(|err| CliError::new(t!("env.resolve_failed", error = err)))?;
    match command.format {
        OutputFormat::Json => write_json(&expected)?,
        OutputFormat::Text => {
            let mut output = String::new();
            for entry in &expected {
                output.push_str(&t!(
                    "env.refs.entry",
                    variable = entry.variable,
                    kind = entry.reference.kind.as_str(),
                    name = entry.reference.name,
                    key = entry.reference.key
                ));
                output.push('\n');
            }
            write_stdout_bytes(output.as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `env verify` command.
fn command_env_verify(command: &EnvVerifyCommand) -> CliResult<ExitCode> {
    let config =
        load_config_with_release(command.values.config.as_deref(), command.release.as_deref())?;
    let values = resolve_values(&command.values, &config)?;
    let workload = Workload::from(command.workload);
    let expected = EnvRefResolver::new(&values, &config.release.name)
        .expected_env(workload)
        .map_err(|err| CliError::new(t!("env.resolve_failed", error = err)))?;
    let actual = read_env_list(&command.actual)?;
    let mismatches = verify_env(&expected, &actual);
    debug!(workload = workload.as_str(), mismatches = mismatches.len(), "env verified");

    match command.format {
        OutputFormat::Json => {
            write_json(&mismatches)?;
            Ok(exit_code(mismatches.is_empty()))
        }
        OutputFormat::Text => {
            if !mismatches.is_empty() {
                let message =
                    mismatches.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
                return Err(CliError::new(message));
            }
            write_stdout_line(&t!("env.verify.ok", workload = workload.as_str()))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Reads a container env list with a size limit.
fn read_env_list(path: &Path) -> CliResult<Vec<EnvVar>> {
    let kind = t!("input.kind.env_list");
    let bytes = read_bytes_with_limit(path, MAX_ENV_LIST_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    let input: EnvListInput = serde_yaml::from_slice(&bytes).map_err(|err| {
        CliError::new(t!("input.parse_failed", kind = kind, path = path.display(), error = err))
    })?;
    Ok(input.into_entries())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = load_config(command.config.as_deref())?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Loads the tool configuration.
fn load_config(path: Option<&Path>) -> CliResult<GateConfig> {
    GateConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Loads the tool configuration and applies a release override.
fn load_config_with_release(path: Option<&Path>, release: Option<&str>) -> CliResult<GateConfig> {
    let mut config = load_config(path)?;
    if let Some(release) = release {
        config.release.name = release.to_string();
        config.validate().map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    }
    Ok(config)
}

/// Resolves values from defaults, files, and overrides.
fn resolve_values(args: &ValuesArgs, config: &GateConfig) -> CliResult<Configuration> {
    let mut resolver = ValuesResolver::new()
        .apply_defaults(config.validation.apply_chart_defaults && !args.no_defaults);
    for path in &args.values {
        resolver = resolver.values_file(path);
    }
    for expression in &args.set {
        resolver = resolver.set(expression.as_str());
    }
    for expression in &args.set_string {
        resolver = resolver.set_string(expression.as_str());
    }
    resolver.resolve().map_err(|err| CliError::new(t!("values.resolve_failed", error = err)))
}

/// Loads the rule set from an override or the configured source.
fn load_rules(config: &GateConfig, rules: Option<&str>) -> CliResult<RuleSet> {
    let source = rules.map_or_else(|| config.validation.rules_source(), RulesSource::parse);
    load_rule_set(&source).map_err(|err| CliError::new(t!("rules.load_failed", error = err)))
}

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Maps a pass/fail flag to an exit code.
fn exit_code(passed: bool) -> ExitCode {
    if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Writes a value as pretty JSON to stdout.
fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
