// crates/novyra-cli/src/main.rs
// ============================================================================
// Module: Novyra Deploy CLI Entry Point
// Description: Command dispatcher for deployment preflight and contract tools.
// Purpose: Check, document, and walk through a deploy from the command line.
// Dependencies: clap, novyra-config, novyra-preflight, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `novyra-deploy` captures the environment (process variables over an
//! optional `.env` file), runs the deployment preflight, renders the contract
//! docs and example file, evaluates the host-header allow-list, and prints the
//! three-step deployment plan. All user-facing labels are routed through the
//! i18n catalog.
//!
//! Security posture: secret values are redacted in every output unless the
//! operator passes `env show --reveal`.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
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
use novyra_cli::i18n::Locale;
use novyra_cli::i18n::set_locale;
use novyra_cli::t;
use novyra_config::DEFAULT_DOTENV_NAME;
use novyra_config::DotenvFile;
use novyra_config::EffectiveHosts;
use novyra_config::EnvSnapshot;
use novyra_config::EnvSource;
use novyra_config::HostListSource;
use novyra_config::ProcessEnv;
use novyra_config::contract_docs_markdown;
use novyra_config::env_example;
use novyra_config::verify_contract_docs;
use novyra_config::write_contract_docs;
use novyra_preflight::DeploymentPlan;
use novyra_preflight::FileAuditSink;
use novyra_preflight::Outcome;
use novyra_preflight::PlanStep;
use novyra_preflight::Preflight;
use novyra_preflight::PreflightOptions;
use novyra_preflight::PreflightReport;
use novyra_preflight::Severity;
use novyra_preflight::StderrAuditSink;
use novyra_preflight::StepStatus;
use novyra_preflight::Target;
use novyra_preflight::VariableRow;
use novyra_preflight::VariableStatus;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "NOVYRA_DEPLOY_LANG";
/// Audit log path that selects the stderr sink.
const AUDIT_STDERR: &str = "-";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "novyra-deploy", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `NOVYRA_DEPLOY_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the deployment preflight.
    Check(CheckCommand),
    /// Environment contract utilities.
    Env {
        /// Selected env subcommand.
        #[command(subcommand)]
        command: EnvCommand,
    },
    /// Host-header allow-list utilities.
    Hosts {
        /// Selected hosts subcommand.
        #[command(subcommand)]
        command: HostsCommand,
    },
    /// Print the three-step deployment plan.
    Plan(PlanCommand),
}

/// Environment capture arguments shared by several commands.
#[derive(Args, Debug, Clone, Default)]
struct EnvArgs {
    /// Dotenv file layered under the process environment (defaults to `.env` when present).
    #[arg(long, value_name = "PATH", conflicts_with = "no_env_file")]
    env_file: Option<PathBuf>,
    /// Ignore dotenv files and read only the process environment.
    #[arg(long, action = ArgAction::SetTrue)]
    no_env_file: bool,
}

/// Arguments for the `check` command.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Environment capture settings.
    #[command(flatten)]
    env: EnvArgs,
    /// Project directory holding the platform manifest.
    #[arg(long, value_name = "DIR")]
    project_dir: Option<PathBuf>,
    /// Deployment target.
    #[arg(long, value_enum, default_value_t = TargetArg::Serverless)]
    target: TargetArg,
    /// Deployed domain (defaults to `VERCEL_URL`).
    #[arg(long, value_name = "DOMAIN")]
    domain: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = ReportFormatArg::Text)]
    format: ReportFormatArg,
    /// Treat warnings as failures.
    #[arg(long, action = ArgAction::SetTrue)]
    deny_warnings: bool,
    /// Verify the assistant key against the API.
    #[arg(long, action = ArgAction::SetTrue)]
    probe_assistant: bool,
    /// Open a TCP connection to the database.
    #[arg(long, action = ArgAction::SetTrue)]
    probe_database: bool,
    /// Append audit events as JSON lines to PATH (`-` for stderr).
    #[arg(long, value_name = "PATH")]
    audit_log: Option<PathBuf>,
}

/// Env subcommands.
#[derive(Subcommand, Debug)]
enum EnvCommand {
    /// Print the captured environment.
    Show(EnvShowCommand),
    /// Print, write, or verify the contract docs.
    Docs(EnvDocsCommand),
    /// Print or write a `.env.example` template.
    Example(EnvExampleCommand),
}

/// Arguments for `env show`.
#[derive(Args, Debug)]
struct EnvShowCommand {
    /// Environment capture settings.
    #[command(flatten)]
    env: EnvArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = SnapshotFormatArg::Dotenv)]
    format: SnapshotFormatArg,
    /// Print secret values in clear text.
    #[arg(long, action = ArgAction::SetTrue)]
    reveal: bool,
}

/// Arguments for `env docs`.
#[derive(Args, Debug)]
struct EnvDocsCommand {
    /// Write the docs to PATH instead of stdout.
    #[arg(long, value_name = "PATH", conflicts_with = "verify")]
    output: Option<PathBuf>,
    /// Fail when the docs at PATH differ from the generated docs.
    #[arg(long, value_name = "PATH")]
    verify: Option<PathBuf>,
}

/// Arguments for `env example`.
#[derive(Args, Debug)]
struct EnvExampleCommand {
    /// Write the template to PATH instead of stdout.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// Hosts subcommands.
#[derive(Subcommand, Debug)]
enum HostsCommand {
    /// Evaluate a Host header against the allow-list.
    Check(HostsCheckCommand),
}

/// Arguments for `hosts check`.
#[derive(Args, Debug)]
struct HostsCheckCommand {
    /// Environment capture settings.
    #[command(flatten)]
    env: EnvArgs,
    /// Host header value, optionally with a port.
    #[arg(value_name = "HOST")]
    host: String,
}

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Environment capture settings.
    #[command(flatten)]
    env: EnvArgs,
    /// Project directory holding the platform manifest.
    #[arg(long, value_name = "DIR", default_value = ".")]
    project_dir: PathBuf,
    /// Deployment target.
    #[arg(long, value_enum, default_value_t = TargetArg::Serverless)]
    target: TargetArg,
    /// Deployed domain (defaults to `VERCEL_URL`).
    #[arg(long, value_name = "DOMAIN")]
    domain: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = ReportFormatArg::Text)]
    format: ReportFormatArg,
}

/// Deployment target selection.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum TargetArg {
    /// Serverless platform.
    Serverless,
    /// Long-running server.
    Server,
}

impl From<TargetArg> for Target {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Serverless => Self::Serverless,
            TargetArg::Server => Self::Server,
        }
    }
}

/// Report output formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ReportFormatArg {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Snapshot output formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum SnapshotFormatArg {
    /// Dotenv lines.
    Dotenv,
    /// Pretty-printed JSON object.
    Json,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
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
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return Ok(usage_exit(&err)),
    };
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

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
        Commands::Check(command) => command_check(command),
        Commands::Env {
            command,
        } => command_env(command),
        Commands::Hosts {
            command,
        } => command_hosts(command),
        Commands::Plan(command) => command_plan(command),
    }
}

/// Prints clap's usage output; help requests succeed and usage errors exit 1.
fn usage_exit(err: &clap::Error) -> ExitCode {
    let rendered = err.render().to_string();
    if err.use_stderr() {
        return emit_error(rendered.trim_end());
    }
    match write_stdout_text(&rendered) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Prints the top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Check Command
// ============================================================================

/// Executes the `check` command.
fn command_check(command: CheckCommand) -> CliResult<ExitCode> {
    let snapshot = load_snapshot(&command.env)?;
    let options = PreflightOptions {
        target: command.target.into(),
        domain: command.domain,
        project_dir: command.project_dir,
        deny_warnings: command.deny_warnings,
        probe_assistant: command.probe_assistant,
        probe_database: command.probe_database,
        ..PreflightOptions::default()
    };
    let report = match command.audit_log.as_deref() {
        None => Preflight::run(&snapshot, &options),
        Some(path) if path == Path::new(AUDIT_STDERR) => {
            Preflight::run_audited(&snapshot, &options, &StderrAuditSink)
        }
        Some(path) => {
            let sink = FileAuditSink::new(path).map_err(|err| {
                CliError::new(t!("audit.open_failed", path = path.display(), error = err))
            })?;
            Preflight::run_audited(&snapshot, &options, &sink)
        }
    };
    match command.format {
        ReportFormatArg::Text => write_lines(&render_report(&report))?,
        ReportFormatArg::Json => write_json(&report)?,
    }
    Ok(exit_code(report.passed()))
}

/// Renders a report as text lines.
fn render_report(report: &PreflightReport) -> Vec<String> {
    let outcome = match report.outcome() {
        Outcome::Pass => t!("check.outcome.pass"),
        Outcome::Fail => t!("check.outcome.fail"),
    };
    let domain = report.domain().map_or_else(|| t!("check.domain.unknown"), str::to_string);
    let mut lines = vec![t!(
        "check.header",
        outcome = outcome,
        target = report.target().label(),
        domain = domain
    )];
    if report.diagnostics().is_empty() {
        lines.push(t!("check.none"));
    }
    for diagnostic in report.diagnostics() {
        let key = diagnostic.key.map_or_else(String::new, |key| format!(" [{key}]"));
        lines.push(t!(
            "check.finding",
            severity = severity_label(diagnostic.severity),
            code = diagnostic.code,
            key = key,
            message = diagnostic.message
        ));
    }
    if report.manifest_present() == Some(false) {
        lines.push(t!("check.manifest.absent"));
    }
    let counts = report.counts();
    lines.push(t!(
        "check.summary",
        errors = counts.errors,
        warnings = counts.warnings,
        infos = counts.infos
    ));
    lines
}

/// Returns the localized severity label.
fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Error => t!("check.severity.error"),
        Severity::Warning => t!("check.severity.warning"),
        Severity::Info => t!("check.severity.info"),
    }
}

// ============================================================================
// SECTION: Env Commands
// ============================================================================

/// Dispatches env subcommands.
fn command_env(command: EnvCommand) -> CliResult<ExitCode> {
    match command {
        EnvCommand::Show(command) => command_env_show(&command),
        EnvCommand::Docs(command) => command_env_docs(&command),
        EnvCommand::Example(command) => command_env_example(&command),
    }
}

/// Executes `env show`.
fn command_env_show(command: &EnvShowCommand) -> CliResult<ExitCode> {
    let snapshot = load_snapshot(&command.env)?;
    let snapshot = if command.reveal {
        write_stderr_line(&t!("env.show.reveal_warning"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        snapshot
    } else {
        snapshot.redacted()
    };
    match command.format {
        SnapshotFormatArg::Dotenv => write_stdout_text(&snapshot.to_dotenv())?,
        SnapshotFormatArg::Json => write_json(&snapshot.to_json())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `env docs`.
fn command_env_docs(command: &EnvDocsCommand) -> CliResult<ExitCode> {
    if let Some(path) = command.verify.as_deref() {
        return match verify_contract_docs(Some(path)) {
            Ok(()) => {
                write_lines(&[t!("docs.verify.ok", path = path.display())])?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => Ok(emit_error(&t!("docs.verify.failed", error = err))),
        };
    }
    if let Some(path) = command.output.as_deref() {
        write_contract_docs(Some(path))
            .map_err(|err| CliError::new(t!("docs.write_failed", error = err)))?;
        write_lines(&[t!("docs.write.ok", path = path.display())])?;
        return Ok(ExitCode::SUCCESS);
    }
    write_stdout_text(&contract_docs_markdown())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `env example`.
fn command_env_example(command: &EnvExampleCommand) -> CliResult<ExitCode> {
    let rendered = env_example();
    if let Some(path) = command.output.as_deref() {
        fs::write(path, rendered).map_err(|err| {
            CliError::new(t!("example.write_failed", path = path.display(), error = err))
        })?;
        write_lines(&[t!("example.write.ok", path = path.display())])?;
        return Ok(ExitCode::SUCCESS);
    }
    write_stdout_text(&rendered)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Hosts Command
// ============================================================================

/// Dispatches hosts subcommands.
fn command_hosts(command: HostsCommand) -> CliResult<ExitCode> {
    match command {
        HostsCommand::Check(command) => command_hosts_check(&command),
    }
}

/// Executes `hosts check`; exits non-zero when the effective list rejects the host.
fn command_hosts_check(command: &HostsCheckCommand) -> CliResult<ExitCode> {
    let snapshot = load_snapshot(&command.env)?;
    let hosts = EffectiveHosts::from_snapshot(&snapshot)
        .map_err(|err| CliError::new(t!("hosts.load_failed", error = err)))?;
    let (lines, allowed) = render_host_verdict(&hosts, &command.host);
    write_lines(&lines)?;
    Ok(exit_code(allowed))
}

/// Renders the host verdict lines and returns whether the host is admitted.
fn render_host_verdict(hosts: &EffectiveHosts, host: &str) -> (Vec<String>, bool) {
    let source = host_source_label(hosts.source);
    let allowed = hosts.allowed.is_allowed(host);
    let mut lines = vec![if allowed {
        t!("hosts.effective.allowed", host = host, source = source)
    } else {
        t!("hosts.effective.rejected", host = host, source = source)
    }];
    if hosts.source != HostListSource::Configured && !hosts.configured.is_empty() {
        lines.push(if hosts.configured.is_allowed(host) {
            t!("hosts.configured.allowed", host = host)
        } else {
            t!("hosts.configured.rejected", host = host)
        });
    }
    lines.push(t!("hosts.list", list = hosts.allowed.to_env_value()));
    (lines, allowed)
}

/// Returns the localized allow-list source label.
fn host_source_label(source: HostListSource) -> String {
    match source {
        HostListSource::Debug => t!("hosts.source.debug"),
        HostListSource::Platform => t!("hosts.source.platform"),
        HostListSource::Empty => t!("hosts.source.empty"),
        HostListSource::Configured => t!("hosts.source.configured"),
    }
}

// ============================================================================
// SECTION: Plan Command
// ============================================================================

/// Executes the `plan` command; exits non-zero while the deploy is blocked.
fn command_plan(command: PlanCommand) -> CliResult<ExitCode> {
    let snapshot = load_snapshot(&command.env)?;
    let options = PreflightOptions {
        target: command.target.into(),
        domain: command.domain,
        project_dir: Some(command.project_dir),
        ..PreflightOptions::default()
    };
    let report = Preflight::run(&snapshot, &options);
    let plan =
        DeploymentPlan::build(&snapshot, &report, report.manifest_present().unwrap_or(false));
    match command.format {
        ReportFormatArg::Text => write_lines(&render_plan(&plan))?,
        ReportFormatArg::Json => write_json(&plan)?,
    }
    Ok(exit_code(report.passed()))
}

/// Renders the plan as text lines.
fn render_plan(plan: &DeploymentPlan) -> Vec<String> {
    let mut lines = vec![t!("plan.header")];
    for step in &plan.steps {
        lines.push(render_step(step));
        if step.id == novyra_preflight::plan::STEP_SET_VARIABLES {
            lines.extend(plan.variables.iter().map(render_variable));
        }
    }
    lines
}

/// Renders one plan step.
fn render_step(step: &PlanStep) -> String {
    let status = match step.status {
        StepStatus::Done => t!("plan.status.done"),
        StepStatus::Pending => t!("plan.status.pending"),
        StepStatus::Ready => t!("plan.status.ready"),
        StepStatus::Blocked => t!("plan.status.blocked"),
    };
    match step.id {
        novyra_preflight::plan::STEP_LINK_REPOSITORY => {
            t!("plan.step.link_repository", status = status)
        }
        novyra_preflight::plan::STEP_SET_VARIABLES => {
            t!("plan.step.set_variables", status = status)
        }
        _ => t!("plan.step.trigger_deploy", status = status),
    }
}

/// Renders one variable row.
fn render_variable(row: &VariableRow) -> String {
    let status = match row.status {
        VariableStatus::Set => t!("plan.variable.set"),
        VariableStatus::Default => t!("plan.variable.default"),
        VariableStatus::Missing => t!("plan.variable.missing"),
        VariableStatus::Unset => t!("plan.variable.unset"),
        VariableStatus::Injected => t!("plan.variable.injected"),
    };
    let secret = if row.secret { t!("plan.variable.secret") } else { String::new() };
    t!("plan.variable", status = status, name = row.name, secret = secret)
}

// ============================================================================
// SECTION: Environment Loading
// ============================================================================

/// Captures the contract from the process environment over the dotenv file.
fn load_snapshot(args: &EnvArgs) -> CliResult<EnvSnapshot> {
    let dotenv = if args.no_env_file {
        None
    } else if let Some(path) = args.env_file.as_deref() {
        let file = DotenvFile::load(path)
            .map_err(|err| CliError::new(t!("env.load_failed", error = err)))?;
        Some(file)
    } else {
        DotenvFile::load_optional(Path::new(DEFAULT_DOTENV_NAME))
            .map_err(|err| CliError::new(t!("env.load_failed", error = err)))?
    };
    let process = ProcessEnv;
    let mut layers: Vec<&dyn EnvSource> = vec![&process];
    if let Some(file) = dotenv.as_ref() {
        layers.push(file);
    }
    EnvSnapshot::capture(&layers).map_err(|err| CliError::new(t!("env.load_failed", error = err)))
}

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Maps a pass/fail flag to the process exit code.
fn exit_code(passed: bool) -> ExitCode {
    if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes each line to stdout.
fn write_lines(lines: &[String]) -> CliResult<()> {
    for line in lines {
        write_stdout_line(line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(())
}

/// Writes text to stdout without adding a newline.
fn write_stdout_text(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes pretty-printed JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
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
