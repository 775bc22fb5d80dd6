//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Educational CRISPR gene-editing simulator.
#[derive(Parser, Debug)]
#[command(name = "crispr-lab", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CRISPR_LAB_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true, env = "CRISPR_LAB_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    /// Serve Prometheus metrics on 127.0.0.1:<PORT>.
    #[arg(long, global = true, env = "CRISPR_LAB_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the trait catalog or show one trait.
    Traits(TraitsArgs),

    /// Run a scripted edit session.
    Run(RunArgs),

    /// Show the quiz or score a set of answers.
    Quiz(QuizArgs),

    /// Validate lab configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `traits`.
#[derive(Args, Debug)]
pub struct TraitsArgs {
    /// Show a single trait.
    #[arg(long)]
    pub id: Option<String>,

    /// Lab configuration file.
    #[arg(short, long, env = "CRISPR_LAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Trait to edit.
    #[arg(long = "trait", value_name = "ID")]
    pub trait_id: String,

    /// Page through the mechanism explainer before editing.
    #[arg(long)]
    pub mechanism: bool,

    /// Answer to give if the risk gate holds the edit back.
    #[arg(long, default_value = "abort")]
    pub on_risk: RiskChoice,

    /// Seed for the marker generator.
    #[arg(long, env = "CRISPR_LAB_SEED")]
    pub seed: Option<u64>,

    /// Tick cadence in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: Option<u64>,

    /// Run the simulated timeline without real-time pacing.
    #[arg(long)]
    pub fast: bool,

    /// Write JSONL session events to this file.
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Lab configuration file.
    #[arg(short, long, env = "CRISPR_LAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `quiz`.
#[derive(Args, Debug)]
pub struct QuizArgs {
    /// Answer indices in question order, comma separated (e.g. 1,1,2,2,1).
    #[arg(long, value_delimiter = ',')]
    pub answers: Option<Vec<usize>>,

    /// Lab configuration file.
    #[arg(short, long, env = "CRISPR_LAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell.
    pub shell: Shell,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Scripted answer to the risk prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RiskChoice {
    /// Go ahead with the edit.
    Proceed,
    /// Return to analysis and stop.
    Redesign,
    /// Stop with a non-zero exit code.
    #[default]
    Abort,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
