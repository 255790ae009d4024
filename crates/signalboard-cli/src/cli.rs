//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Signalboard - dashboards synthesized from discovered telemetry.
#[derive(Parser, Debug, Clone)]
#[command(name = "signalboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Builder configuration file (JSON).
    #[arg(short, long, env = "SIGNALBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// User API key for the backend.
    #[arg(long, env = "NEW_RELIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Account ID, overriding the one recorded in the snapshot.
    #[arg(long, env = "NEW_RELIC_ACCOUNT_ID")]
    pub account_id: Option<u64>,

    /// Backend region.
    #[arg(long, value_enum, env = "NEW_RELIC_REGION", default_value_t = Region::Us, ignore_case = true)]
    pub region: Region,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Backend data center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Region {
    /// United States.
    #[default]
    Us,
    /// European Union.
    Eu,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Classify metric or attribute names.
    Classify(ClassifyArgs),

    /// Analyze a discovery snapshot without building a dashboard.
    Analyze(AnalyzeArgs),

    /// Build a dashboard from a discovery snapshot.
    Build(BuildArgs),
}

/// Arguments for the classify command.
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Names to classify.
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Treat names as non-numeric (no latency or saturation signal).
    #[arg(long)]
    pub non_numeric: bool,
}

/// Arguments for the analyze command.
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Discovery snapshot (JSON).
    pub snapshot: PathBuf,
}

/// Arguments for the build command.
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Discovery snapshot (JSON).
    pub snapshot: PathBuf,

    /// Where to save the generated definition and analysis.
    #[arg(short, long, default_value = "dashboard.json")]
    pub output: PathBuf,

    /// Dashboard name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Create the dashboard in the backend.
    #[arg(long)]
    pub deploy: bool,

    /// Execute every widget query before saving.
    #[arg(long)]
    pub validate: bool,
}
