//! Signalboard CLI binary entrypoint.
//!
//! This is the main entry point for the `signalboard` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use signalboard_cli::cli::{Cli, Commands};
use signalboard_cli::commands::{AnalyzeCommand, BuildCommand, ClassifyCommand, load_config};
use signalboard_cli::output::OutputFormat;
use signalboard_core::DashboardBuilder;

const DEFAULT_LOG_FILTER: &str = "signalboard=info";

fn main() -> ExitCode {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), signalboard_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let config = load_config(cli.config.as_deref())?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Classify(args) => {
            let cmd = ClassifyCommand::new(&config)?;
            cmd.execute(&mut stdout, &format, &args).await?;
        }
        Commands::Analyze(args) => {
            let builder = DashboardBuilder::new(config)?;
            let cmd = AnalyzeCommand::new(&builder, cli.account_id);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
        Commands::Build(args) => {
            let builder = DashboardBuilder::new(config)?;
            let cmd = BuildCommand::new(&builder, cli.api_key, cli.account_id, cli.region);
            cmd.execute(&mut stdout, &format, &args).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalboard_cli::cli::{Format, Region};

    #[test]
    fn cli_parses_classify() {
        let cli = Cli::parse_from(["signalboard", "classify", "cpuPercent", "connection.count"]);
        match cli.command {
            Commands::Classify(args) => assert_eq!(args.names.len(), 2),
            _ => panic!("expected classify command"),
        }
    }

    #[test]
    fn cli_parses_build_flags() {
        let cli = Cli::parse_from([
            "signalboard",
            "--format",
            "json",
            "build",
            "kafka.json",
            "--name",
            "Kafka",
            "--deploy",
            "--validate",
        ]);
        assert_eq!(cli.format, Format::Json);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.name.as_deref(), Some("Kafka"));
                assert!(args.deploy);
                assert!(args.validate);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn cli_parses_global_options() {
        let cli = Cli::parse_from([
            "signalboard",
            "--account-id",
            "3630072",
            "--region",
            "eu",
            "analyze",
            "snapshot.json",
        ]);
        assert_eq!(cli.account_id, Some(3_630_072));
        assert_eq!(cli.region, Region::Eu);
        assert!(matches!(cli.command, Commands::Analyze(_)));
    }

    #[test]
    fn cli_default_format_is_table() {
        let cli = Cli::parse_from(["signalboard", "classify", "x"]);
        assert_eq!(cli.format, Format::Table);
    }
}
