//! Analyze command implementation.

use std::io::Write;

use signalboard_core::{DashboardBuilder, DiscoverySnapshot, generate_insights};

use crate::cli::AnalyzeArgs;
use crate::commands::load_snapshot;
use crate::error::CliError;
use crate::output::{AnalysisReport, OutputFormat};

/// Analyze command executor.
pub struct AnalyzeCommand<'a> {
    builder: &'a DashboardBuilder,
    account_id: Option<u64>,
}

impl<'a> AnalyzeCommand<'a> {
    /// Create a new analyze command.
    #[must_use]
    pub const fn new(builder: &'a DashboardBuilder, account_id: Option<u64>) -> Self {
        Self {
            builder,
            account_id,
        }
    }

    /// Execute the analyze command.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded or output fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &AnalyzeArgs,
    ) -> Result<(), CliError> {
        let snapshot = load_snapshot(&args.snapshot, self.account_id)?;
        let report = self.report(&snapshot);
        format.write(writer, &report)?;
        Ok(())
    }

    /// Analyze a snapshot and summarize the result.
    #[must_use]
    pub fn report(&self, snapshot: &DiscoverySnapshot) -> AnalysisReport {
        let analysis = self.builder.analyze(snapshot);
        let correlations = self.builder.correlate(&analysis);
        let insights = generate_insights(&analysis, &correlations);
        AnalysisReport::new(&analysis, correlations, insights)
    }
}
