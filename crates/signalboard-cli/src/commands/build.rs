//! Build command implementation.
//!
//! Synthesizes a dashboard from a snapshot, saves it next to its analysis,
//! then optionally validates every widget query and deploys. The saved file
//! survives a failed deployment so the definition can be imported by hand.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use signalboard_core::{
    Analysis, BuildOutput, CorrelationEdge, DashboardBuilder, DashboardCollaborator,
    DashboardDefinition, Insight, NullCollaborator, validate_queries,
};
use tracing::{info, warn};

use crate::cli::{BuildArgs, Region};
use crate::client::NerdGraphClient;
use crate::commands::load_snapshot;
use crate::error::CliError;
use crate::output::{BuildReport, OutputFormat};

/// Layout of the saved build file.
#[derive(Debug, Serialize)]
struct SavedBuild<'a> {
    definition: &'a DashboardDefinition,
    analysis: &'a Analysis,
    correlations: &'a [CorrelationEdge],
    insights: &'a [Insight],
}

/// Build command executor.
pub struct BuildCommand<'a> {
    builder: &'a DashboardBuilder,
    api_key: Option<String>,
    account_id: Option<u64>,
    region: Region,
}

impl<'a> BuildCommand<'a> {
    /// Create a new build command.
    #[must_use]
    pub const fn new(
        builder: &'a DashboardBuilder,
        api_key: Option<String>,
        account_id: Option<u64>,
        region: Region,
    ) -> Self {
        Self {
            builder,
            api_key,
            account_id,
            region,
        }
    }

    /// Execute the build command.
    ///
    /// Without an API key, validation runs against the offline collaborator
    /// and deployment is refused.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded, the file cannot be
    /// saved, or deployment was requested without an API key.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &BuildArgs,
    ) -> Result<(), CliError> {
        let report = match &self.api_key {
            Some(key) => {
                let client = NerdGraphClient::new(key.clone(), self.region);
                self.run(args, &client).await?
            }
            None if args.deploy => {
                return Err(CliError::Config(
                    "an API key is required to deploy (set NEW_RELIC_API_KEY)".to_string(),
                ));
            }
            None => {
                if args.validate {
                    warn!("No API key configured, validating against the offline collaborator");
                }
                self.run(args, &NullCollaborator).await?
            }
        };
        format.write(writer, &report)?;
        Ok(())
    }

    /// Build, save, validate and deploy through the given collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded, the pipeline hits
    /// a defect, or the file cannot be saved. Deployment failures are
    /// reported in the returned [`BuildReport`] instead.
    pub async fn run<C: DashboardCollaborator>(
        &self,
        args: &BuildArgs,
        collaborator: &C,
    ) -> Result<BuildReport, CliError> {
        let snapshot = load_snapshot(&args.snapshot, self.account_id)?;
        let output = self
            .builder
            .build_at(&snapshot, args.name.as_deref(), Utc::now())?;

        save(&args.output, &output)?;
        info!(path = %args.output.display(), "Dashboard definition saved");

        let mut report = BuildReport::new(&output.definition, args.output.clone());

        if args.validate {
            report.validation = Some(validate_queries(collaborator, &output.definition).await);
        }

        if args.deploy {
            match self.builder.deploy(collaborator, &output).await {
                Ok(deployed) => report.deployed = Some(deployed),
                Err(e) => {
                    warn!(error = %e, "Deployment failed, keeping saved definition");
                    report.deploy_error = Some(e.to_string());
                }
            }
        }

        Ok(report)
    }
}

fn save(path: &Path, output: &BuildOutput) -> Result<(), CliError> {
    let saved = SavedBuild {
        definition: &output.definition,
        analysis: &output.analysis,
        correlations: &output.correlations,
        insights: &output.insights,
    };
    let json = serde_json::to_string_pretty(&saved)
        .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json)?;
    Ok(())
}
