//! End-to-end pipeline.
//!
//! [`DashboardBuilder`] runs snapshot → analysis → correlations → plan →
//! widgets → definition. Every stage fully consumes its predecessor's output
//! and nothing is shared between runs, so one builder can serve concurrent
//! snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{Analysis, Analyzer};
use crate::assembler::{DashboardDefinition, assemble};
use crate::collaborator::{DashboardCollaborator, DeployedDashboard};
use crate::config::BuilderConfig;
use crate::correlator::{CorrelationEdge, Correlator};
use crate::error::{CollaboratorError, Result};
use crate::insights::{Insight, generate_insights};
use crate::planner::{DashboardPlan, plan};
use crate::synthesizer::synthesize;
use crate::types::DiscoverySnapshot;

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOutput {
    /// Analysis of the snapshot.
    pub analysis: Analysis,
    /// Detected correlations.
    pub correlations: Vec<CorrelationEdge>,
    /// Page plan.
    pub plan: DashboardPlan,
    /// Final dashboard definition.
    pub definition: DashboardDefinition,
    /// Observations about the snapshot.
    pub insights: Vec<Insight>,
}

/// Runs the full synthesis pipeline with one configuration.
#[derive(Debug, Clone)]
pub struct DashboardBuilder {
    config: BuilderConfig,
    analyzer: Analyzer,
    correlator: Correlator,
}

impl DashboardBuilder {
    /// Creates a builder, validating the configuration and compiling its taxonomy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a taxonomy
    /// override does not compile.
    pub fn new(config: BuilderConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = Analyzer::new(config.taxonomy()?);
        let correlator = Correlator::standard()?;
        Ok(Self {
            config,
            analyzer,
            correlator,
        })
    }

    /// Creates a builder with the default configuration.
    ///
    /// # Errors
    ///
    /// Only fails if a built-in table is broken.
    pub fn with_defaults() -> Result<Self> {
        Self::new(BuilderConfig::default())
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Analyzes a snapshot without building a dashboard.
    #[must_use]
    pub fn analyze(&self, snapshot: &DiscoverySnapshot) -> Analysis {
        self.analyzer.analyze(snapshot)
    }

    /// Detects correlations, honoring `enable_correlations`.
    #[must_use]
    pub fn correlate(&self, analysis: &Analysis) -> Vec<CorrelationEdge> {
        if self.config.enable_correlations {
            self.correlator.detect(analysis)
        } else {
            Vec::new()
        }
    }

    /// Builds a dashboard named from the configuration or the current time.
    ///
    /// # Errors
    ///
    /// Returns an error only if an internal invariant is violated.
    pub fn build(&self, snapshot: &DiscoverySnapshot) -> Result<BuildOutput> {
        self.build_at(snapshot, None, Utc::now())
    }

    /// Builds a dashboard with an explicit title and clock.
    ///
    /// # Errors
    ///
    /// Returns an error only if an internal invariant is violated.
    pub fn build_at(
        &self,
        snapshot: &DiscoverySnapshot,
        title: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<BuildOutput> {
        let analysis = self.analyze(snapshot);
        let correlations = self.correlate(&analysis);
        let plan = plan(&analysis, &correlations, &self.config);
        let pages = synthesize(&plan, &analysis, &self.config);
        let definition = assemble(pages, title, now, &self.config)?;
        let insights = generate_insights(&analysis, &correlations);

        info!(
            account = %analysis.account_id,
            items = analysis.total_items(),
            correlations = correlations.len(),
            insights = insights.len(),
            "Dashboard built"
        );

        Ok(BuildOutput {
            analysis,
            correlations,
            plan,
            definition,
            insights,
        })
    }

    /// Hands a built definition to the collaborator for deployment.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error unchanged; the caller decides on fallback.
    pub async fn deploy<C: DashboardCollaborator>(
        &self,
        collaborator: &C,
        output: &BuildOutput,
    ) -> std::result::Result<DeployedDashboard, CollaboratorError> {
        let deployed = collaborator
            .create_dashboard(output.analysis.account_id, &output.definition)
            .await?;
        info!(guid = %deployed.guid, url = %deployed.url, "Dashboard deployed");
        Ok(deployed)
    }
}
