//! Observations about a discovery snapshot worth surfacing to the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::Analysis;
use crate::correlator::CorrelationEdge;
use crate::types::{Category, GoldenSignal};

/// Uncategorized names listed as evidence before truncating.
const MAX_EVIDENCE: usize = 5;

/// Severity level for insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action required.
    Info,
    /// Worth a look; the dashboard has a gap.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

/// An observation generated from an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Unique identifier for this insight.
    pub id: Uuid,
    /// Severity level.
    pub severity: Severity,
    /// Short title.
    pub title: String,
    /// Detailed description.
    pub description: String,
    /// Names supporting the observation.
    pub evidence: Vec<String>,
    /// Suggested follow-up.
    pub recommendation: Option<String>,
    /// When this insight was generated.
    pub generated_at: DateTime<Utc>,
}

impl Insight {
    /// Creates a new insight.
    #[must_use]
    pub fn new(severity: Severity, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            title: title.into(),
            description: description.into(),
            evidence: Vec::new(),
            recommendation: None,
            generated_at: Utc::now(),
        }
    }

    /// Adds evidence.
    #[must_use]
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    /// Sets the recommendation.
    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// Generates insights, most severe first.
#[must_use]
pub fn generate_insights(analysis: &Analysis, correlations: &[CorrelationEdge]) -> Vec<Insight> {
    let mut insights = Vec::new();

    if analysis.event_types.is_empty() && analysis.metrics.is_empty() {
        insights.push(
            Insight::new(
                Severity::Warning,
                "No telemetry discovered",
                "The snapshot holds no event types and no metrics",
            )
            .with_recommendation("Check that the account is reporting data and rerun discovery"),
        );
        return insights;
    }

    for signal in GoldenSignal::ALL {
        if analysis.signal(signal).is_empty() {
            insights.push(
                Insight::new(
                    Severity::Warning,
                    format!("No {} signal", signal.as_str()),
                    format!(
                        "No discovered attribute or metric maps to the {} golden signal",
                        signal.as_str()
                    ),
                )
                .with_recommendation(format!(
                    "Instrument a {} metric or extend the taxonomy to recognize an existing one",
                    signal.as_str()
                )),
            );
        }
    }

    for event_type in analysis.event_types.iter().filter(|et| et.volume == 0) {
        insights.push(
            Insight::new(
                Severity::Warning,
                format!("{} reported no events", event_type.name),
                "Widgets on this event type will render empty",
            )
            .with_evidence(event_type.name.clone()),
        );
    }

    let other = analysis.items(Category::Other);
    if !other.is_empty() {
        let mut insight = Insight::new(
            Severity::Info,
            format!("{} uncategorized items", other.len()),
            "These names matched no category pattern and only appear in the catalog",
        )
        .with_recommendation("Add taxonomy overrides to classify them");
        for item in other.iter().take(MAX_EVIDENCE) {
            insight = insight.with_evidence(item.qualified_name());
        }
        insights.push(insight);
    }

    for edge in correlations.iter().filter(|e| e.is_strong()) {
        insights.push(
            Insight::new(
                Severity::Info,
                format!("{} correlation", edge.kind),
                format!(
                    "{} and {} usually move together (confidence {:.1})",
                    edge.source, edge.target, edge.confidence
                ),
            )
            .with_evidence(edge.source.clone())
            .with_evidence(edge.target.clone()),
        );
    }

    insights.sort_by(|a, b| b.severity.cmp(&a.severity));
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::correlator::Correlator;
    use crate::taxonomy::Taxonomy;
    use crate::types::{AccountId, Attribute, DiscoverySnapshot, EventType};

    fn analyze(snapshot: &DiscoverySnapshot) -> Analysis {
        Analyzer::new(Taxonomy::standard().unwrap()).analyze(snapshot)
    }

    #[test]
    fn empty_snapshot_yields_single_warning() {
        let analysis = analyze(&DiscoverySnapshot::new(AccountId(1)));
        let insights = generate_insights(&analysis, &[]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Warning);
        assert_eq!(insights[0].title, "No telemetry discovered");
    }

    #[test]
    fn missing_signals_and_quiet_event_types_are_warnings() {
        let snapshot = DiscoverySnapshot::new(AccountId(1)).with_event_type(
            EventType::new("SystemSample", 0).with_attribute(Attribute::numeric("cpuPercent")),
        );
        let insights = generate_insights(&analyze(&snapshot), &[]);
        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();

        assert!(titles.contains(&"No latency signal"));
        assert!(titles.contains(&"No traffic signal"));
        assert!(titles.contains(&"No errors signal"));
        assert!(!titles.contains(&"No saturation signal"));
        assert!(titles.contains(&"SystemSample reported no events"));
    }

    #[test]
    fn uncategorized_and_correlated_items_are_info() {
        let snapshot = DiscoverySnapshot::new(AccountId(1)).with_event_type(
            EventType::new("KafkaBrokerSample", 5)
                .with_attribute(Attribute::numeric("entity.name"))
                .with_attribute(Attribute::numeric("broker.bytesInPerSecond"))
                .with_attribute(Attribute::numeric("broker.bytesOutPerSecond")),
        );
        let analysis = analyze(&snapshot);
        let edges = Correlator::standard().unwrap().detect(&analysis);
        let insights = generate_insights(&analysis, &edges);

        let uncategorized = insights
            .iter()
            .find(|i| i.title == "1 uncategorized items")
            .expect("uncategorized insight");
        assert_eq!(uncategorized.evidence, vec!["KafkaBrokerSample.entity.name"]);

        let correlated = insights
            .iter()
            .find(|i| i.title == "Traffic correlation")
            .expect("correlation insight");
        assert_eq!(correlated.severity, Severity::Info);
        assert_eq!(correlated.evidence.len(), 2);
    }

    #[test]
    fn warnings_sort_before_info() {
        let snapshot = DiscoverySnapshot::new(AccountId(1)).with_event_type(
            EventType::new("Sample", 1).with_attribute(Attribute::numeric("entity.name")),
        );
        let insights = generate_insights(&analyze(&snapshot), &[]);
        let first_info = insights
            .iter()
            .position(|i| i.severity == Severity::Info)
            .unwrap();
        assert!(insights[first_info..].iter().all(|i| i.severity == Severity::Info));
    }
}
