//! Naming-heuristic correlation detection.
//!
//! Correlations are inferred purely from names: two items in the same
//! category are paired when one matches the first pattern of a rule and the
//! other matches the second. No time series are read and no covariance is
//! computed, so every edge carries the fixed confidence of its rule.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::analysis::{Analysis, ClassifiedItem};
use crate::error::{Result, SignalboardError};

/// Confidence assigned to every standard rule.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Threshold above which an edge counts as strong.
pub const STRONG_THRESHOLD: f64 = 0.7;

/// Standard rule table: (first pattern, second pattern, kind).
const STANDARD_RULES: [(&str, &str, CorrelationKind); 5] = [
    (r"request.*rate", r"error.*rate", CorrelationKind::ErrorRate),
    (r"cpu.*percent", r"memory.*percent", CorrelationKind::Resource),
    (
        r"throughput|messagesInPerSecond",
        r"latency|avgTime",
        CorrelationKind::Performance,
    ),
    (r"bytesIn", r"bytesOut", CorrelationKind::Traffic),
    (r"Failed", r"Expired", CorrelationKind::Errors),
];

/// Type tag of a correlation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    /// Request rate against error rate.
    ErrorRate,
    /// CPU against memory pressure.
    Resource,
    /// Throughput against latency.
    Performance,
    /// Inbound against outbound bytes.
    Traffic,
    /// Failures against expirations.
    Errors,
}

impl CorrelationKind {
    /// Snake-case tag as serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ErrorRate => "error_rate",
            Self::Resource => "resource",
            Self::Performance => "performance",
            Self::Traffic => "traffic",
            Self::Errors => "errors",
        }
    }
}

impl fmt::Display for CorrelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErrorRate => write!(f, "Error Rate"),
            Self::Resource => write!(f, "Resource"),
            Self::Performance => write!(f, "Performance"),
            Self::Traffic => write!(f, "Traffic"),
            Self::Errors => write!(f, "Errors"),
        }
    }
}

/// A directional pattern pair.
#[derive(Debug, Clone)]
pub struct CorrelationRule {
    first: Regex,
    second: Regex,
    kind: CorrelationKind,
    confidence: f64,
}

impl CorrelationRule {
    /// Compiles a case-insensitive rule with the default confidence.
    ///
    /// # Errors
    ///
    /// Returns [`SignalboardError::Config`] if either pattern is not a valid regex.
    pub fn new(first: &str, second: &str, kind: CorrelationKind) -> Result<Self> {
        Ok(Self {
            first: compile(first, kind)?,
            second: compile(second, kind)?,
            kind,
            confidence: DEFAULT_CONFIDENCE,
        })
    }

    /// Overrides the confidence, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Kind emitted by this rule.
    #[must_use]
    pub const fn kind(&self) -> CorrelationKind {
        self.kind
    }

    /// Confidence emitted by this rule.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Tests an ordered pair of raw names.
    #[must_use]
    pub fn matches(&self, a: &str, b: &str) -> bool {
        self.first.is_match(a) && self.second.is_match(b)
    }
}

fn compile(pattern: &str, kind: CorrelationKind) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| SignalboardError::config(format!("correlation pattern for '{kind}': {e}")))
}

/// A weighted, conceptually undirected correlation between two items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEdge {
    /// Fully-qualified name matching the rule's first pattern.
    pub source: String,
    /// Fully-qualified name matching the rule's second pattern.
    pub target: String,
    /// Type tag.
    pub kind: CorrelationKind,
    /// Fixed heuristic confidence in `[0, 1]`.
    pub confidence: f64,
}

impl CorrelationEdge {
    /// Returns true if this is a strong correlation (>= 0.7).
    #[must_use]
    pub fn is_strong(&self) -> bool {
        self.confidence >= STRONG_THRESHOLD
    }

    /// Returns true if the edge connects the two names, in either direction.
    #[must_use]
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Scans an [`Analysis`] for correlated pairs.
#[derive(Debug, Clone)]
pub struct Correlator {
    rules: Vec<CorrelationRule>,
}

impl Correlator {
    /// Creates a correlator with the standard rule table.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in rule table is broken, which is a defect.
    pub fn standard() -> Result<Self> {
        let rules = STANDARD_RULES
            .iter()
            .map(|&(first, second, kind)| CorrelationRule::new(first, second, kind))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Creates a correlator with a custom rule table.
    #[must_use]
    pub const fn with_rules(rules: Vec<CorrelationRule>) -> Self {
        Self { rules }
    }

    /// Returns the rule table.
    #[must_use]
    pub fn rules(&self) -> &[CorrelationRule] {
        &self.rules
    }

    /// Detects correlations between items sharing a category.
    ///
    /// Every unordered pair is tested against every rule in both orders; a
    /// pair yields at most one edge per rule.
    #[must_use]
    pub fn detect(&self, analysis: &Analysis) -> Vec<CorrelationEdge> {
        let mut edges = Vec::new();

        for (category, items) in analysis.populated_categories() {
            let before = edges.len();
            for (i, a) in items.iter().enumerate() {
                for b in &items[i + 1..] {
                    self.match_pair(a, b, &mut edges);
                }
            }
            if edges.len() > before {
                debug!(
                    category = %category,
                    edges = edges.len() - before,
                    "Correlations detected"
                );
            }
        }

        edges
    }

    fn match_pair(&self, a: &ClassifiedItem, b: &ClassifiedItem, edges: &mut Vec<CorrelationEdge>) {
        for rule in &self.rules {
            let oriented = if rule.matches(&a.name, &b.name) {
                Some((a, b))
            } else if rule.matches(&b.name, &a.name) {
                Some((b, a))
            } else {
                None
            };

            if let Some((source, target)) = oriented {
                let edge = CorrelationEdge {
                    source: source.qualified_name(),
                    target: target.qualified_name(),
                    kind: rule.kind,
                    confidence: rule.confidence,
                };
                trace!(
                    source = %edge.source,
                    target = %edge.target,
                    kind = %edge.kind.as_str(),
                    "Correlation matched"
                );
                edges.push(edge);
            }
        }
    }
}

/// Runs the standard correlator over an analysis.
///
/// # Errors
///
/// Only fails if the built-in rule table is broken.
pub fn detect_correlations(analysis: &Analysis) -> Result<Vec<CorrelationEdge>> {
    Ok(Correlator::standard()?.detect(analysis))
}
