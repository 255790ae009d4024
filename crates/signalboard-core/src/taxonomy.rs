//! Pattern taxonomy and metric classification.
//!
//! A [`Taxonomy`] holds one case-insensitive matcher per [`Category`] and a
//! fixed priority order. Many names legitimately match several patterns
//! (`bytesRejectedPerSecond` is bytes, error and throughput at once), so
//! classification walks the priority list and the first match wins.
//!
//! The taxonomy is an immutable value built once and passed explicitly to
//! everything that classifies, so alternate taxonomies can run side by side.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalboardError};
use crate::types::Category;

/// Priority order of the standard taxonomy.
pub const STANDARD_PRIORITY: [Category; 9] = [
    Category::Error,
    Category::Latency,
    Category::Bytes,
    Category::Replication,
    Category::Utilization,
    Category::Count,
    Category::Throughput,
    Category::Connection,
    Category::Gauge,
];

/// Pattern table of the standard taxonomy, in rule declaration order.
pub const STANDARD_PATTERNS: [(Category, &str); 10] = [
    (
        Category::Throughput,
        r"throughput|rate|persecond|persec|ops|tps|rps|qps|messages|messagesin|messagesout",
    ),
    (
        Category::Latency,
        r"latency|duration|time|delay|response|wait|avgtime|percentile",
    ),
    (
        Category::Error,
        r"error|fail|exception|timeout|reject|invalid|expired",
    ),
    (
        Category::Utilization,
        r"percent|percentage|usage|utilization|ratio|cpu|memory|disk|idle",
    ),
    (
        Category::Count,
        r"count|total|sum|number|size|length|lag|unacked|partition",
    ),
    (
        Category::Gauge,
        r"current|active|open|pending|queue|backlog|state",
    ),
    (
        Category::Bytes,
        r"bytes|size|memory|storage|bandwidth",
    ),
    (
        Category::Connection,
        r"connection|session|socket|client|thread",
    ),
    (
        Category::Replication,
        r"replication|replica|isr|leader|election|unreplicated",
    ),
    (
        Category::Business,
        r"revenue|order|purchase|checkout|conversion|cart|customer|sale",
    ),
];

/// Categories the golden-signal mapper reads patterns from.
const SIGNAL_CATEGORIES: [Category; 4] = [
    Category::Latency,
    Category::Throughput,
    Category::Error,
    Category::Utilization,
];

/// A single category matcher.
#[derive(Debug, Clone)]
pub struct PatternRule {
    category: Category,
    pattern: Regex,
}

impl PatternRule {
    /// Compiles a case-insensitive rule.
    ///
    /// # Errors
    ///
    /// Returns [`SignalboardError::Taxonomy`] if the pattern is not a valid regex.
    pub fn new(category: Category, pattern: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                SignalboardError::taxonomy(format!("pattern for '{category}' is invalid: {e}"))
            })?;
        Ok(Self { category, pattern })
    }

    /// Category this rule assigns.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Source text of the compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Tests the raw name against this rule.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// Overrides applied on top of the standard taxonomy, typically from a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyOverrides {
    /// Replacement patterns keyed by category. Unlisted categories keep their standard pattern.
    #[serde(default)]
    pub patterns: BTreeMap<Category, String>,
    /// Replacement priority order. `None` keeps [`STANDARD_PRIORITY`].
    #[serde(default)]
    pub priority: Option<Vec<Category>>,
}

/// Ordered set of category matchers with a fixed tie-breaking priority.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    rules: Vec<PatternRule>,
    priority: Vec<Category>,
}

impl Taxonomy {
    /// Builds the standard taxonomy.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in pattern table is broken, which is a defect.
    pub fn standard() -> Result<Self> {
        Self::from_patterns(&STANDARD_PATTERNS, &STANDARD_PRIORITY)
    }

    /// Builds the standard taxonomy with the given overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an override pattern is invalid or the resulting
    /// priority list names a category without a rule.
    pub fn with_overrides(overrides: &TaxonomyOverrides) -> Result<Self> {
        let patterns: Vec<(Category, &str)> = STANDARD_PATTERNS
            .iter()
            .map(|&(category, pattern)| {
                let pattern = overrides
                    .patterns
                    .get(&category)
                    .map_or(pattern, String::as_str);
                (category, pattern)
            })
            .chain(
                overrides
                    .patterns
                    .iter()
                    .filter(|(category, _)| {
                        !STANDARD_PATTERNS.iter().any(|(c, _)| c == *category)
                    })
                    .map(|(category, pattern)| (*category, pattern.as_str())),
            )
            .collect();

        let priority = overrides
            .priority
            .as_deref()
            .unwrap_or(&STANDARD_PRIORITY);

        Self::from_patterns(&patterns, priority)
    }

    /// Builds a taxonomy from an explicit pattern table and priority order.
    ///
    /// Categories not listed in `priority` are still evaluated, after the
    /// prioritized ones, in pattern-table order.
    ///
    /// # Errors
    ///
    /// Returns [`SignalboardError::Taxonomy`] when:
    /// - a pattern does not compile
    /// - a category has more than one rule, or `other` has a rule at all
    /// - a priority category has no rule
    /// - one of the categories the golden-signal mapper reads has no rule
    pub fn from_patterns(patterns: &[(Category, &str)], priority: &[Category]) -> Result<Self> {
        let mut rules: Vec<PatternRule> = Vec::with_capacity(patterns.len());

        for &(category, pattern) in patterns {
            if category == Category::Other {
                return Err(SignalboardError::taxonomy(
                    "'other' is the fallback category and cannot have a rule",
                ));
            }
            if rules.iter().any(|r| r.category == category) {
                return Err(SignalboardError::taxonomy(format!(
                    "duplicate rule for '{category}'"
                )));
            }
            rules.push(PatternRule::new(category, pattern)?);
        }

        let taxonomy = Self {
            rules,
            priority: priority.to_vec(),
        };

        for category in taxonomy.priority.iter().chain(SIGNAL_CATEGORIES.iter()) {
            if taxonomy.rule(*category).is_none() {
                return Err(SignalboardError::taxonomy(format!(
                    "no rule defined for '{category}'"
                )));
            }
        }

        Ok(taxonomy)
    }

    /// Returns the rule for a category, if one is defined.
    #[must_use]
    pub fn rule(&self, category: Category) -> Option<&PatternRule> {
        self.rules.iter().find(|r| r.category == category)
    }

    /// Returns all rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Returns the priority order.
    #[must_use]
    pub fn priority(&self) -> &[Category] {
        &self.priority
    }

    /// Tests a name against a single category's pattern.
    ///
    /// Categories without a rule never match.
    #[must_use]
    pub fn matches(&self, category: Category, name: &str) -> bool {
        self.rule(category).is_some_and(|r| r.is_match(name))
    }

    /// Classifies a metric or attribute name into exactly one category.
    ///
    /// Total and deterministic: prioritized rules first, then the remaining
    /// rules in declaration order, then [`Category::Other`].
    #[must_use]
    pub fn classify(&self, name: &str) -> Category {
        if let Some(category) = self
            .priority
            .iter()
            .copied()
            .find(|category| self.matches(*category, name))
        {
            return category;
        }

        self.rules
            .iter()
            .filter(|r| !self.priority.contains(&r.category))
            .find(|r| r.is_match(name))
            .map_or(Category::Other, PatternRule::category)
    }
}
