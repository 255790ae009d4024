//! Dashboard plan builder.
//!
//! Decides which pages a dashboard gets and which categories, signals and
//! correlations each page covers. A page is only planned when at least one
//! of its sections has content, except the overview (always first) and the
//! metrics catalog (always last).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::Analysis;
use crate::config::BuilderConfig;
use crate::correlator::CorrelationEdge;
use crate::types::{Category, GoldenSignal};

/// Name of the always-present catalog page.
pub const CATALOG_PAGE_NAME: &str = "All Metrics Catalog";

/// Kind of a planned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Narrative summary plus headline widgets.
    Overview,
    /// One section per non-empty golden-signal bucket.
    GoldenSignals,
    /// A themed group of categories.
    Theme,
    /// Detected correlations.
    Correlations,
    /// Every populated category plus a summary table.
    Catalog,
}

/// One unit of content on a planned page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannedSection {
    /// Markdown summary of the analysis.
    Narrative,
    /// Headline widgets for one of the top categories.
    Headline {
        /// Featured category.
        category: Category,
    },
    /// Widgets for one golden-signal bucket.
    Signal {
        /// Bucket to chart.
        signal: GoldenSignal,
    },
    /// Widgets for one category.
    Category {
        /// Category to chart.
        category: Category,
    },
    /// One widget per correlation edge.
    Correlations {
        /// Edges to chart, already truncated to the configured maximum.
        edges: Vec<CorrelationEdge>,
    },
    /// Markdown totals of the catalog.
    CatalogOverview,
    /// Catalog widgets for one category.
    CatalogCategory {
        /// Category to list.
        category: Category,
    },
    /// Full-width summary table of event-type attributes.
    SummaryTable,
}

/// A page of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedPage {
    /// Page kind.
    pub kind: PageKind,
    /// Page name.
    pub name: String,
    /// Page description.
    pub description: String,
    /// Why the page was included.
    pub reason: String,
    /// Sections in rendering order.
    pub sections: Vec<PlannedSection>,
}

impl PlannedPage {
    fn new(kind: PageKind, name: &str, description: &str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.to_string(),
            description: description.to_string(),
            reason: reason.into(),
            sections: Vec::new(),
        }
    }
}

/// Ordered list of planned pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardPlan {
    /// Pages in dashboard order.
    pub pages: Vec<PlannedPage>,
}

impl DashboardPlan {
    /// Looks up a page by name.
    #[must_use]
    pub fn page(&self, name: &str) -> Option<&PlannedPage> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Number of planned pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if nothing was planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Themed pages: (name, description, categories).
const THEMES: [(&str, &str, &[Category]); 3] = [
    (
        "Performance",
        "Throughput and latency of the monitored services",
        &[Category::Throughput, Category::Latency],
    ),
    (
        "Errors & Reliability",
        "Failures, rejections and replication health",
        &[Category::Error, Category::Replication],
    ),
    (
        "Resource Utilization",
        "CPU, memory, bandwidth and connection usage",
        &[Category::Utilization, Category::Bytes, Category::Connection],
    ),
];

/// Builds the dashboard plan.
#[must_use]
pub fn plan(
    analysis: &Analysis,
    correlations: &[CorrelationEdge],
    config: &BuilderConfig,
) -> DashboardPlan {
    let mut pages = vec![overview_page(analysis, config)];

    if let Some(page) = golden_signals_page(analysis) {
        pages.push(page);
    }

    for (name, description, categories) in THEMES {
        let populated: Vec<Category> = categories
            .iter()
            .copied()
            .filter(|c| !analysis.items(*c).is_empty())
            .collect();
        if populated.is_empty() {
            continue;
        }

        let reason = format!(
            "{} populated",
            populated
                .iter()
                .map(Category::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut page = PlannedPage::new(PageKind::Theme, name, description, reason);
        page.sections = populated
            .into_iter()
            .map(|category| PlannedSection::Category { category })
            .collect();
        pages.push(page);
    }

    if !correlations.is_empty() && config.max_correlation_widgets > 0 {
        let edges: Vec<CorrelationEdge> = correlations
            .iter()
            .take(config.max_correlation_widgets)
            .cloned()
            .collect();
        let mut page = PlannedPage::new(
            PageKind::Correlations,
            "Correlations",
            "Metric pairs that usually move together, inferred from their names",
            format!("{} correlations detected", correlations.len()),
        );
        page.sections.push(PlannedSection::Correlations { edges });
        pages.push(page);
    }

    pages.push(catalog_page(analysis));

    for page in &pages {
        debug!(
            page = %page.name,
            sections = page.sections.len(),
            reason = %page.reason,
            "Page planned"
        );
    }

    DashboardPlan { pages }
}

fn overview_page(analysis: &Analysis, config: &BuilderConfig) -> PlannedPage {
    let mut page = PlannedPage::new(
        PageKind::Overview,
        "Overview",
        "Summary of discovered telemetry and its headline metrics",
        "always included",
    );
    page.sections.push(PlannedSection::Narrative);

    if analysis.has_volume() {
        let top = analysis.top_categories(config.max_headline_categories);
        if !top.is_empty() {
            page.reason = format!("always included; {} headline categories", top.len());
        }
        page.sections.extend(
            top.into_iter()
                .map(|category| PlannedSection::Headline { category }),
        );
    }

    page
}

fn golden_signals_page(analysis: &Analysis) -> Option<PlannedPage> {
    let populated: Vec<GoldenSignal> = GoldenSignal::ALL
        .into_iter()
        .filter(|s| !analysis.signal(*s).is_empty())
        .collect();
    if populated.is_empty() {
        return None;
    }

    let mut page = PlannedPage::new(
        PageKind::GoldenSignals,
        "Golden Signals",
        "Latency, traffic, errors and saturation",
        format!("{} of 4 golden signals populated", populated.len()),
    );
    page.sections = populated
        .into_iter()
        .map(|signal| PlannedSection::Signal { signal })
        .collect();
    Some(page)
}

fn catalog_page(analysis: &Analysis) -> PlannedPage {
    let mut page = PlannedPage::new(
        PageKind::Catalog,
        CATALOG_PAGE_NAME,
        "Complete catalog of discovered metrics organized by category",
        "always included",
    );
    page.sections.push(PlannedSection::CatalogOverview);
    page.sections.extend(
        analysis
            .populated_categories()
            .map(|(category, _)| PlannedSection::CatalogCategory { category }),
    );

    let has_event_attributes = analysis
        .event_types
        .iter()
        .any(|et| !et.attributes.is_empty());
    if has_event_attributes {
        page.sections.push(PlannedSection::SummaryTable);
    }

    page
}
