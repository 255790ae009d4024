//! Widget synthesis.
//!
//! Renders every planned section into widgets: picks the visualization,
//! builds the query and packs the widget onto the page grid. Each section
//! except headlines starts on a fresh row.

use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::analysis::{Analysis, ClassifiedItem};
use crate::assembler::Page;
use crate::config::BuilderConfig;
use crate::correlator::CorrelationEdge;
use crate::layout::{GridPacker, optimal_width};
use crate::planner::{DashboardPlan, PlannedPage, PlannedSection};
use crate::query::{self, METRIC_EVENT_TYPE, Nrql};
use crate::types::{Category, GoldenSignal};
use crate::visualization::{Visualization, VisualizationPreference};
use crate::widgets::{NrqlQuery, Widget};

/// Height of chart widgets.
pub const CHART_HEIGHT: u32 = 3;

const NARRATIVE_WIDTH: u32 = 4;
const NARRATIVE_HEIGHT: u32 = 3;
const CATALOG_OVERVIEW_HEIGHT: u32 = 2;
const SUMMARY_TABLE_HEIGHT: u32 = 5;
const CORRELATION_WIDTH: u32 = 6;

/// Synthesizes widgets for every planned page.
#[must_use]
pub fn synthesize(plan: &DashboardPlan, analysis: &Analysis, config: &BuilderConfig) -> Vec<Page> {
    let synthesizer = WidgetSynthesizer::new(analysis, config);
    plan.pages
        .iter()
        .map(|page| synthesizer.page(page))
        .collect()
}

/// Renders planned pages against one analysis.
#[derive(Debug, Clone, Copy)]
pub struct WidgetSynthesizer<'a> {
    analysis: &'a Analysis,
    config: &'a BuilderConfig,
}

impl<'a> WidgetSynthesizer<'a> {
    /// Creates a synthesizer.
    #[must_use]
    pub const fn new(analysis: &'a Analysis, config: &'a BuilderConfig) -> Self {
        Self { analysis, config }
    }

    /// Renders one planned page.
    #[must_use]
    pub fn page(&self, planned: &PlannedPage) -> Page {
        let mut page = Page::new(&planned.name, &planned.description);
        let mut packer = GridPacker::new();

        for section in &planned.sections {
            if !matches!(section, PlannedSection::Headline { .. }) {
                packer.break_row();
            }
            self.section(section, &mut packer, &mut page.widgets);
        }

        debug!(
            page = %page.name,
            widgets = page.widgets.len(),
            "Page synthesized"
        );
        page
    }

    fn section(&self, section: &PlannedSection, packer: &mut GridPacker, out: &mut Vec<Widget>) {
        match section {
            PlannedSection::Narrative => {
                let layout = packer.place(NARRATIVE_WIDTH, NARRATIVE_HEIGHT);
                out.push(Widget::markdown(
                    "📊 Dashboard Overview",
                    self.narrative(),
                    layout,
                ));
            }
            PlannedSection::Headline { category } => {
                if let Some(widget) = self.headline(*category, packer) {
                    out.push(widget);
                }
            }
            PlannedSection::Signal { signal } => {
                out.extend(self.signal_widgets(*signal, packer));
            }
            PlannedSection::Category { category }
            | PlannedSection::CatalogCategory { category } => {
                out.extend(self.category_widgets(*category, packer));
            }
            PlannedSection::Correlations { edges } => {
                out.extend(
                    edges
                        .iter()
                        .filter_map(|edge| self.correlation_widget(edge, packer)),
                );
            }
            PlannedSection::CatalogOverview => {
                let layout = packer.place(
                    optimal_width(1, Visualization::Markdown),
                    CATALOG_OVERVIEW_HEIGHT,
                );
                out.push(Widget::markdown(
                    "📚 Complete Metrics Catalog",
                    self.catalog_overview(),
                    layout,
                ));
            }
            PlannedSection::SummaryTable => {
                if let Some(widget) = self.summary_table(packer) {
                    out.push(widget);
                }
            }
        }
    }

    /// One widget per source group and chunk, using the category's primary visualization.
    fn category_widgets(&self, category: Category, packer: &mut GridPacker) -> Vec<Widget> {
        let items: Vec<&ClassifiedItem> = self.analysis.items(category).iter().collect();
        let visualization = VisualizationPreference::for_category(category).primary;
        let heading = format!("{} {}", category.icon(), category.display_name());

        self.grouped_widgets(&heading, category, visualization, &items, packer)
            .into_iter()
            .map(|w| w.with_category(category))
            .collect()
    }

    fn signal_widgets(&self, signal: GoldenSignal, packer: &mut GridPacker) -> Vec<Widget> {
        let items: Vec<&ClassifiedItem> = self
            .analysis
            .signal(signal)
            .iter()
            .filter_map(|name| self.analysis.find_item(name))
            .collect();
        let aggregation = signal.aggregation_category();
        let visualization = VisualizationPreference::for_category(aggregation).primary;
        let heading = format!("{} {}", signal.icon(), signal.display_name());

        self.grouped_widgets(&heading, aggregation, visualization, &items, packer)
    }

    fn headline(&self, category: Category, packer: &mut GridPacker) -> Option<Widget> {
        let items = self.analysis.items(category);
        let source = items.first()?.source();
        let group: Vec<&ClassifiedItem> = items
            .iter()
            .filter(|item| item.source() == source)
            .take(self.config.max_items_per_widget)
            .collect();

        let query = self.group_query(category, source, &group, false);
        let layout = packer.place(
            optimal_width(group.len(), Visualization::Billboard),
            CHART_HEIGHT,
        );

        Some(
            Widget::chart(
                format!("{} {}", category.icon(), category.display_name()),
                Visualization::Billboard,
                layout,
                vec![self.nrql(query)],
            )
            .with_category(category),
        )
    }

    /// Groups items by source in first-seen order and renders one widget per
    /// chunk of at most `max_items_per_widget` items.
    fn grouped_widgets(
        &self,
        heading: &str,
        category: Category,
        visualization: Visualization,
        items: &[&ClassifiedItem],
        packer: &mut GridPacker,
    ) -> Vec<Widget> {
        let mut widgets = Vec::new();
        let cap = self.config.max_items_per_widget.max(1);

        for (source, group) in group_by_source(items) {
            let chunks: Vec<&[&ClassifiedItem]> = group.chunks(cap).collect();
            if chunks.len() > 1 {
                warn!(
                    heading,
                    source,
                    items = group.len(),
                    widgets = chunks.len(),
                    "Widget group split over item cap"
                );
            }

            for (index, chunk) in chunks.iter().enumerate() {
                let title = if chunks.len() > 1 {
                    format!("{heading} - {source} ({}/{})", index + 1, chunks.len())
                } else {
                    format!("{heading} - {source}")
                };

                let query = self.group_query(category, source, chunk, true);
                let layout = packer.place(optimal_width(chunk.len(), visualization), CHART_HEIGHT);
                widgets.push(Widget::chart(
                    title,
                    visualization,
                    layout,
                    vec![self.nrql(query)],
                ));
            }
        }

        widgets
    }

    fn correlation_widget(&self, edge: &CorrelationEdge, packer: &mut GridPacker) -> Option<Widget> {
        let Some(source) = self.analysis.find_item(&edge.source) else {
            debug!(name = %edge.source, "Correlated item not found");
            return None;
        };
        let Some(target) = self.analysis.find_item(&edge.target) else {
            debug!(name = %edge.target, "Correlated item not found");
            return None;
        };

        let pair = [source, target];
        let queries = group_by_source(&pair)
            .into_iter()
            .map(|(group_source, group)| {
                let selects = group
                    .iter()
                    .map(|item| query::aggregation(item.category, &item.name));
                let nrql = sourced(Nrql::select(selects), group_source, &group)
                    .timeseries_auto()
                    .since(&self.config.since);
                self.nrql(nrql)
            })
            .collect();

        let layout = packer.place(CORRELATION_WIDTH, CHART_HEIGHT);
        Some(Widget::chart(
            format!(
                "🔗 {}: {} ↔ {}",
                edge.kind,
                query::format_alias(&source.name),
                query::format_alias(&target.name)
            ),
            Visualization::Line,
            layout,
            queries,
        ))
    }

    fn summary_table(&self, packer: &mut GridPacker) -> Option<Widget> {
        let mut selects = Vec::new();
        let mut query_sources = Vec::new();

        for event_type in &self.analysis.event_types {
            if event_type.attributes.is_empty() {
                continue;
            }
            query_sources.push(event_type.name.as_str());
            selects.extend(
                event_type
                    .attributes
                    .iter()
                    .take(self.config.table_items_per_source)
                    .map(|attr| query::latest(&attr.name)),
            );
        }

        if selects.is_empty() {
            return None;
        }

        let query = query_sources
            .into_iter()
            .fold(Nrql::select(selects), |nrql, source| nrql.source(source))
            .since(&self.config.table_since)
            .limit(self.config.table_limit);

        let layout = packer.place(
            optimal_width(1, Visualization::Table),
            SUMMARY_TABLE_HEIGHT,
        );
        Some(Widget::chart(
            "📊 All Metrics Summary Table",
            Visualization::Table,
            layout,
            vec![self.nrql(query)],
        ))
    }

    fn group_query(
        &self,
        category: Category,
        source: &str,
        items: &[&ClassifiedItem],
        timeseries: bool,
    ) -> Nrql {
        let selects = items
            .iter()
            .map(|item| query::aggregation(category, &item.name));
        let mut nrql = sourced(Nrql::select(selects), source, items);
        if timeseries && query::uses_timeseries(category) {
            nrql = nrql.timeseries_auto();
        }
        nrql.since(&self.config.since)
    }

    fn nrql(&self, query: Nrql) -> NrqlQuery {
        NrqlQuery {
            account_id: self.analysis.account_id,
            query: query.to_string(),
        }
    }

    fn narrative(&self) -> String {
        let analysis = self.analysis;
        let attributes: usize = analysis
            .event_types
            .iter()
            .map(|et| et.attributes.len())
            .sum();

        let mut text = String::from("# Telemetry Overview\n\n**Discovery Summary**\n");
        let _ = writeln!(text, "- Account: {}", analysis.account_id);
        let _ = writeln!(text, "- Event Types: {}", analysis.event_types.len());
        let _ = writeln!(text, "- Attributes: {attributes}");
        let _ = writeln!(text, "- Metrics: {}", analysis.metrics.len());
        let _ = writeln!(
            text,
            "- Categories: {}",
            analysis.populated_categories().count()
        );

        text.push_str("\n**Golden Signals**\n");
        for signal in GoldenSignal::ALL {
            let _ = writeln!(
                text,
                "- {} {}: {}",
                signal.icon(),
                signal.display_name(),
                analysis.signal(signal).len()
            );
        }

        if !analysis.relationships.is_empty() {
            text.push_str("\n**Relationships**\n");
            for rel in &analysis.relationships {
                if rel.kind.is_empty() {
                    let _ = writeln!(text, "- {} → {}", rel.from, rel.to);
                } else {
                    let _ = writeln!(text, "- {} → {} ({})", rel.from, rel.to, rel.kind);
                }
            }
        }

        text
    }

    fn catalog_overview(&self) -> String {
        let analysis = self.analysis;
        let mut text = String::from("# Complete Metrics Catalog\n\n**Discovery Summary**\n");
        let _ = writeln!(text, "- Total Metrics: {}", analysis.total_items());
        let _ = writeln!(text, "- Event Types: {}", analysis.event_types.len());
        let _ = writeln!(
            text,
            "- Categories: {}",
            analysis.populated_categories().count()
        );

        text.push_str("\n**Categorization**\n");
        for (category, items) in analysis.populated_categories() {
            let _ = writeln!(
                text,
                "- **{}**: {} metrics",
                category.display_name(),
                items.len()
            );
        }

        text.push_str(
            "\n**Visualization Types**: each category uses the chart type suited to its metrics.",
        );
        text
    }
}

/// Adds the FROM source, and the metric-name filter when querying standalone metrics.
fn sourced(nrql: Nrql, source: &str, items: &[&ClassifiedItem]) -> Nrql {
    let nrql = nrql.source(source);
    if source == METRIC_EVENT_TYPE {
        nrql.filter(query::metric_name_filter(
            items.iter().map(|item| item.name.as_str()),
        ))
    } else {
        nrql
    }
}

/// Groups items by query source, keeping first-seen order of sources and items.
fn group_by_source<'a>(items: &[&'a ClassifiedItem]) -> Vec<(&'a str, Vec<&'a ClassifiedItem>)> {
    let mut groups: Vec<(&'a str, Vec<&'a ClassifiedItem>)> = Vec::new();
    for &item in items {
        let source = item.source();
        match groups.iter_mut().find(|(s, _)| *s == source) {
            Some((_, group)) => group.push(item),
            None => groups.push((source, vec![item])),
        }
    }
    groups
}
