//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use signalboard_core::{
    Analysis, Category, CorrelationEdge, DashboardDefinition, DeployedDashboard, GoldenSignal,
    Insight, ValidationReport,
};

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Classification of a single name.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedName {
    /// Name as given.
    pub name: String,
    /// Assigned category.
    pub category: Category,
    /// Golden signals the name feeds.
    pub signals: Vec<GoldenSignal>,
}

/// Classifications for display.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationList {
    /// One entry per input name, in input order.
    pub names: Vec<ClassifiedName>,
}

impl TableDisplay for ClassificationList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{:<48}  {:<12}  SIGNALS", "NAME", "CATEGORY")?;
        writeln!(writer, "{}", "─".repeat(80))?;

        for entry in &self.names {
            let signals = if entry.signals.is_empty() {
                "-".to_string()
            } else {
                entry
                    .signals
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            writeln!(
                writer,
                "{:<48}  {:<12}  {}",
                truncate(&entry.name, 48),
                entry.category.as_str(),
                signals
            )?;
        }
        Ok(())
    }
}

/// Item count of one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    /// Category.
    pub category: Category,
    /// Number of classified items.
    pub count: usize,
}

/// Analysis summary for display.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Account analyzed.
    pub account_id: u64,
    /// Event types in the snapshot.
    pub event_types: usize,
    /// Standalone metrics in the snapshot.
    pub metrics: usize,
    /// Populated categories in presentation order.
    pub categories: Vec<CategoryCount>,
    /// Fully-qualified names per golden signal.
    pub golden_signals: Vec<(GoldenSignal, Vec<String>)>,
    /// Detected correlations.
    pub correlations: Vec<CorrelationEdge>,
    /// Observations about the snapshot.
    pub insights: Vec<Insight>,
}

impl AnalysisReport {
    /// Summarizes an analysis.
    #[must_use]
    pub fn new(analysis: &Analysis, correlations: Vec<CorrelationEdge>, insights: Vec<Insight>) -> Self {
        Self {
            account_id: analysis.account_id.get(),
            event_types: analysis.event_types.len(),
            metrics: analysis.metrics.len(),
            categories: analysis
                .populated_categories()
                .map(|(category, items)| CategoryCount {
                    category,
                    count: items.len(),
                })
                .collect(),
            golden_signals: GoldenSignal::ALL
                .iter()
                .map(|&signal| (signal, analysis.signal(signal).to_vec()))
                .collect(),
            correlations,
            insights,
        }
    }
}

impl TableDisplay for AnalysisReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Analysis of account {}", self.account_id)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Event types:      {}", self.event_types)?;
        writeln!(writer, "Metrics:          {}", self.metrics)?;
        writeln!(writer)?;

        writeln!(writer, "Categories")?;
        if self.categories.is_empty() {
            writeln!(writer, "  (none)")?;
        }
        for entry in &self.categories {
            writeln!(
                writer,
                "  {} {:<22} {:>4}",
                entry.category.icon(),
                entry.category.display_name(),
                entry.count
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "Golden Signals")?;
        for (signal, names) in &self.golden_signals {
            writeln!(writer, "  {:<14} {:>4}", signal.display_name(), names.len())?;
        }

        if !self.correlations.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Correlations")?;
            for edge in &self.correlations {
                writeln!(
                    writer,
                    "  {:<12} {} ↔ {} ({:.1})",
                    edge.kind.to_string(),
                    edge.source,
                    edge.target,
                    edge.confidence
                )?;
            }
        }

        if !self.insights.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Insights")?;
            for insight in &self.insights {
                writeln!(writer, "  [{}] {}", insight.severity, insight.title)?;
                if let Some(recommendation) = &insight.recommendation {
                    writeln!(writer, "      → {recommendation}")?;
                }
            }
        }
        Ok(())
    }
}

/// Widget count of one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    /// Page name.
    pub name: String,
    /// Number of widgets on the page.
    pub widgets: usize,
}

/// Result of the build command.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Dashboard name.
    pub name: String,
    /// Pages in order.
    pub pages: Vec<PageSummary>,
    /// File the definition was saved to.
    pub output: PathBuf,
    /// Query validation outcome, if requested.
    pub validation: Option<ValidationReport>,
    /// Deployed dashboard, if deployment succeeded.
    pub deployed: Option<DeployedDashboard>,
    /// Deployment error, if deployment failed.
    pub deploy_error: Option<String>,
}

impl BuildReport {
    /// Summarizes a saved definition.
    #[must_use]
    pub fn new(definition: &DashboardDefinition, output: PathBuf) -> Self {
        Self {
            name: definition.name.clone(),
            pages: definition
                .pages
                .iter()
                .map(|p| PageSummary {
                    name: p.name.clone(),
                    widgets: p.widgets.len(),
                })
                .collect(),
            output,
            validation: None,
            deployed: None,
            deploy_error: None,
        }
    }
}

impl TableDisplay for BuildReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Dashboard: {}", self.name)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "{:<32}  {:>7}", "PAGE", "WIDGETS")?;
        writeln!(writer, "{}", "─".repeat(41))?;
        for page in &self.pages {
            writeln!(writer, "{:<32}  {:>7}", truncate(&page.name, 32), page.widgets)?;
        }
        writeln!(writer)?;
        writeln!(writer, "Saved to {}", self.output.display())?;

        if let Some(report) = &self.validation {
            writeln!(
                writer,
                "Validated {} queries, {} failed",
                report.checked,
                report.failures.len()
            )?;
            for failure in &report.failures {
                writeln!(writer, "  ✗ {} / {}: {}", failure.page, failure.widget, failure.error)?;
            }
        }

        if let Some(deployed) = &self.deployed {
            writeln!(writer, "Deployed: {}", deployed.url)?;
        }
        if let Some(error) = &self.deploy_error {
            writeln!(writer, "Deployment failed: {error}")?;
            writeln!(writer, "The definition is saved and can be imported manually.")?;
        }
        Ok(())
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalboard_core::{AccountId, Attribute, DashboardBuilder, DiscoverySnapshot, EventType};

    fn analysis() -> Analysis {
        let snapshot = DiscoverySnapshot::new(AccountId(42)).with_event_type(
            EventType::new("SystemSample", 10).with_attribute(Attribute::numeric("cpuPercent")),
        );
        DashboardBuilder::with_defaults().unwrap().analyze(&snapshot)
    }

    mod truncate_tests {
        use super::*;

        #[test]
        fn short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn multibyte_string() {
            assert_eq!(truncate("📈📈📈📈📈", 4), "📈...");
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn analysis_report_table() {
            let report = AnalysisReport::new(&analysis(), Vec::new(), Vec::new());
            let mut buf = Vec::new();
            OutputFormat::default().write(&mut buf, &report).unwrap();
            let text = String::from_utf8(buf).unwrap();

            assert!(text.contains("Analysis of account 42"));
            assert!(text.contains("Utilization Metrics"));
            assert!(text.contains("Saturation"));
        }

        #[test]
        fn analysis_report_json() {
            let report = AnalysisReport::new(&analysis(), Vec::new(), Vec::new());
            let mut buf = Vec::new();
            OutputFormat::new(Format::Json).write(&mut buf, &report).unwrap();
            let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

            assert_eq!(json["account_id"], 42);
            assert_eq!(json["categories"][0]["category"], "utilization");
            assert_eq!(json["categories"][0]["count"], 1);
        }

        #[test]
        fn classification_without_signals_shows_dash() {
            let list = ClassificationList {
                names: vec![ClassifiedName {
                    name: "entity.name".into(),
                    category: Category::Other,
                    signals: Vec::new(),
                }],
            };
            let mut buf = Vec::new();
            list.write_table(&mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.lines().nth(2).unwrap().trim_end().ends_with('-'));
        }
    }
}
