//! Visualization kinds and the per-category preference matrix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Category;

/// Chart kind of a widget. Serialized as `{"id": "viz.<kind>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visualization {
    /// Line chart.
    Line,
    /// Stacked area chart.
    Area,
    /// Single-value billboard.
    Billboard,
    /// Histogram.
    Histogram,
    /// Heatmap.
    Heatmap,
    /// Bar chart.
    Bar,
    /// Gauge.
    Gauge,
    /// Table.
    Table,
    /// Pie chart.
    Pie,
    /// Funnel.
    Funnel,
    /// Markdown text.
    Markdown,
}

impl Visualization {
    /// Short kind name, e.g. `"line"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Area => "area",
            Self::Billboard => "billboard",
            Self::Histogram => "histogram",
            Self::Heatmap => "heatmap",
            Self::Bar => "bar",
            Self::Gauge => "gauge",
            Self::Table => "table",
            Self::Pie => "pie",
            Self::Funnel => "funnel",
            Self::Markdown => "markdown",
        }
    }

    /// Visualization identifier understood by the dashboard API, e.g. `"viz.line"`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("viz.{}", self.kind())
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl FromStr for Visualization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = s.strip_prefix("viz.").unwrap_or(s);
        match kind {
            "line" => Ok(Self::Line),
            "area" => Ok(Self::Area),
            "billboard" => Ok(Self::Billboard),
            "histogram" => Ok(Self::Histogram),
            "heatmap" => Ok(Self::Heatmap),
            "bar" => Ok(Self::Bar),
            "gauge" => Ok(Self::Gauge),
            "table" => Ok(Self::Table),
            "pie" => Ok(Self::Pie),
            "funnel" => Ok(Self::Funnel),
            "markdown" => Ok(Self::Markdown),
            other => Err(format!("unknown visualization '{other}'")),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct VisualizationRef {
    id: String,
}

impl Serialize for Visualization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        VisualizationRef { id: self.id() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Visualization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = VisualizationRef::deserialize(deserializer)?;
        raw.id.parse().map_err(serde::de::Error::custom)
    }
}

/// Ranked visualization choices for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualizationPreference {
    /// First choice, used unless a page overrides it.
    pub primary: Visualization,
    /// Second choice.
    pub secondary: Visualization,
    /// Third choice.
    pub tertiary: Visualization,
}

impl VisualizationPreference {
    const fn new(primary: Visualization, secondary: Visualization, tertiary: Visualization) -> Self {
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    /// Preference for a category.
    #[must_use]
    pub const fn for_category(category: Category) -> Self {
        use Visualization::{
            Area, Bar, Billboard, Funnel, Gauge, Heatmap, Histogram, Line, Pie, Table,
        };

        match category {
            Category::Throughput => Self::new(Line, Area, Billboard),
            Category::Latency => Self::new(Line, Histogram, Heatmap),
            Category::Error => Self::new(Line, Bar, Billboard),
            Category::Utilization => Self::new(Line, Gauge, Billboard),
            Category::Count => Self::new(Billboard, Bar, Table),
            Category::Gauge => Self::new(Billboard, Gauge, Line),
            Category::Bytes => Self::new(Area, Line, Billboard),
            Category::Connection => Self::new(Line, Area, Table),
            Category::Replication => Self::new(Line, Billboard, Table),
            Category::Business => Self::new(Billboard, Pie, Funnel),
            Category::Other => Self::new(Line, Billboard, Table),
        }
    }

    /// Choices in rank order.
    #[must_use]
    pub const fn ranked(&self) -> [Visualization; 3] {
        [self.primary, self.secondary, self.tertiary]
    }
}
