//! Widget definitions in the dashboard API's JSON shape.

use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::types::{AccountId, Category};
use crate::visualization::Visualization;

/// A query attached to a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NrqlQuery {
    /// Account the query runs against.
    pub account_id: AccountId,
    /// Query text.
    pub query: String,
}

/// Widget payload: markdown text or a list of queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfiguration {
    /// Markdown body of text widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Queries of chart widgets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nrql_queries: Vec<NrqlQuery>,
}

/// A single dashboard widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// Title shown above the widget.
    pub title: String,
    /// Chart kind.
    pub visualization: Visualization,
    /// Grid rectangle.
    pub layout: Layout,
    /// Payload.
    pub raw_configuration: RawConfiguration,
    /// Category the widget charts, when it charts exactly one.
    #[serde(skip)]
    pub category: Option<Category>,
}

impl Widget {
    /// Creates a markdown widget.
    #[must_use]
    pub fn markdown(title: impl Into<String>, text: impl Into<String>, layout: Layout) -> Self {
        Self {
            title: title.into(),
            visualization: Visualization::Markdown,
            layout,
            raw_configuration: RawConfiguration {
                text: Some(text.into()),
                nrql_queries: Vec::new(),
            },
            category: None,
        }
    }

    /// Creates a chart widget with the given queries.
    #[must_use]
    pub fn chart(
        title: impl Into<String>,
        visualization: Visualization,
        layout: Layout,
        queries: Vec<NrqlQuery>,
    ) -> Self {
        Self {
            title: title.into(),
            visualization,
            layout,
            raw_configuration: RawConfiguration {
                text: None,
                nrql_queries: queries,
            },
            category: None,
        }
    }

    /// Tags the widget with the category it charts.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Query texts of this widget.
    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.raw_configuration
            .nrql_queries
            .iter()
            .map(|q| q.query.as_str())
    }
}
