//! NRQL query synthesis.
//!
//! [`Nrql`] assembles a query from its clauses and renders them in the fixed
//! order `SELECT .. FROM .. [WHERE ..] [FACET ..] [TIMESERIES ..] [SINCE ..]
//! [LIMIT ..]`, separated by single spaces. Aggregation expressions are picked
//! per category by [`aggregation`].

use std::fmt;

use crate::types::Category;

/// Source name standalone metrics are queried from.
pub const METRIC_EVENT_TYPE: &str = "Metric";

/// A query under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nrql {
    select: Vec<String>,
    sources: Vec<String>,
    filter: Option<String>,
    facet: Option<String>,
    timeseries: Option<String>,
    since: Option<String>,
    limit: Option<u32>,
}

impl Nrql {
    /// Starts a query with the given select expressions.
    #[must_use]
    pub fn select<I, S>(expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            select: expressions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds a FROM source. Several sources render comma-separated.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Sets the WHERE condition.
    #[must_use]
    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.filter = Some(condition.into());
        self
    }

    /// Sets the FACET attribute.
    #[must_use]
    pub fn facet(mut self, attribute: impl Into<String>) -> Self {
        self.facet = Some(attribute.into());
        self
    }

    /// Adds `TIMESERIES AUTO`.
    #[must_use]
    pub fn timeseries_auto(mut self) -> Self {
        self.timeseries = Some("AUTO".to_string());
        self
    }

    /// Sets the SINCE window, e.g. `"1 hour ago"`.
    #[must_use]
    pub fn since(mut self, window: impl Into<String>) -> Self {
        self.since = Some(window.into());
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if a TIMESERIES clause is set.
    #[must_use]
    pub const fn is_timeseries(&self) -> bool {
        self.timeseries.is_some()
    }
}

impl fmt::Display for Nrql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {}", self.select.join(", "))?;
        write!(f, " FROM {}", self.sources.join(", "))?;
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {filter}")?;
        }
        if let Some(facet) = &self.facet {
            write!(f, " FACET {facet}")?;
        }
        if let Some(timeseries) = &self.timeseries {
            write!(f, " TIMESERIES {timeseries}")?;
        }
        if let Some(since) = &self.since {
            write!(f, " SINCE {since}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}

/// Returns true if widgets of this category chart over time.
#[must_use]
pub const fn uses_timeseries(category: Category) -> bool {
    matches!(
        category,
        Category::Throughput | Category::Latency | Category::Error | Category::Bytes
    )
}

/// Aggregation expression for one attribute, aliased by [`format_alias`].
///
/// | category | expression |
/// |---|---|
/// | throughput, bytes | `rate(sum(a), 1 minute) as 'Alias/min'` |
/// | latency | `percentile(a, 95) as 'Alias P95'` |
/// | error, count | `sum(a) as 'Alias'` |
/// | gauge | `latest(a) as 'Alias'` |
/// | anything else | `average(a) as 'Alias'` |
#[must_use]
pub fn aggregation(category: Category, attribute: &str) -> String {
    let alias = quote_literal(&format_alias(attribute));
    let attr = quote_identifier(attribute);

    match category {
        Category::Throughput | Category::Bytes => {
            format!("rate(sum({attr}), 1 minute) as '{alias}/min'")
        }
        Category::Latency => format!("percentile({attr}, 95) as '{alias} P95'"),
        Category::Error | Category::Count => format!("sum({attr}) as '{alias}'"),
        Category::Gauge => format!("latest({attr}) as '{alias}'"),
        _ => format!("average({attr}) as '{alias}'"),
    }
}

/// `latest(a) as 'Alias'`, used by summary tables.
#[must_use]
pub fn latest(attribute: &str) -> String {
    format!(
        "latest({}) as '{}'",
        quote_identifier(attribute),
        quote_literal(&format_alias(attribute))
    )
}

/// `metricName IN ('a', 'b')`.
#[must_use]
pub fn metric_name_filter<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = names
        .into_iter()
        .map(|name| format!("'{}'", quote_literal(name)))
        .collect();
    format!("metricName IN ({})", quoted.join(", "))
}

/// Derives a human-readable label from an attribute or metric name.
///
/// Drops everything up to the last `.`, splits camel case, turns `_` and `-`
/// into word breaks and capitalizes each word:
/// `broker.messagesInPerSecond` becomes `Messages In Per Second`.
#[must_use]
pub fn format_alias(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    let segment = if last.trim().is_empty() { name } else { last };

    let mut spaced = String::with_capacity(segment.len() + 8);
    for ch in segment.chars() {
        if ch.is_uppercase() {
            spaced.push(' ');
            spaced.push(ch);
        } else if ch == '_' || ch == '-' {
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }

    spaced
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Backtick-quotes identifiers that are not plain dotted names.
fn quote_identifier(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', ""))
    }
}

fn quote_literal(text: &str) -> String {
    text.replace('\'', "\\'")
}
