//! Core types for discovery snapshots and signal classification.
//!
//! This module defines the input catalog handed to the pipeline
//! ([`DiscoverySnapshot`] and its parts) and the two closed vocabularies every
//! discovered signal is sorted into: [`Category`] (exclusive) and
//! [`GoldenSignal`] (non-exclusive).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Numeric account identifier of the telemetry backend.
///
/// Deserializes from either a JSON number or a numeric string, since
/// discovery tooling writes both forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId(pub u64);

impl AccountId {
    /// Returns the raw numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => s
                .parse()
                .map_err(|e| serde::de::Error::custom(format!("invalid account id '{s}': {e}"))),
        }
    }
}

/// Declared value type of an event attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Numeric attribute; the only type eligible for the latency bucket.
    #[serde(alias = "number", alias = "float", alias = "integer")]
    Numeric,
    /// String attribute.
    String,
    /// Boolean attribute.
    Boolean,
    /// Anything the discovery step could not determine.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ValueType {
    /// Returns true for numeric attributes.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }
}

/// A single attribute of an event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, unique within its event type.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    /// Optional sample value observed during discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<serde_json::Value>,
}

impl Attribute {
    /// Creates a new attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            sample: None,
        }
    }

    /// Shorthand for a numeric attribute.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Numeric)
    }

    /// Attaches a sample value.
    #[must_use]
    pub fn with_sample(mut self, sample: serde_json::Value) -> Self {
        self.sample = Some(sample);
        self
    }
}

/// A discovered event type together with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    /// Event type name, unique within a snapshot.
    pub name: String,
    /// Observed event volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    /// Observed event count; older discovery output writes this instead of `volume`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Attributes in discovery order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl EventType {
    /// Creates an event type with the given volume and no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, volume: u64) -> Self {
        Self {
            name: name.into(),
            volume: Some(volume),
            count: None,
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Observed volume, preferring `volume` over `count`, zero when neither is known.
    #[must_use]
    pub fn observed_volume(&self) -> u64 {
        self.volume.or(self.count).unwrap_or(0)
    }
}

/// Declared kind of a standalone metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Dimensional metric.
    Metric,
    /// Point-in-time gauge.
    #[default]
    #[serde(other)]
    Gauge,
}

/// A standalone metric, queried from the `Metric` source by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    /// Metric name, globally unique within a snapshot.
    pub name: String,
    /// Declared kind.
    #[serde(rename = "type", default)]
    pub kind: MetricKind,
    /// Unit hint, if discovery provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl MetricDescriptor {
    /// Creates a metric descriptor without a unit hint.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            kind,
            unit: None,
        }
    }

    /// Sets the unit hint.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// A relationship hint between two event types (e.g. `runs_on`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source event type.
    pub from: String,
    /// Target event type.
    pub to: String,
    /// Relationship kind.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Catalog of event types and metrics available for one account at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySnapshot {
    /// When discovery ran.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Account the snapshot was taken from.
    pub account_id: AccountId,
    /// Event types in discovery order.
    #[serde(default)]
    pub event_types: Vec<EventType>,
    /// Standalone metrics in discovery order.
    #[serde(default)]
    pub metrics: Vec<MetricDescriptor>,
    /// Optional relationship hints.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl DiscoverySnapshot {
    /// Creates an empty snapshot for the given account.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self {
            timestamp: Utc::now(),
            account_id,
            event_types: Vec::new(),
            metrics: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Adds an event type.
    #[must_use]
    pub fn with_event_type(mut self, event_type: EventType) -> Self {
        self.event_types.push(event_type);
        self
    }

    /// Adds a standalone metric.
    #[must_use]
    pub fn with_metric(mut self, metric: MetricDescriptor) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Adds a relationship hint.
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a snapshot.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of attributes across all event types.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.event_types.iter().map(|et| et.attributes.len()).sum()
    }

    /// Returns true when the snapshot holds no event types and no metrics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event_types.is_empty() && self.metrics.is_empty()
    }
}

/// Semantic category of a discovered signal. Every signal maps to exactly one.
///
/// The declaration order is the presentation order used on catalog pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Rates and per-second counters.
    Throughput,
    /// Durations, response and wait times.
    Latency,
    /// Failures, rejections, expirations.
    Error,
    /// Percentages and resource usage.
    Utilization,
    /// Totals, sizes, lags.
    Count,
    /// Current state values.
    Gauge,
    /// Byte volumes and bandwidth.
    Bytes,
    /// Connections, sessions, threads.
    Connection,
    /// Replication and leadership.
    Replication,
    /// Business outcomes.
    Business,
    /// Nothing matched.
    Other,
}

impl Category {
    /// All categories in presentation order.
    pub const ALL: [Self; 11] = [
        Self::Throughput,
        Self::Latency,
        Self::Error,
        Self::Utilization,
        Self::Count,
        Self::Gauge,
        Self::Bytes,
        Self::Connection,
        Self::Replication,
        Self::Business,
        Self::Other,
    ];

    /// Lowercase identifier, as used in serialized output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Throughput => "throughput",
            Self::Latency => "latency",
            Self::Error => "error",
            Self::Utilization => "utilization",
            Self::Count => "count",
            Self::Gauge => "gauge",
            Self::Bytes => "bytes",
            Self::Connection => "connection",
            Self::Replication => "replication",
            Self::Business => "business",
            Self::Other => "other",
        }
    }

    /// Heading used in widget titles, e.g. `"Throughput Metrics"`.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Throughput => "Throughput Metrics",
            Self::Latency => "Latency Metrics",
            Self::Error => "Error Metrics",
            Self::Utilization => "Utilization Metrics",
            Self::Count => "Count Metrics",
            Self::Gauge => "Gauge Metrics",
            Self::Bytes => "Bytes Metrics",
            Self::Connection => "Connection Metrics",
            Self::Replication => "Replication Metrics",
            Self::Business => "Business Metrics",
            Self::Other => "Other Metrics",
        }
    }

    /// Icon prefix for widget titles.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Throughput => "📈",
            Self::Latency => "⏱️",
            Self::Error => "❌",
            Self::Utilization => "🔥",
            Self::Count => "🔢",
            Self::Gauge => "🎯",
            Self::Bytes => "💾",
            Self::Connection => "🔌",
            Self::Replication => "🔄",
            Self::Business => "💼",
            Self::Other => "📊",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four golden signals of service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoldenSignal {
    /// How long requests take.
    Latency,
    /// How much demand the system sees.
    Traffic,
    /// How often requests fail.
    Errors,
    /// How full the system is.
    Saturation,
}

impl GoldenSignal {
    /// All golden signals in presentation order.
    pub const ALL: [Self; 4] = [Self::Latency, Self::Traffic, Self::Errors, Self::Saturation];

    /// Lowercase identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Latency => "latency",
            Self::Traffic => "traffic",
            Self::Errors => "errors",
            Self::Saturation => "saturation",
        }
    }

    /// Heading used in widget titles.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Latency => "Latency",
            Self::Traffic => "Traffic",
            Self::Errors => "Errors",
            Self::Saturation => "Saturation",
        }
    }

    /// Category whose aggregation semantics a signal widget borrows.
    #[must_use]
    pub const fn aggregation_category(&self) -> Category {
        match self {
            Self::Latency => Category::Latency,
            Self::Traffic => Category::Throughput,
            Self::Errors => Category::Error,
            Self::Saturation => Category::Utilization,
        }
    }

    /// Icon prefix for widget titles.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Latency => "⏱️",
            Self::Traffic => "🚦",
            Self::Errors => "🚨",
            Self::Saturation => "🌡️",
        }
    }
}

impl std::fmt::Display for GoldenSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod account_id_tests {
        use super::*;

        #[test]
        fn deserializes_from_number_and_string() {
            let from_number: AccountId = serde_json::from_str("3630072").unwrap();
            let from_string: AccountId = serde_json::from_str("\"3630072\"").unwrap();
            assert_eq!(from_number, AccountId(3_630_072));
            assert_eq!(from_string, from_number);
        }

        #[test]
        fn rejects_non_numeric_string() {
            let result = serde_json::from_str::<AccountId>("\"abc\"");
            assert!(result.is_err());
        }

        #[test]
        fn serializes_as_number() {
            let json = serde_json::to_string(&AccountId(42)).unwrap();
            assert_eq!(json, "42");
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn parses_discovery_output() {
            let json = r#"{
                "timestamp": "2026-01-01T00:00:00Z",
                "accountId": "3630072",
                "eventTypes": [
                    {
                        "name": "KafkaBrokerSample",
                        "count": 126,
                        "volume": 126,
                        "attributes": [
                            { "name": "broker.messagesInPerSecond", "type": "number" },
                            { "name": "entity.name", "type": "string" }
                        ]
                    }
                ],
                "metrics": [
                    { "name": "kafka_consumer_ConsumerLag", "type": "metric", "unit": "count" }
                ],
                "relationships": [
                    { "from": "KafkaBrokerSample", "to": "SystemSample", "type": "runs_on" }
                ]
            }"#;

            let snapshot = DiscoverySnapshot::from_json(json).unwrap();
            assert_eq!(snapshot.account_id, AccountId(3_630_072));
            assert_eq!(snapshot.event_types.len(), 1);
            assert_eq!(snapshot.event_types[0].observed_volume(), 126);
            assert_eq!(
                snapshot.event_types[0].attributes[0].value_type,
                ValueType::Numeric
            );
            assert_eq!(
                snapshot.event_types[0].attributes[1].value_type,
                ValueType::String
            );
            assert_eq!(snapshot.metrics[0].kind, MetricKind::Metric);
            assert_eq!(snapshot.relationships[0].kind, "runs_on");
            assert_eq!(snapshot.attribute_count(), 2);
        }

        #[test]
        fn missing_collections_default_to_empty() {
            let snapshot = DiscoverySnapshot::from_json(r#"{"accountId": 1}"#).unwrap();
            assert!(snapshot.is_empty());
            assert!(snapshot.relationships.is_empty());
        }

        #[test]
        fn unknown_value_types_fall_back() {
            let attr: Attribute =
                serde_json::from_str(r#"{"name": "x", "type": "timestamp"}"#).unwrap();
            assert_eq!(attr.value_type, ValueType::Unknown);

            let attr: Attribute = serde_json::from_str(r#"{"name": "y"}"#).unwrap();
            assert_eq!(attr.value_type, ValueType::Unknown);
        }

        #[test]
        fn volume_prefers_volume_over_count() {
            let mut et = EventType::new("SystemSample", 10);
            et.count = Some(99);
            assert_eq!(et.observed_volume(), 10);

            et.volume = None;
            assert_eq!(et.observed_volume(), 99);

            et.count = None;
            assert_eq!(et.observed_volume(), 0);
        }
    }

    mod category_tests {
        use super::*;

        #[test]
        fn all_is_in_declaration_order() {
            let mut sorted = Category::ALL;
            sorted.sort();
            assert_eq!(sorted, Category::ALL);
        }

        #[test]
        fn display_name_and_serde_agree_with_as_str() {
            for category in Category::ALL {
                let json = serde_json::to_string(&category).unwrap();
                assert_eq!(json, format!("\"{}\"", category.as_str()));
                assert!(category.display_name().ends_with("Metrics"));
            }
        }

        #[test]
        fn golden_signal_aggregation_categories() {
            assert_eq!(
                GoldenSignal::Traffic.aggregation_category(),
                Category::Throughput
            );
            assert_eq!(
                GoldenSignal::Saturation.aggregation_category(),
                Category::Utilization
            );
        }
    }
}
