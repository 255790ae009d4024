//! Analysis aggregation over a discovery snapshot.
//!
//! The [`Analyzer`] walks every attribute and standalone metric, classifies
//! it, maps it onto golden signals and accumulates the results into an
//! immutable [`Analysis`]. Categorization is name-pattern only; no backend is
//! consulted to check cardinality or freshness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::METRIC_EVENT_TYPE;
use crate::signals::map_signals;
use crate::taxonomy::Taxonomy;
use crate::types::{
    AccountId, Attribute, Category, DiscoverySnapshot, GoldenSignal, MetricKind, Relationship,
    ValueType,
};

/// A classified attribute or metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedItem {
    /// Owning event type, `None` for standalone metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Raw attribute or metric name.
    pub name: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Unit hint, for standalone metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Assigned category.
    pub category: Category,
}

impl ClassifiedItem {
    /// Fully-qualified name: `EventType.attribute`, or the bare metric name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.event_type {
            Some(event_type) => format!("{event_type}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Query source this item is read from.
    #[must_use]
    pub fn source(&self) -> &str {
        self.event_type.as_deref().unwrap_or(METRIC_EVENT_TYPE)
    }

    /// Returns true for standalone metrics.
    #[must_use]
    pub const fn is_metric(&self) -> bool {
        self.event_type.is_none()
    }
}

/// Per-event-type summary, recorded verbatim from the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTypeSummary {
    /// Event type name.
    pub name: String,
    /// Attributes as discovered.
    pub attributes: Vec<Attribute>,
    /// Observed volume.
    pub volume: u64,
}

/// Per-metric summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Metric name.
    pub name: String,
    /// Declared kind.
    pub kind: MetricKind,
    /// Unit hint, inferred from the name when discovery gave none.
    pub unit: String,
    /// Assigned category.
    pub category: Category,
}

/// Result of analyzing one snapshot. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Account the snapshot belongs to.
    pub account_id: AccountId,
    /// Event type summaries in discovery order.
    pub event_types: Vec<EventTypeSummary>,
    /// Standalone metric summaries keyed by name.
    pub metrics: BTreeMap<String, MetricSummary>,
    /// Classified items keyed by category. Only populated categories are present.
    pub categories: BTreeMap<Category, Vec<ClassifiedItem>>,
    /// Fully-qualified names per golden signal. All four buckets are always present.
    pub golden_signals: BTreeMap<GoldenSignal, Vec<String>>,
    /// Relationship hints carried over from the snapshot.
    pub relationships: Vec<Relationship>,
}

impl Analysis {
    /// Looks up an event type summary by name.
    #[must_use]
    pub fn event_type(&self, name: &str) -> Option<&EventTypeSummary> {
        self.event_types.iter().find(|et| et.name == name)
    }

    /// Items of a category, empty when the category is not populated.
    #[must_use]
    pub fn items(&self, category: Category) -> &[ClassifiedItem] {
        self.categories.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Fully-qualified names in a golden-signal bucket.
    #[must_use]
    pub fn signal(&self, signal: GoldenSignal) -> &[String] {
        self.golden_signals.get(&signal).map_or(&[], Vec::as_slice)
    }

    /// Finds a classified item by its fully-qualified name.
    #[must_use]
    pub fn find_item(&self, qualified_name: &str) -> Option<&ClassifiedItem> {
        self.categories
            .values()
            .flatten()
            .find(|item| item.qualified_name() == qualified_name)
    }

    /// Iterates over populated categories with their items, in presentation order.
    pub fn populated_categories(&self) -> impl Iterator<Item = (Category, &[ClassifiedItem])> {
        self.categories
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(category, items)| (*category, items.as_slice()))
    }

    /// Total number of classified items.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Returns true if any event type has observed events.
    #[must_use]
    pub fn has_volume(&self) -> bool {
        self.event_types.iter().any(|et| et.volume > 0)
    }

    /// Populated categories ordered by item count (descending), ties in presentation order.
    ///
    /// `other` is never ranked.
    #[must_use]
    pub fn top_categories(&self, limit: usize) -> Vec<Category> {
        let mut ranked: Vec<(Category, usize)> = self
            .populated_categories()
            .filter(|(category, _)| *category != Category::Other)
            .map(|(category, items)| (category, items.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(limit).map(|(c, _)| c).collect()
    }
}

/// Builds an [`Analysis`] from a snapshot using a taxonomy.
#[derive(Debug, Clone)]
pub struct Analyzer {
    taxonomy: Taxonomy,
}

impl Analyzer {
    /// Creates an analyzer over the given taxonomy.
    #[must_use]
    pub const fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Returns the taxonomy in use.
    #[must_use]
    pub const fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Analyzes a snapshot. Pure and idempotent.
    #[must_use]
    pub fn analyze(&self, snapshot: &DiscoverySnapshot) -> Analysis {
        let mut categories: BTreeMap<Category, Vec<ClassifiedItem>> = BTreeMap::new();
        let mut golden_signals: BTreeMap<GoldenSignal, Vec<String>> = GoldenSignal::ALL
            .iter()
            .map(|signal| (*signal, Vec::new()))
            .collect();

        let mut event_types = Vec::with_capacity(snapshot.event_types.len());
        for event_type in &snapshot.event_types {
            event_types.push(EventTypeSummary {
                name: event_type.name.clone(),
                attributes: event_type.attributes.clone(),
                volume: event_type.observed_volume(),
            });

            for attribute in &event_type.attributes {
                let item = ClassifiedItem {
                    event_type: Some(event_type.name.clone()),
                    name: attribute.name.clone(),
                    value_type: attribute.value_type,
                    unit: None,
                    category: self.taxonomy.classify(&attribute.name),
                };
                self.record(item, &mut categories, &mut golden_signals);
            }
        }

        let mut metrics = BTreeMap::new();
        for metric in &snapshot.metrics {
            let category = self.taxonomy.classify(&metric.name);
            let unit = metric
                .unit
                .clone()
                .unwrap_or_else(|| guess_unit(&metric.name).to_string());

            metrics.insert(
                metric.name.clone(),
                MetricSummary {
                    name: metric.name.clone(),
                    kind: metric.kind,
                    unit: unit.clone(),
                    category,
                },
            );

            let item = ClassifiedItem {
                event_type: None,
                name: metric.name.clone(),
                // Metric values are always numeric.
                value_type: ValueType::Numeric,
                unit: Some(unit),
                category,
            };
            self.record(item, &mut categories, &mut golden_signals);
        }

        let analysis = Analysis {
            account_id: snapshot.account_id,
            event_types,
            metrics,
            categories,
            golden_signals,
            relationships: snapshot.relationships.clone(),
        };

        debug!(
            event_types = analysis.event_types.len(),
            metrics = analysis.metrics.len(),
            categories = analysis.categories.len(),
            items = analysis.total_items(),
            "Snapshot analyzed"
        );

        analysis
    }

    fn record(
        &self,
        item: ClassifiedItem,
        categories: &mut BTreeMap<Category, Vec<ClassifiedItem>>,
        golden_signals: &mut BTreeMap<GoldenSignal, Vec<String>>,
    ) {
        let qualified = item.qualified_name();
        for signal in map_signals(&self.taxonomy, &item.name, item.value_type) {
            golden_signals
                .entry(signal)
                .or_default()
                .push(qualified.clone());
        }
        categories.entry(item.category).or_default().push(item);
    }
}

/// Infers a unit hint from a metric name.
#[must_use]
pub fn guess_unit(metric_name: &str) -> &'static str {
    let name = metric_name.to_lowercase();

    if name.contains("persecond") || name.contains("rate") {
        "per_second"
    } else if name.contains("percent") {
        "percent"
    } else if name.contains("bytes") {
        "bytes"
    } else if name.contains("milliseconds") || name.contains("ms") {
        "milliseconds"
    } else if name.contains("seconds") || name.contains("sec") {
        "seconds"
    } else if name.contains("count") || name.contains("total") || name.contains("lag") {
        "count"
    } else if name.contains("size") {
        "bytes"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventType, MetricDescriptor};
    use proptest::prelude::*;

    fn analyzer() -> Analyzer {
        Analyzer::new(Taxonomy::standard().unwrap())
    }

    fn kafka_snapshot() -> DiscoverySnapshot {
        DiscoverySnapshot::new(AccountId(1))
            .with_event_type(
                EventType::new("KafkaBrokerSample", 126)
                    .with_attribute(Attribute::numeric("broker.messagesInPerSecond"))
                    .with_attribute(Attribute::numeric("request.avgTimeFetch"))
                    .with_attribute(Attribute::numeric("replication.unreplicatedPartitions"))
                    .with_attribute(Attribute::new("entity.name", ValueType::String)),
            )
            .with_event_type(
                EventType::new("SystemSample", 0).with_attribute(Attribute::numeric("cpuPercent")),
            )
            .with_metric(MetricDescriptor::new(
                "newrelic.goldenmetrics.infra.kafkabroker.leaderElectionRate",
                MetricKind::Metric,
            ))
    }

    mod analyze_tests {
        use super::*;

        #[test]
        fn messages_in_is_traffic_throughput() {
            let analysis = analyzer().analyze(&kafka_snapshot());

            let throughput = analysis.items(Category::Throughput);
            assert_eq!(throughput.len(), 1);
            assert_eq!(
                throughput[0].qualified_name(),
                "KafkaBrokerSample.broker.messagesInPerSecond"
            );
            assert!(
                analysis
                    .signal(GoldenSignal::Traffic)
                    .contains(&"KafkaBrokerSample.broker.messagesInPerSecond".to_string())
            );
        }

        #[test]
        fn avg_time_is_latency() {
            let analysis = analyzer().analyze(&kafka_snapshot());
            assert_eq!(analysis.items(Category::Latency).len(), 1);
            assert!(
                analysis
                    .signal(GoldenSignal::Latency)
                    .contains(&"KafkaBrokerSample.request.avgTimeFetch".to_string())
            );
        }

        #[test]
        fn every_item_lands_in_exactly_one_category() {
            let snapshot = kafka_snapshot();
            let analysis = analyzer().analyze(&snapshot);
            let expected = snapshot.attribute_count() + snapshot.metrics.len();
            assert_eq!(analysis.total_items(), expected);
        }

        #[test]
        fn metrics_have_no_owning_event_type() {
            let analysis = analyzer().analyze(&kafka_snapshot());
            let replication = analysis.items(Category::Replication);
            let metric = replication
                .iter()
                .find(|item| item.is_metric())
                .expect("leader election metric");
            assert_eq!(metric.source(), METRIC_EVENT_TYPE);
            assert_eq!(
                metric.qualified_name(),
                "newrelic.goldenmetrics.infra.kafkabroker.leaderElectionRate"
            );
            assert_eq!(metric.unit.as_deref(), Some("per_second"));
        }

        #[test]
        fn event_type_summaries_are_verbatim() {
            let analysis = analyzer().analyze(&kafka_snapshot());
            let summary = analysis.event_type("KafkaBrokerSample").unwrap();
            assert_eq!(summary.volume, 126);
            assert_eq!(summary.attributes.len(), 4);
            assert!(analysis.has_volume());
        }

        #[test]
        fn all_golden_signal_buckets_exist_for_empty_snapshot() {
            let analysis = analyzer().analyze(&DiscoverySnapshot::new(AccountId(1)));
            assert_eq!(analysis.golden_signals.len(), 4);
            assert!(analysis.categories.is_empty());
            assert!(!analysis.has_volume());
        }

        #[test]
        fn find_item_by_qualified_name() {
            let analysis = analyzer().analyze(&kafka_snapshot());
            let item = analysis
                .find_item("SystemSample.cpuPercent")
                .expect("cpu item");
            assert_eq!(item.category, Category::Utilization);
            assert!(analysis.find_item("SystemSample.missing").is_none());
        }

        #[test]
        fn top_categories_excludes_other() {
            let analysis = analyzer().analyze(&kafka_snapshot());
            let top = analysis.top_categories(10);
            assert!(!top.contains(&Category::Other));
            assert!(top.contains(&Category::Replication));
            // Replication holds two items, everything else one.
            assert_eq!(top[0], Category::Replication);
        }
    }

    mod guess_unit_tests {
        use super::*;
        use test_case::test_case;

        #[test_case("incomingMessagesPerSecond", "per_second")]
        #[test_case("cpuPercent", "percent")]
        #[test_case("bytesIn", "bytes")]
        #[test_case("request.durationMs", "milliseconds")]
        #[test_case("uptimeSeconds", "seconds")]
        #[test_case("kafka_consumer_ConsumerLag", "count")]
        #[test_case("entity.name", "unknown")]
        fn guesses(name: &str, expected: &str) {
            assert_eq!(guess_unit(name), expected);
        }
    }

    proptest! {
        #[test]
        fn prop_analyze_is_idempotent(
            names in proptest::collection::vec("[a-zA-Z.]{1,24}", 0..12),
            metrics in proptest::collection::vec("[a-zA-Z._]{1,24}", 0..6),
        ) {
            let mut event_type = EventType::new("Sample", 5);
            for name in &names {
                event_type = event_type.with_attribute(Attribute::numeric(name.clone()));
            }
            let mut snapshot = DiscoverySnapshot::new(AccountId(7)).with_event_type(event_type);
            for metric in &metrics {
                snapshot = snapshot.with_metric(MetricDescriptor::new(metric.clone(), MetricKind::Gauge));
            }

            let a = analyzer();
            let first = a.analyze(&snapshot);
            let second = a.analyze(&snapshot);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.total_items(), names.len() + metrics.len());
        }

        #[test]
        fn prop_golden_signal_names_exist_in_snapshot(
            names in proptest::collection::vec("[a-zA-Z.]{1,24}", 0..12),
        ) {
            let mut event_type = EventType::new("Sample", 5);
            for name in &names {
                event_type = event_type.with_attribute(Attribute::numeric(name.clone()));
            }
            let snapshot = DiscoverySnapshot::new(AccountId(7)).with_event_type(event_type);
            let analysis = analyzer().analyze(&snapshot);

            for qualified in analysis.golden_signals.values().flatten() {
                prop_assert!(analysis.find_item(qualified).is_some());
            }
        }
    }
}
