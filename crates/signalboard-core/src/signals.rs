//! Golden-signal mapping.
//!
//! Maps a signal name onto zero or more golden-signal buckets with
//! independent tests. This is related to, but kept separate from,
//! [`Taxonomy::classify`]: a name classified as `bytes` can still land in the
//! saturation bucket because it also matches the utilization pattern.

use std::collections::BTreeSet;

use crate::taxonomy::Taxonomy;
use crate::types::{Category, GoldenSignal, ValueType};

/// Set of golden-signal buckets a single name belongs to.
pub type SignalSet = BTreeSet<GoldenSignal>;

/// Maps a name and its declared type onto golden-signal buckets.
///
/// - latency: latency pattern and a numeric type
/// - traffic: throughput pattern, or the name mentions "request" or "message"
/// - errors: error pattern
/// - saturation: utilization pattern, or the name mentions "queue" or "pending"
#[must_use]
pub fn map_signals(taxonomy: &Taxonomy, name: &str, value_type: ValueType) -> SignalSet {
    let lower = name.to_lowercase();
    let mut signals = SignalSet::new();

    if taxonomy.matches(Category::Latency, &lower) && value_type.is_numeric() {
        signals.insert(GoldenSignal::Latency);
    }

    if taxonomy.matches(Category::Throughput, &lower)
        || lower.contains("request")
        || lower.contains("message")
    {
        signals.insert(GoldenSignal::Traffic);
    }

    if taxonomy.matches(Category::Error, &lower) {
        signals.insert(GoldenSignal::Errors);
    }

    if taxonomy.matches(Category::Utilization, &lower)
        || lower.contains("queue")
        || lower.contains("pending")
    {
        signals.insert(GoldenSignal::Saturation);
    }

    signals
}
