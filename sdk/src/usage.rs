use crate::UsageRecord;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Operation tag for batched dictionary lookups. Individual lookups are
/// interchangeable, so they are merged during aggregation.
pub const DICTIONARY_LOOKUP: &str = "dictionary_lookup";

/// Decides which operations are fungible for aggregation purposes.
///
/// Records of a fungible operation collapse into one bucket per
/// `(operation, model)` pair; every other operation keeps one bucket per
/// record, because each invocation is a materially distinct unit of work.
/// Any operation not explicitly registered is non-fungible.
#[derive(Debug, Clone)]
pub struct AggregationPolicy {
    fungible: HashSet<String>,
}

impl AggregationPolicy {
    pub fn new<I, S>(fungible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fungible: fungible.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_fungible(&self, operation: &str) -> bool {
        self.fungible.contains(operation)
    }
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self::new([DICTIONARY_LOOKUP])
    }
}

/// Summed usage for one display bucket. Derived and view-owned; recomputed
/// on every aggregation pass, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedUsage {
    pub operation: String,
    pub model: String,
    /// Best-effort display hint taken from the bucket's first record.
    pub display_name: Option<String>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub estimated_cost: f64,
    /// Number of records merged into this bucket.
    pub records: usize,
}

impl AggregatedUsage {
    fn from_record(record: &UsageRecord) -> Self {
        Self {
            operation: record.operation.clone(),
            model: record.model.clone(),
            display_name: display_name(record),
            prompt_tokens: record.prompt_tokens,
            completion_tokens: record.completion_tokens,
            total_tokens: record.total_tokens,
            estimated_cost: record.estimated_cost,
            records: 1,
        }
    }

    /// Fold a further record into the bucket. The display name is set by
    /// the first record only and stays untouched here.
    fn absorb(&mut self, record: &UsageRecord) {
        self.prompt_tokens += record.prompt_tokens;
        self.completion_tokens += record.completion_tokens;
        self.total_tokens += record.total_tokens;
        self.estimated_cost += record.estimated_cost;
        self.records += 1;
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum BucketKey {
    Fungible(String, String),
    Distinct(String),
}

/// Collapse usage records into per-bucket summaries under `policy`.
///
/// Pure and idempotent: no I/O, and identical input yields identical
/// output. Buckets appear in insertion order of their first record.
#[must_use]
pub fn aggregate_usage(records: &[UsageRecord], policy: &AggregationPolicy) -> Vec<AggregatedUsage> {
    let mut buckets: Vec<AggregatedUsage> = Vec::new();
    let mut index: HashMap<BucketKey, usize> = HashMap::new();

    for record in records {
        let key = if policy.is_fungible(&record.operation) {
            BucketKey::Fungible(record.operation.clone(), record.model.clone())
        } else {
            BucketKey::Distinct(record.id.clone())
        };

        if let Some(&slot) = index.get(&key) {
            buckets[slot].absorb(record);
        } else {
            index.insert(key, buckets.len());
            buckets.push(AggregatedUsage::from_record(record));
        }
    }

    buckets
}

/// `agent_name` wins over `agent_role`; empty or non-string values are
/// treated as absent, not as errors.
fn display_name(record: &UsageRecord) -> Option<String> {
    for field in ["agent_name", "agent_role"] {
        if let Some(Value::String(name)) = record.metadata.get(field) {
            if !name.is_empty() {
                return Some(name.clone());
            }
        }
    }
    None
}

/// Grand total across aggregated buckets, for summary rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageTotals {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub estimated_cost: f64,
}

impl UsageTotals {
    #[must_use]
    pub fn from_summaries(summaries: &[AggregatedUsage]) -> Self {
        let mut totals = Self::default();
        for summary in summaries {
            totals.add(summary);
        }
        totals
    }

    pub fn add(&mut self, summary: &AggregatedUsage) {
        self.prompt_tokens += summary.prompt_tokens;
        self.completion_tokens += summary.completion_tokens;
        self.total_tokens += summary.total_tokens;
        self.estimated_cost += summary.estimated_cost;
    }
}
