use lingo_sdk::{
    aggregate_usage, AggregationPolicy, UsageRecord, UsageTotals, DICTIONARY_LOOKUP,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn record(id: &str, operation: &str, model: &str, prompt: u64, completion: u64, cost: f64) -> UsageRecord {
    UsageRecord {
        id: id.to_string(),
        operation: operation.to_string(),
        model: model.to_string(),
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: prompt + completion,
        estimated_cost: cost,
        metadata: HashMap::new(),
    }
}

fn with_metadata(mut record: UsageRecord, entries: &[(&str, Value)]) -> UsageRecord {
    for (key, value) in entries {
        record.metadata.insert((*key).to_string(), value.clone());
    }
    record
}

#[test]
fn fungible_records_merge_per_model() {
    let records = vec![
        record("u1", DICTIONARY_LOOKUP, "haiku", 100, 20, 0.001),
        record("u2", DICTIONARY_LOOKUP, "haiku", 50, 10, 0.002),
        record("u3", DICTIONARY_LOOKUP, "sonnet", 30, 5, 0.004),
    ];

    let summaries = aggregate_usage(&records, &AggregationPolicy::default());

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].model, "haiku");
    assert_eq!(summaries[0].prompt_tokens, 150);
    assert_eq!(summaries[0].completion_tokens, 30);
    assert_eq!(summaries[0].total_tokens, 180);
    assert_eq!(summaries[0].records, 2);
    assert!((summaries[0].estimated_cost - 0.003).abs() < 1e-12);
    assert_eq!(summaries[1].model, "sonnet");
    assert_eq!(summaries[1].records, 1);
}

#[test]
fn non_fungible_records_never_merge() {
    let records = vec![
        record("g1", "article_generation", "sonnet", 1000, 600, 0.02),
        record("g2", "article_generation", "sonnet", 1200, 700, 0.03),
    ];

    let summaries = aggregate_usage(&records, &AggregationPolicy::default());

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].prompt_tokens, 1000);
    assert_eq!(summaries[1].prompt_tokens, 1200);
    assert_eq!(summaries[0].records, 1);
    assert_eq!(summaries[1].records, 1);
}

#[test]
fn aggregation_is_idempotent() {
    let records = vec![
        record("u1", DICTIONARY_LOOKUP, "haiku", 100, 20, 0.001),
        record("g1", "article_generation", "sonnet", 1000, 600, 0.02),
        record("u2", DICTIONARY_LOOKUP, "haiku", 50, 10, 0.002),
    ];
    let policy = AggregationPolicy::default();

    let first = aggregate_usage(&records, &policy);
    let second = aggregate_usage(&records, &policy);

    assert_eq!(first, second);
}

#[test]
fn buckets_keep_first_seen_order() {
    let records = vec![
        record("g1", "article_generation", "sonnet", 1, 1, 0.0),
        record("u1", DICTIONARY_LOOKUP, "haiku", 1, 1, 0.0),
        record("g2", "article_generation", "sonnet", 1, 1, 0.0),
        record("u2", DICTIONARY_LOOKUP, "haiku", 1, 1, 0.0),
    ];

    let summaries = aggregate_usage(&records, &AggregationPolicy::default());

    let operations: Vec<(&str, usize)> = summaries
        .iter()
        .map(|summary| (summary.operation.as_str(), summary.records))
        .collect();
    assert_eq!(
        operations,
        vec![
            ("article_generation", 1),
            (DICTIONARY_LOOKUP, 2),
            ("article_generation", 1),
        ]
    );
}

#[test]
fn display_name_prefers_agent_name_over_agent_role() {
    let records = vec![with_metadata(
        record("u1", DICTIONARY_LOOKUP, "haiku", 1, 1, 0.0),
        &[
            ("agent_name", json!("Lexicographer")),
            ("agent_role", json!("lookup")),
        ],
    )];

    let summaries = aggregate_usage(&records, &AggregationPolicy::default());

    assert_eq!(summaries[0].display_name.as_deref(), Some("Lexicographer"));
}

#[test]
fn display_name_falls_back_to_agent_role() {
    let records = vec![with_metadata(
        record("u1", DICTIONARY_LOOKUP, "haiku", 1, 1, 0.0),
        &[("agent_role", json!("lookup"))],
    )];

    let summaries = aggregate_usage(&records, &AggregationPolicy::default());

    assert_eq!(summaries[0].display_name.as_deref(), Some("lookup"));
}

#[test]
fn empty_or_non_string_hints_are_treated_as_absent() {
    let records = vec![with_metadata(
        record("u1", DICTIONARY_LOOKUP, "haiku", 1, 1, 0.0),
        &[("agent_name", json!("")), ("agent_role", json!(42))],
    )];

    let summaries = aggregate_usage(&records, &AggregationPolicy::default());

    assert_eq!(summaries[0].display_name, None);
}

#[test]
fn only_the_first_record_sets_the_display_name() {
    let records = vec![
        record("u1", DICTIONARY_LOOKUP, "haiku", 1, 1, 0.0),
        with_metadata(
            record("u2", DICTIONARY_LOOKUP, "haiku", 1, 1, 0.0),
            &[("agent_name", json!("Latecomer"))],
        ),
    ];

    let summaries = aggregate_usage(&records, &AggregationPolicy::default());

    // The first record carried no hint, so the merged bucket keeps none.
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].display_name, None);
}

#[test]
fn policy_is_table_driven() {
    let records = vec![
        record("t1", "translation_batch", "haiku", 10, 2, 0.0),
        record("t2", "translation_batch", "haiku", 20, 4, 0.0),
    ];

    let default_summaries = aggregate_usage(&records, &AggregationPolicy::default());
    assert_eq!(default_summaries.len(), 2);

    let policy = AggregationPolicy::new(["translation_batch"]);
    let summaries = aggregate_usage(&records, &policy);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].prompt_tokens, 30);
}

#[test]
fn totals_sum_across_buckets() {
    let records = vec![
        record("u1", DICTIONARY_LOOKUP, "haiku", 100, 20, 0.001),
        record("g1", "article_generation", "sonnet", 1000, 600, 0.02),
    ];

    let summaries = aggregate_usage(&records, &AggregationPolicy::default());
    let totals = UsageTotals::from_summaries(&summaries);

    assert_eq!(totals.prompt_tokens, 1100);
    assert_eq!(totals.completion_tokens, 620);
    assert_eq!(totals.total_tokens, 1720);
    assert!((totals.estimated_cost - 0.021).abs() < 1e-12);
}
