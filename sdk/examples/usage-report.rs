use lingo_sdk::{
    aggregate_usage, AggregationPolicy, GenerationBackend, HttpBackend, HttpBackendOptions,
    UsageFilter, UsageTotals,
};

/// Fetch usage records from a live backend, aggregate them with the
/// default policy, and print a per-bucket report with a grand total.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let backend = HttpBackend::new(HttpBackendOptions {
        base_url: std::env::var("LINGO_BASE_URL").ok(),
        token: std::env::var("LINGO_TOKEN").ok(),
        ..HttpBackendOptions::default()
    });

    let records = backend.usage_records(UsageFilter::default()).await?;
    let summaries = aggregate_usage(&records, &AggregationPolicy::default());

    for summary in &summaries {
        let name = summary
            .display_name
            .clone()
            .unwrap_or_else(|| summary.operation.clone());
        println!(
            "{name:<24} {:<12} {:>8} tokens  ${:.4}  ({} records)",
            summary.model, summary.total_tokens, summary.estimated_cost, summary.records
        );
    }

    let totals = UsageTotals::from_summaries(&summaries);
    println!(
        "total: {} tokens, ${:.4}",
        totals.total_tokens, totals.estimated_cost
    );
    Ok(())
}
