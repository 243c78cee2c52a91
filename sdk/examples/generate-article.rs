use lingo_sdk::{GenerationBackend, GenerationRequest, HttpBackend, HttpBackendOptions};

/// Submit a generation request against a live backend and print the
/// accepted ids. Reads `LINGO_BASE_URL` and `LINGO_TOKEN` from the
/// environment.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let backend = HttpBackend::new(HttpBackendOptions {
        base_url: std::env::var("LINGO_BASE_URL").ok(),
        token: std::env::var("LINGO_TOKEN").ok(),
        ..HttpBackendOptions::default()
    });

    let accepted = backend
        .generate(GenerationRequest::new(
            "German",
            "B2",
            "500",
            "Artificial intelligence in daily life",
        ))
        .await?;

    println!(
        "enqueued job {} for article {}",
        accepted.job_id, accepted.article_id
    );
    Ok(())
}
