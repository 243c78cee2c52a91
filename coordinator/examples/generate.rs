use lingo_coordinator::{GenerationCoordinator, GenerationInputs, GenerationPhase, StartOutcome};
use lingo_sdk::{HttpBackend, HttpBackendOptions};
use std::sync::Arc;

/// Drive one article generation end to end against a live backend,
/// printing progress as the job advances. Reads `LINGO_BASE_URL` and
/// `LINGO_TOKEN` from the environment.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let backend = Arc::new(HttpBackend::new(HttpBackendOptions {
        base_url: std::env::var("LINGO_BASE_URL").ok(),
        token: std::env::var("LINGO_TOKEN").ok(),
        ..HttpBackendOptions::default()
    }));
    let coordinator = GenerationCoordinator::new(backend);
    let mut updates = coordinator.subscribe();

    let inputs = GenerationInputs::new("German", "B2", "500", "Artificial intelligence in daily life");
    match coordinator.start(inputs).await? {
        StartOutcome::Started { job_id, .. } => println!("watching job {job_id}"),
        StartOutcome::Conflict(job) => {
            println!(
                "adopting existing job {} ({:?}, {}%)",
                job.id, job.status, job.progress
            );
            coordinator.adopt().await?;
        }
    }

    loop {
        let state = updates.borrow_and_update().clone();
        if let Some(snapshot) = &state.snapshot {
            println!("{:?} {}% {}", snapshot.phase, snapshot.progress, snapshot.current_task);
        }
        if matches!(state.phase, GenerationPhase::Idle | GenerationPhase::Failed) {
            break;
        }
        updates.changed().await?;
    }

    let state = coordinator.state();
    if let Some(error) = state.error {
        eprintln!("generation failed: {error}");
    } else if let Some(content) = state.content {
        println!("---\n{content}");
    }
    Ok(())
}
