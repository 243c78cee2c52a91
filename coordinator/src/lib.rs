mod coordinator;
mod errors;
mod loader;
mod otel;
mod poller;

pub use coordinator::{
    AdoptOutcome, GenerationCoordinator, GenerationInputs, GenerationPhase, GenerationState,
    StartOutcome,
};
pub use errors::{CoordinatorError, CoordinatorResult};
pub use loader::{ArticleLoader, ArticleView};
pub use poller::{
    JobPoller, JobWatcher, PollPhase, PollSnapshot, PollStream, PollSubscription,
    DEFAULT_POLL_INTERVAL,
};
