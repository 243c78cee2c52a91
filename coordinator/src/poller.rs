use futures::{stream::BoxStream, Stream, StreamExt};
use lingo_sdk::{GenerationBackend, Job, JobStatus};
use std::{
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    task::{Context, Poll},
    time::Duration,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Client-side view of a job's lifecycle, translated uniformly from the
/// backend status: `succeeded → Completed`, `failed → Error`, anything
/// else or an absent job → `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Queued,
    Running,
    Completed,
    Error,
}

impl PollPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    fn from_status(status: Option<JobStatus>) -> Self {
        match status {
            Some(JobStatus::Queued) => Self::Queued,
            Some(JobStatus::Running) => Self::Running,
            Some(JobStatus::Succeeded) => Self::Completed,
            Some(JobStatus::Failed) => Self::Error,
            None => Self::Idle,
        }
    }
}

/// One observed job state, translated for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollSnapshot {
    pub phase: PollPhase,
    /// "processing" while running, "queued" while queued, empty otherwise.
    pub current_task: String,
    pub progress: u8,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl PollSnapshot {
    #[must_use]
    pub fn from_job(job: Option<&Job>) -> Self {
        let phase = PollPhase::from_status(job.map(|job| job.status));
        let current_task = match phase {
            PollPhase::Running => "processing",
            PollPhase::Queued => "queued",
            _ => "",
        }
        .to_string();

        Self {
            phase,
            current_task,
            progress: job.map(|job| job.progress).unwrap_or_default(),
            message: job.and_then(|job| job.message.clone()),
            error: job.and_then(|job| job.error.clone()),
        }
    }

    /// Change guard for downstream re-renders: only these four fields
    /// count as a meaningful difference.
    #[must_use]
    pub fn differs_from(&self, prior: &Self) -> bool {
        self.current_task != prior.current_task
            || self.progress != prior.progress
            || self.message != prior.message
            || self.error != prior.error
    }
}

/// Subscriber notified by [`JobPoller::subscribe`].
#[async_trait::async_trait]
pub trait JobWatcher: Send + Sync {
    /// A snapshot meaningfully different from the last delivered one.
    async fn on_change(&self, snapshot: &PollSnapshot);

    /// The job reached `completed`. Delivered at most once; polling stops
    /// afterwards.
    async fn on_complete(&self, snapshot: &PollSnapshot) {
        let _ = snapshot;
    }

    /// The job reached `error`. Delivered at most once; polling stops
    /// afterwards.
    async fn on_error(&self, snapshot: &PollSnapshot) {
        let _ = snapshot;
    }
}

/// Boxed snapshot stream with a consistent interface.
pub struct PollStream(BoxStream<'static, PollSnapshot>);

impl PollStream {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = PollSnapshot> + Send + 'static,
    {
        Self(Box::pin(stream))
    }
}

impl Stream for PollStream {
    type Item = PollSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.as_mut().poll_next(cx)
    }
}

/// Interval-driven fetch-and-diff over a job's status.
pub struct JobPoller {
    backend: Arc<dyn GenerationBackend>,
    interval: Duration,
}

impl JobPoller {
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stream of meaningful snapshots for `job_id`.
    ///
    /// The first fetch fires immediately, then at the configured cadence.
    /// Fetch failures are logged and skipped; only a well-formed terminal
    /// status ends the stream, after which no further fetch is issued.
    /// Fetches are issued serially: a slow response delays the next tick
    /// rather than overlapping it.
    #[must_use]
    pub fn snapshots(&self, job_id: &str) -> PollStream {
        let backend = self.backend.clone();
        let job_id = job_id.to_string();
        let period = self.interval;

        PollStream::from_stream(async_stream::stream! {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<PollSnapshot> = None;

            loop {
                ticker.tick().await;

                let job = match backend.job_status(&job_id).await {
                    Ok(job) => job,
                    Err(error) => {
                        tracing::warn!(
                            job_id = %job_id,
                            error = %error,
                            "job status fetch failed; will retry"
                        );
                        continue;
                    }
                };

                let snapshot = PollSnapshot::from_job(job.as_ref());
                let terminal = snapshot.phase.is_terminal();
                let changed = last
                    .as_ref()
                    .map_or(true, |prior| snapshot.differs_from(prior));

                if changed || terminal {
                    last = Some(snapshot.clone());
                    yield snapshot;
                }
                if terminal {
                    break;
                }
            }
        })
    }

    /// Begin watching `job_id`, dispatching snapshots to `watcher` from a
    /// spawned task. `None` or `enabled == false` yields a no-op
    /// subscription that never fetches.
    pub fn subscribe(
        &self,
        job_id: Option<&str>,
        enabled: bool,
        watcher: Arc<dyn JobWatcher>,
    ) -> PollSubscription {
        let Some(job_id) = job_id else {
            return PollSubscription::noop();
        };
        if !enabled {
            return PollSubscription::noop();
        }

        let active = Arc::new(AtomicBool::new(true));
        let gate = active.clone();
        let mut stream = self.snapshots(job_id);

        let handle = tokio::spawn(async move {
            while let Some(snapshot) = stream.next().await {
                // Gate on "still subscribed" at the moment the response
                // resolved, not at request time.
                if !gate.load(Ordering::SeqCst) {
                    break;
                }
                match snapshot.phase {
                    PollPhase::Completed => {
                        watcher.on_complete(&snapshot).await;
                        gate.store(false, Ordering::SeqCst);
                        break;
                    }
                    PollPhase::Error => {
                        watcher.on_error(&snapshot).await;
                        gate.store(false, Ordering::SeqCst);
                        break;
                    }
                    _ => watcher.on_change(&snapshot).await,
                }
            }
        });

        PollSubscription {
            active,
            handle: Some(handle),
        }
    }
}

/// Handle for an active watch. Dropping it unsubscribes, so a subscriber
/// whose lifetime ends cannot leave an orphaned poll loop behind.
pub struct PollSubscription {
    active: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollSubscription {
    fn noop() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Stop polling immediately. Idempotent; an in-flight response is
    /// discarded rather than delivered.
    pub fn unsubscribe(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the watch can still deliver callbacks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for PollSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
