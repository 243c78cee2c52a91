use crate::{
    otel::{record_failure, trace_flight},
    poller::{JobPoller, PollPhase, PollSnapshot, DEFAULT_POLL_INTERVAL},
    CoordinatorError, CoordinatorResult,
};
use futures::StreamExt;
use lingo_sdk::{
    ApiError, Article, ArticleFilter, DuplicateJob, GenerationBackend, GenerationRequest,
    JobStatus,
};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};

/// Phases of one generation attempt.
///
/// `Failed` is a resting phase like `Idle`: the attempt is over and a new
/// `start` resets it. The failure string lives in
/// [`GenerationState::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Submitting,
    /// A conflicting job exists; the caller decides between `force`,
    /// `adopt`, and `dismiss`.
    AwaitingDecision,
    Polling,
    Reconciling,
    Failed,
}

impl GenerationPhase {
    fn is_busy(self) -> bool {
        matches!(
            self,
            Self::Submitting | Self::AwaitingDecision | Self::Polling | Self::Reconciling
        )
    }
}

/// Observable coordinator state, published through a watch channel.
#[derive(Debug, Clone, Default)]
pub struct GenerationState {
    pub phase: GenerationPhase,
    pub job_id: Option<String>,
    pub article_id: Option<String>,
    /// The conflicting job while `AwaitingDecision`.
    pub conflict: Option<DuplicateJob>,
    /// Latest poll snapshot while `Polling`.
    pub snapshot: Option<PollSnapshot>,
    /// Reconciled article record after a successful attempt.
    pub article: Option<Article>,
    /// Reconciled article body after a successful attempt.
    pub content: Option<String>,
    /// Job or reconciliation error from the last attempt.
    pub error: Option<String>,
}

/// Inputs for a generation attempt. All four fields are required;
/// validation happens before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInputs {
    pub language: String,
    pub level: String,
    pub length: String,
    pub topic: String,
}

impl GenerationInputs {
    pub fn new(
        language: impl Into<String>,
        level: impl Into<String>,
        length: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            level: level.into(),
            length: length.into(),
            topic: topic.into(),
        }
    }

    fn validate(&self) -> CoordinatorResult<()> {
        for (field, value) in [
            ("language", &self.language),
            ("level", &self.level),
            ("length", &self.length),
            ("topic", &self.topic),
        ] {
            if value.trim().is_empty() {
                return Err(CoordinatorError::InvalidInput(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(())
    }

    fn request(&self, force: bool) -> GenerationRequest {
        let mut request = GenerationRequest::new(
            self.language.as_str(),
            self.level.as_str(),
            self.length.as_str(),
            self.topic.as_str(),
        );
        request.force = force;
        request
    }
}

/// Outcome of [`GenerationCoordinator::start`] and
/// [`GenerationCoordinator::force`].
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// The backend accepted the request; polling has begun.
    Started { job_id: String, article_id: String },
    /// A conflicting job exists; resolve with `force`, `adopt`, or
    /// `dismiss`.
    Conflict(DuplicateJob),
}

/// Outcome of [`GenerationCoordinator::adopt`].
#[derive(Debug, Clone, PartialEq)]
pub enum AdoptOutcome {
    /// The existing job is still in flight; polling has begun on it.
    Watching { job_id: String },
    /// The existing job already succeeded; a reconciliation pass was
    /// performed (its result is in the observable state).
    Reconciled,
    /// The existing job already failed; nothing was adopted.
    Failed { error: String },
}

struct PendingConflict {
    inputs: GenerationInputs,
    job: DuplicateJob,
}

#[derive(Default)]
struct FlightState {
    /// Attempt counter. Captured by every spawned flight and re-checked at
    /// each resolution point, so a superseded response is dropped silently
    /// rather than acted on.
    epoch: u64,
    pending: Option<PendingConflict>,
    task: Option<JoinHandle<()>>,
    reconciling: Option<String>,
    reconciled: Option<String>,
}

struct Inner {
    backend: Arc<dyn GenerationBackend>,
    poller: JobPoller,
    state_tx: watch::Sender<GenerationState>,
    flight: Mutex<FlightState>,
}

impl Inner {
    fn flight(&self) -> MutexGuard<'_, FlightState> {
        self.flight.lock().expect("flight state poisoned")
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.flight().epoch == epoch
    }

    /// Apply a state mutation if the attempt is still current. Returns
    /// whether it was applied. The flight guard is held across the write
    /// so the epoch cannot advance between the check and the mutation.
    fn update_state(&self, epoch: u64, apply: impl FnOnce(&mut GenerationState)) -> bool {
        let flight = self.flight();
        if flight.epoch != epoch {
            return false;
        }
        self.state_tx.send_modify(apply);
        drop(flight);
        true
    }

    fn store_task(&self, epoch: u64, task: JoinHandle<()>) {
        let mut flight = self.flight();
        if flight.epoch == epoch {
            flight.task = Some(task);
        } else {
            task.abort();
        }
    }

    fn fail(&self, epoch: u64, message: String) {
        record_failure(&message);
        self.update_state(epoch, |state| {
            state.phase = GenerationPhase::Failed;
            state.error = Some(message);
        });
    }

    async fn run_flight(
        self: Arc<Self>,
        epoch: u64,
        job_id: String,
        article_hint: Option<String>,
    ) {
        let mut stream = self.poller.snapshots(&job_id);
        let mut terminal: Option<PollSnapshot> = None;

        while let Some(snapshot) = stream.next().await {
            if !self.is_current(epoch) {
                return;
            }
            if snapshot.phase.is_terminal() {
                terminal = Some(snapshot.clone());
            }
            self.update_state(epoch, |state| state.snapshot = Some(snapshot));
            if terminal.is_some() {
                break;
            }
        }

        let Some(terminal) = terminal else { return };
        match terminal.phase {
            PollPhase::Completed => self.reconcile(epoch, &job_id, article_hint).await,
            PollPhase::Error => {
                let message = terminal
                    .error
                    .unwrap_or_else(|| "generation failed".to_string());
                self.fail(epoch, message);
            }
            _ => {}
        }
    }

    /// Refetch the article record and its content after a successful job.
    ///
    /// Idempotent per job id: a second terminal notification while the
    /// pass is in flight, or after it ran, is a no-op. The attempt counts
    /// as performed even when the refetch fails.
    async fn reconcile(&self, epoch: u64, job_id: &str, article_hint: Option<String>) {
        {
            let mut flight = self.flight();
            if flight.epoch != epoch {
                return;
            }
            if flight.reconciled.as_deref() == Some(job_id)
                || flight.reconciling.as_deref() == Some(job_id)
            {
                return;
            }
            flight.reconciling = Some(job_id.to_string());
        }

        self.update_state(epoch, |state| state.phase = GenerationPhase::Reconciling);

        let result = self.fetch_materials(job_id, article_hint).await;

        {
            let mut flight = self.flight();
            flight.reconciling = None;
            flight.reconciled = Some(job_id.to_string());
        }

        match result {
            Ok((article, content)) => {
                self.update_state(epoch, |state| {
                    state.phase = GenerationPhase::Idle;
                    state.article_id = Some(article.id.clone());
                    state.article = Some(article);
                    state.content = Some(content);
                    state.error = None;
                });
            }
            Err(error) => {
                tracing::warn!(job_id = %job_id, error = %error, "reconciliation fetch failed");
                self.fail(epoch, error.to_string());
            }
        }
    }

    async fn fetch_materials(
        &self,
        job_id: &str,
        article_hint: Option<String>,
    ) -> Result<(Article, String), ApiError> {
        let article_id = match article_hint {
            Some(id) => id,
            None => self.find_article_for_job(job_id).await?,
        };
        let article = self.backend.article(&article_id).await?;
        let content = self.backend.article_content(&article_id).await?;
        Ok((article, content))
    }

    /// Re-derive the article-to-job link by reading `Article.job_id`; a
    /// job id observed earlier must not be assumed to stay linked.
    async fn find_article_for_job(&self, job_id: &str) -> Result<String, ApiError> {
        let articles = self.backend.articles(ArticleFilter::default()).await?;
        articles
            .into_iter()
            .find(|article| article.job_id.as_deref() == Some(job_id))
            .map(|article| article.id)
            .ok_or_else(|| ApiError::Invariant(format!("no article records job {job_id}")))
    }
}

/// Drives the full create → enqueue → poll → reconcile sequence for one
/// generation attempt at a time, resolving duplicate-job conflicts
/// without losing the caller's inputs.
pub struct GenerationCoordinator {
    inner: Arc<Inner>,
}

impl GenerationCoordinator {
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_poll_interval(backend, DEFAULT_POLL_INTERVAL)
    }

    #[must_use]
    pub fn with_poll_interval(backend: Arc<dyn GenerationBackend>, interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(GenerationState::default());
        let poller = JobPoller::new(backend.clone()).with_interval(interval);
        Self {
            inner: Arc::new(Inner {
                backend,
                poller,
                state_tx,
                flight: Mutex::default(),
            }),
        }
    }

    /// Subscribe to state updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.inner.state_tx.subscribe()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> GenerationState {
        self.inner.state_tx.borrow().clone()
    }

    /// Begin a generation attempt.
    ///
    /// Validates the inputs before any network call and rejects with
    /// `Busy` while another attempt is in flight. A backend conflict is
    /// not an error: it parks the attempt in `AwaitingDecision` and
    /// returns the conflicting job snapshot.
    pub async fn start(&self, inputs: GenerationInputs) -> CoordinatorResult<StartOutcome> {
        inputs.validate()?;
        let epoch = self.begin_attempt()?;
        self.submit(epoch, inputs, false).await
    }

    /// Resolve a pending conflict by forcing a new generation with the
    /// stored inputs.
    pub async fn force(&self) -> CoordinatorResult<StartOutcome> {
        let (epoch, inputs) = {
            let mut flight = self.inner.flight();
            let pending = flight
                .pending
                .take()
                .ok_or(CoordinatorError::NoPendingDecision)?;
            flight.epoch += 1;
            self.inner.state_tx.send_modify(|state| {
                *state = GenerationState {
                    phase: GenerationPhase::Submitting,
                    ..GenerationState::default()
                };
            });
            (flight.epoch, pending.inputs)
        };
        self.submit(epoch, inputs, true).await
    }

    /// Resolve a pending conflict by adopting the existing job: reconcile
    /// immediately when it already succeeded, watch it when it is still
    /// in flight, surface its failure without adopting otherwise.
    pub async fn adopt(&self) -> CoordinatorResult<AdoptOutcome> {
        let (epoch, job) = {
            let mut flight = self.inner.flight();
            let pending = flight
                .pending
                .take()
                .ok_or(CoordinatorError::NoPendingDecision)?;
            flight.epoch += 1;
            (flight.epoch, pending.job)
        };

        let inner = self.inner.clone();
        match job.status {
            JobStatus::Succeeded => {
                inner.update_state(epoch, |state| {
                    state.conflict = None;
                    state.job_id = Some(job.id.clone());
                    state.article_id = job.article_id.clone();
                });
                inner.reconcile(epoch, &job.id, job.article_id).await;
                Ok(AdoptOutcome::Reconciled)
            }
            JobStatus::Failed => {
                let message = job
                    .error
                    .unwrap_or_else(|| "generation failed".to_string());
                inner.update_state(epoch, |state| {
                    state.conflict = None;
                    state.phase = GenerationPhase::Failed;
                    state.error = Some(message.clone());
                });
                Ok(AdoptOutcome::Failed { error: message })
            }
            JobStatus::Queued | JobStatus::Running => {
                inner.update_state(epoch, |state| {
                    state.conflict = None;
                    state.phase = GenerationPhase::Polling;
                    state.job_id = Some(job.id.clone());
                    state.article_id = job.article_id.clone();
                });
                let task = tokio::spawn(trace_flight(
                    job.id.clone(),
                    inner
                        .clone()
                        .run_flight(epoch, job.id.clone(), job.article_id),
                ));
                inner.store_task(epoch, task);
                Ok(AdoptOutcome::Watching { job_id: job.id })
            }
        }
    }

    /// Drop a pending conflict without acting on it.
    pub fn dismiss(&self) {
        let mut flight = self.inner.flight();
        if flight.pending.take().is_some() {
            flight.epoch += 1;
            self.inner.state_tx.send_modify(|state| {
                state.phase = GenerationPhase::Idle;
                state.conflict = None;
            });
        }
    }

    /// Abort the in-flight attempt, if any. Responses still in flight
    /// become stale and are discarded when they resolve.
    pub fn cancel(&self) {
        let mut flight = self.inner.flight();
        flight.epoch += 1;
        flight.pending = None;
        if let Some(task) = flight.task.take() {
            task.abort();
        }
        self.inner.state_tx.send_modify(|state| {
            state.phase = GenerationPhase::Idle;
            state.conflict = None;
            state.snapshot = None;
        });
    }

    /// Wait for the current poll-and-reconcile flight to finish.
    pub async fn wait(&self) {
        let task = self.inner.flight().task.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    fn begin_attempt(&self) -> CoordinatorResult<u64> {
        let inner = &self.inner;
        let mut flight = inner.flight();
        if inner.state_tx.borrow().phase.is_busy() {
            return Err(CoordinatorError::Busy);
        }
        flight.epoch += 1;
        flight.pending = None;
        if let Some(task) = flight.task.take() {
            task.abort();
        }
        let epoch = flight.epoch;
        inner.state_tx.send_modify(|state| {
            *state = GenerationState {
                phase: GenerationPhase::Submitting,
                ..GenerationState::default()
            };
        });
        drop(flight);
        Ok(epoch)
    }

    async fn submit(
        &self,
        epoch: u64,
        inputs: GenerationInputs,
        force: bool,
    ) -> CoordinatorResult<StartOutcome> {
        let inner = &self.inner;
        match inner.backend.generate(inputs.request(force)).await {
            Ok(accepted) => {
                let current = inner.update_state(epoch, |state| {
                    state.phase = GenerationPhase::Polling;
                    state.job_id = Some(accepted.job_id.clone());
                    state.article_id = Some(accepted.article_id.clone());
                });
                if current {
                    let task = tokio::spawn(trace_flight(
                        accepted.job_id.clone(),
                        inner.clone().run_flight(
                            epoch,
                            accepted.job_id.clone(),
                            Some(accepted.article_id.clone()),
                        ),
                    ));
                    inner.store_task(epoch, task);
                }
                Ok(StartOutcome::Started {
                    job_id: accepted.job_id,
                    article_id: accepted.article_id,
                })
            }
            Err(ApiError::Duplicate(job)) if !force => {
                {
                    let mut flight = inner.flight();
                    if flight.epoch == epoch {
                        flight.pending = Some(PendingConflict {
                            inputs,
                            job: job.clone(),
                        });
                    }
                }
                inner.update_state(epoch, |state| {
                    state.phase = GenerationPhase::AwaitingDecision;
                    state.conflict = Some(job.clone());
                });
                Ok(StartOutcome::Conflict(job))
            }
            Err(error) => {
                // One-shot failure: no partial side effect is assumed.
                inner.update_state(epoch, |state| state.phase = GenerationPhase::Idle);
                Err(error.into())
            }
        }
    }
}
