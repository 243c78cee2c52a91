use crate::{ArticleStatus, DuplicateJob, GenerationRequest, JobStatus};

impl JobStatus {
    /// Whether no further transition can occur from this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl ArticleStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Deleted => "deleted",
        }
    }
}

impl DuplicateJob {
    /// Whether the conflicting job is still making progress.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        !self.status.is_terminal()
    }
}

impl GenerationRequest {
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
            force: false,
        }
    }

    /// Request a new article/job pair even when an equivalent job exists.
    #[must_use]
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}
