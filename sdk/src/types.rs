use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Lifecycle status of an article record.
///
/// Transitions are backend-authoritative; the client only ever reads this
/// value and triggers a refetch. `Deleted` is a soft state, not a removal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Running,
    Completed,
    Failed,
    Deleted,
}

/// Durable record for one generated article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Article {
    pub id: String,
    pub language: String,
    /// Proficiency level the article is written for, e.g. "B2".
    pub level: String,
    /// Target length requested at generation time, e.g. "500".
    pub length: String,
    pub topic: String,
    pub status: ArticleStatus,
    /// RFC 3339 timestamp, opaque to the client.
    pub created_at: String,
    pub user_id: String,
    /// Id of the generation job that produced (or is producing) this
    /// article. Jobs expire after a retention window; re-read this field
    /// rather than holding on to a job id observed earlier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Status of an ephemeral generation job.
///
/// The backend emits either spelling of the terminal states
/// ("succeeded"/"completed" and "failed"/"error").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    #[serde(alias = "completed")]
    Succeeded,
    #[serde(alias = "error")]
    Failed,
}

/// Ephemeral progress record for one generation attempt.
///
/// Not persisted beyond a retention window: a status fetch for an expired
/// job yields no record rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// Completion percentage in `[0, 100]`.
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Inputs for the combined create+enqueue generation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct GenerationRequest {
    pub language: String,
    pub level: String,
    pub length: String,
    pub topic: String,
    /// Create a new article/job pair even when an equivalent job exists.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

/// Success payload of the generation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct GenerationAccepted {
    pub job_id: String,
    pub article_id: String,
}

/// Snapshot of a pre-existing job, carried by the 409 conflict response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct DuplicateJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Article the existing job is producing, when the backend knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
}

/// Immutable usage telemetry event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct UsageRecord {
    pub id: String,
    /// Free-form operation key, e.g. a search-type or generation-type tag.
    pub operation: String,
    pub model: String,
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub estimated_cost: f64,
    /// Free-form annotations; may carry `agent_name` / `agent_role`
    /// display hints.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

/// Optional query filters for the article listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub status: Option<ArticleStatus>,
    pub language: Option<String>,
}

/// Optional query filters for the usage listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageFilter {
    pub operation: Option<String>,
    pub model: Option<String>,
}
