use crate::{
    ApiResult, Article, ArticleFilter, GenerationAccepted, GenerationRequest, Job, UsageFilter,
    UsageRecord,
};

/// Unified interface over the article-generation backend.
///
/// The coordinator, pollers, and tests depend on this seam rather than on
/// a concrete HTTP client. All persistence lives behind it; implementors
/// never mutate records locally.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Create an article and enqueue its generation job in one call.
    ///
    /// A backend that already holds a job for equivalent inputs answers
    /// with `ApiError::Duplicate` unless `request.force` is set.
    async fn generate(&self, request: GenerationRequest) -> ApiResult<GenerationAccepted>;

    /// Fetch the current status of a generation job.
    ///
    /// Jobs expire after a retention window; an absent job resolves to
    /// `Ok(None)` rather than an error.
    async fn job_status(&self, job_id: &str) -> ApiResult<Option<Job>>;

    /// Fetch the durable article record.
    async fn article(&self, article_id: &str) -> ApiResult<Article>;

    /// Fetch the article body as raw text.
    async fn article_content(&self, article_id: &str) -> ApiResult<String>;

    /// List article records, optionally filtered.
    async fn articles(&self, filter: ArticleFilter) -> ApiResult<Vec<Article>>;

    /// Soft-delete an article. The record remains readable with status
    /// `deleted`.
    async fn delete_article(&self, article_id: &str) -> ApiResult<()>;

    /// List usage telemetry records, optionally filtered.
    async fn usage_records(&self, filter: UsageFilter) -> ApiResult<Vec<UsageRecord>>;
}
