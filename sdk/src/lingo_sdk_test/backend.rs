use std::{collections::VecDeque, sync::Mutex};

use crate::{
    ApiError, ApiResult, Article, ArticleFilter, GenerationAccepted, GenerationBackend,
    GenerationRequest, Job, UsageFilter, UsageRecord,
};

#[derive(Default)]
struct MockBackendState {
    generate_results: VecDeque<ApiResult<GenerationAccepted>>,
    job_status_results: VecDeque<ApiResult<Option<Job>>>,
    article_results: VecDeque<ApiResult<Article>>,
    content_results: VecDeque<ApiResult<String>>,
    list_results: VecDeque<ApiResult<Vec<Article>>>,
    delete_results: VecDeque<ApiResult<()>>,
    usage_results: VecDeque<ApiResult<Vec<UsageRecord>>>,
    tracked_generate: Vec<GenerationRequest>,
    tracked_job_status: Vec<String>,
    tracked_article: Vec<String>,
    tracked_content: Vec<String>,
    tracked_list: Vec<ArticleFilter>,
    tracked_delete: Vec<String>,
    tracked_usage: Vec<UsageFilter>,
}

impl MockBackendState {
    fn reset(&mut self) {
        self.tracked_generate.clear();
        self.tracked_job_status.clear();
        self.tracked_article.clear();
        self.tracked_content.clear();
        self.tracked_list.clear();
        self.tracked_delete.clear();
        self.tracked_usage.clear();
    }

    fn restore(&mut self) {
        self.generate_results.clear();
        self.job_status_results.clear();
        self.article_results.clear();
        self.content_results.clear();
        self.list_results.clear();
        self.delete_results.clear();
        self.usage_results.clear();
        self.reset();
    }
}

/// A mock generation backend for testing that tracks call arguments and
/// yields predefined results in FIFO order per endpoint.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockBackendState>,
}

impl MockBackend {
    /// Construct a new mock backend instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a mocked result for `generate`.
    pub fn enqueue_generate(&self, result: ApiResult<GenerationAccepted>) -> &Self {
        self.lock().generate_results.push_back(result);
        self
    }

    /// Enqueue a mocked result for `job_status`.
    pub fn enqueue_job_status(&self, result: ApiResult<Option<Job>>) -> &Self {
        self.lock().job_status_results.push_back(result);
        self
    }

    /// Enqueue several mocked `job_status` results at once.
    pub fn enqueue_job_statuses<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = ApiResult<Option<Job>>>,
    {
        let mut state = self.lock();
        for result in results {
            state.job_status_results.push_back(result);
        }
        drop(state);
        self
    }

    /// Enqueue a mocked result for `article`.
    pub fn enqueue_article(&self, result: ApiResult<Article>) -> &Self {
        self.lock().article_results.push_back(result);
        self
    }

    /// Enqueue a mocked result for `article_content`.
    pub fn enqueue_content(&self, result: ApiResult<String>) -> &Self {
        self.lock().content_results.push_back(result);
        self
    }

    /// Enqueue a mocked result for `articles`.
    pub fn enqueue_articles(&self, result: ApiResult<Vec<Article>>) -> &Self {
        self.lock().list_results.push_back(result);
        self
    }

    /// Enqueue a mocked result for `delete_article`.
    pub fn enqueue_delete(&self, result: ApiResult<()>) -> &Self {
        self.lock().delete_results.push_back(result);
        self
    }

    /// Enqueue a mocked result for `usage_records`.
    pub fn enqueue_usage(&self, result: ApiResult<Vec<UsageRecord>>) -> &Self {
        self.lock().usage_results.push_back(result);
        self
    }

    /// Requests seen by `generate` so far.
    pub fn tracked_generate_requests(&self) -> Vec<GenerationRequest> {
        self.lock().tracked_generate.clone()
    }

    /// Job ids seen by `job_status` so far.
    pub fn tracked_job_status_ids(&self) -> Vec<String> {
        self.lock().tracked_job_status.clone()
    }

    /// Article ids seen by `article` so far.
    pub fn tracked_article_ids(&self) -> Vec<String> {
        self.lock().tracked_article.clone()
    }

    /// Article ids seen by `article_content` so far.
    pub fn tracked_content_ids(&self) -> Vec<String> {
        self.lock().tracked_content.clone()
    }

    /// Filters seen by `articles` so far.
    pub fn tracked_list_filters(&self) -> Vec<ArticleFilter> {
        self.lock().tracked_list.clone()
    }

    /// Article ids seen by `delete_article` so far.
    pub fn tracked_delete_ids(&self) -> Vec<String> {
        self.lock().tracked_delete.clone()
    }

    /// Filters seen by `usage_records` so far.
    pub fn tracked_usage_filters(&self) -> Vec<UsageFilter> {
        self.lock().tracked_usage.clone()
    }

    /// Reset tracked calls without touching enqueued results.
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Clear both tracked calls and enqueued results.
    pub fn restore(&self) {
        self.lock().restore();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockBackendState> {
        self.state.lock().expect("mock state poisoned")
    }
}

fn drained(endpoint: &str) -> ApiError {
    ApiError::Invariant(format!("no mocked {endpoint} results available"))
}

#[async_trait::async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, request: GenerationRequest) -> ApiResult<GenerationAccepted> {
        let mut state = self.lock();
        state.tracked_generate.push(request);
        state
            .generate_results
            .pop_front()
            .ok_or_else(|| drained("generate"))?
    }

    async fn job_status(&self, job_id: &str) -> ApiResult<Option<Job>> {
        let mut state = self.lock();
        state.tracked_job_status.push(job_id.to_string());
        state
            .job_status_results
            .pop_front()
            .ok_or_else(|| drained("job_status"))?
    }

    async fn article(&self, article_id: &str) -> ApiResult<Article> {
        let mut state = self.lock();
        state.tracked_article.push(article_id.to_string());
        state
            .article_results
            .pop_front()
            .ok_or_else(|| drained("article"))?
    }

    async fn article_content(&self, article_id: &str) -> ApiResult<String> {
        let mut state = self.lock();
        state.tracked_content.push(article_id.to_string());
        state
            .content_results
            .pop_front()
            .ok_or_else(|| drained("article_content"))?
    }

    async fn articles(&self, filter: ArticleFilter) -> ApiResult<Vec<Article>> {
        let mut state = self.lock();
        state.tracked_list.push(filter);
        state
            .list_results
            .pop_front()
            .ok_or_else(|| drained("articles"))?
    }

    async fn delete_article(&self, article_id: &str) -> ApiResult<()> {
        let mut state = self.lock();
        state.tracked_delete.push(article_id.to_string());
        state
            .delete_results
            .pop_front()
            .ok_or_else(|| drained("delete_article"))?
    }

    async fn usage_records(&self, filter: UsageFilter) -> ApiResult<Vec<UsageRecord>> {
        let mut state = self.lock();
        state.tracked_usage.push(filter);
        state
            .usage_results
            .pop_front()
            .ok_or_else(|| drained("usage_records"))?
    }
}
