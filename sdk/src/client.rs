use crate::{
    client_utils, otel::trace_call, ApiError, ApiResult, Article, ArticleFilter,
    GenerationAccepted, GenerationBackend, GenerationRequest, Job, UsageFilter, UsageRecord,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    Client,
};
use std::collections::HashMap;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Reqwest-backed implementation of [`GenerationBackend`].
pub struct HttpBackend {
    base_url: String,
    token: Option<String>,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct HttpBackendOptions {
    pub base_url: Option<String>,
    /// Bearer credential supplied by the surrounding application. It is
    /// attached to every request as-is; the client neither issues nor
    /// validates credentials.
    pub token: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

impl HttpBackend {
    #[must_use]
    pub fn new(mut options: HttpBackendOptions) -> Self {
        let base_url = options
            .base_url
            .take()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = options.client.take().unwrap_or_default();
        let headers = options.headers.unwrap_or_default();

        Self {
            base_url,
            token: options.token,
            client,
            headers,
        }
    }

    /// Replace the bearer credential, e.g. after the surrounding
    /// application refreshes its session.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request_headers(&self) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|error| {
                ApiError::InvalidInput(format!("Invalid bearer token header value: {error}"))
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
                ApiError::InvalidInput(format!("Invalid header name '{key}': {error}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                ApiError::InvalidInput(format!("Invalid header value for '{key}': {error}"))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait::async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate(&self, request: GenerationRequest) -> ApiResult<GenerationAccepted> {
        let headers = self.request_headers()?;
        trace_call(
            "generate",
            &request.topic,
            client_utils::post_json(
                &self.client,
                &self.url("/api/articles/generate"),
                &request,
                headers,
            ),
        )
        .await
    }

    async fn job_status(&self, job_id: &str) -> ApiResult<Option<Job>> {
        let headers = self.request_headers()?;
        let result = trace_call(
            "job_status",
            job_id,
            client_utils::get_json::<Job>(
                &self.client,
                &self.url(&format!("/api/jobs/{job_id}")),
                &[],
                headers,
            ),
        )
        .await;

        match result {
            Ok(job) => Ok(Some(job)),
            // Jobs expire after a retention window.
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn article(&self, article_id: &str) -> ApiResult<Article> {
        let headers = self.request_headers()?;
        trace_call(
            "article",
            article_id,
            client_utils::get_json(
                &self.client,
                &self.url(&format!("/api/articles/{article_id}")),
                &[],
                headers,
            ),
        )
        .await
    }

    async fn article_content(&self, article_id: &str) -> ApiResult<String> {
        let headers = self.request_headers()?;
        trace_call(
            "article_content",
            article_id,
            client_utils::get_text(
                &self.client,
                &self.url(&format!("/api/articles/{article_id}/content")),
                headers,
            ),
        )
        .await
    }

    async fn articles(&self, filter: ArticleFilter) -> ApiResult<Vec<Article>> {
        let headers = self.request_headers()?;
        let mut query = Vec::new();
        if let Some(status) = filter.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(language) = filter.language {
            query.push(("language", language));
        }
        trace_call(
            "articles",
            "list",
            client_utils::get_json(&self.client, &self.url("/api/articles"), &query, headers),
        )
        .await
    }

    async fn delete_article(&self, article_id: &str) -> ApiResult<()> {
        let headers = self.request_headers()?;
        trace_call(
            "delete_article",
            article_id,
            client_utils::delete(
                &self.client,
                &self.url(&format!("/api/articles/{article_id}")),
                headers,
            ),
        )
        .await
    }

    async fn usage_records(&self, filter: UsageFilter) -> ApiResult<Vec<UsageRecord>> {
        let headers = self.request_headers()?;
        let mut query = Vec::new();
        if let Some(operation) = filter.operation {
            query.push(("operation", operation));
        }
        if let Some(model) = filter.model {
            query.push(("model", model));
        }
        trace_call(
            "usage_records",
            "list",
            client_utils::get_json(&self.client, &self.url("/api/usage"), &query, headers),
        )
        .await
    }
}
