use async_trait::async_trait;
use lingo_coordinator::ArticleLoader;
use lingo_sdk::{
    lingo_sdk_test::MockBackend, ApiError, ApiResult, Article, ArticleFilter, ArticleStatus,
    GenerationAccepted, GenerationBackend, GenerationRequest, Job, UsageFilter, UsageRecord,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Notify;

fn article(id: &str) -> Article {
    Article {
        id: id.to_string(),
        language: "German".to_string(),
        level: "B2".to_string(),
        length: "500".to_string(),
        topic: "AI".to_string(),
        status: ArticleStatus::Completed,
        created_at: "2025-06-01T10:00:00Z".to_string(),
        user_id: "u1".to_string(),
        job_id: None,
    }
}

#[tokio::test]
async fn load_returns_the_article_and_its_content() {
    let backend = Arc::new(MockBackend::new());
    backend
        .enqueue_article(Ok(article("a1")))
        .enqueue_content(Ok("Hallo Welt.".to_string()));
    let loader = ArticleLoader::new(backend.clone());

    let view = loader
        .load("a1")
        .await
        .expect("load should succeed")
        .expect("load should not be superseded");

    assert_eq!(view.article.id, "a1");
    assert_eq!(view.content, "Hallo Welt.");
}

#[tokio::test]
async fn errors_from_a_current_load_are_surfaced() {
    let backend = Arc::new(MockBackend::new());
    backend.enqueue_article(Err(ApiError::NotFound("/api/articles/a1".to_string())));
    let loader = ArticleLoader::new(backend.clone());

    let err = loader.load("a1").await.expect_err("404 should surface");
    assert!(matches!(err, ApiError::NotFound(_)));
}

/// Blocks metadata fetches for "a1" until released; everything else
/// resolves promptly.
struct NavBackend {
    gate: Arc<Notify>,
    fail_gated: bool,
}

#[async_trait]
impl GenerationBackend for NavBackend {
    async fn generate(&self, _request: GenerationRequest) -> ApiResult<GenerationAccepted> {
        unreachable!()
    }

    async fn job_status(&self, _job_id: &str) -> ApiResult<Option<Job>> {
        unreachable!()
    }

    async fn article(&self, article_id: &str) -> ApiResult<Article> {
        if article_id == "a1" {
            self.gate.notified().await;
            if self.fail_gated {
                return Err(ApiError::Invariant("late failure".to_string()));
            }
        }
        Ok(article(article_id))
    }

    async fn article_content(&self, article_id: &str) -> ApiResult<String> {
        Ok(format!("{article_id} body"))
    }

    async fn articles(&self, _filter: ArticleFilter) -> ApiResult<Vec<Article>> {
        unreachable!()
    }

    async fn delete_article(&self, _article_id: &str) -> ApiResult<()> {
        unreachable!()
    }

    async fn usage_records(&self, _filter: UsageFilter) -> ApiResult<Vec<UsageRecord>> {
        unreachable!()
    }
}

#[tokio::test(start_paused = true)]
async fn a_newer_load_supersedes_the_one_in_flight() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(NavBackend {
        gate: gate.clone(),
        fail_gated: false,
    });
    let loader = Arc::new(ArticleLoader::new(backend.clone()));

    let stale = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("a1").await }
    });
    // Let the first load park on the gate before navigating away.
    tokio::time::sleep(Duration::from_millis(5)).await;

    let fresh = loader
        .load("a2")
        .await
        .expect("fresh load should succeed")
        .expect("fresh load should not be superseded");
    assert_eq!(fresh.article.id, "a2");
    assert_eq!(fresh.content, "a2 body");

    gate.notify_one();
    let stale = stale.await.expect("stale task should not panic");
    assert_eq!(stale.expect("stale result should not error"), None);
}

#[tokio::test(start_paused = true)]
async fn stale_failures_are_dropped_not_surfaced() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(NavBackend {
        gate: gate.clone(),
        fail_gated: true,
    });
    let loader = Arc::new(ArticleLoader::new(backend.clone()));

    let stale = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("a1").await }
    });
    tokio::time::sleep(Duration::from_millis(5)).await;

    loader.invalidate();
    gate.notify_one();

    let stale = stale.await.expect("stale task should not panic");
    assert_eq!(stale.expect("stale failure must be swallowed"), None);
}
