use lingo_sdk::{ApiResult, Article, GenerationBackend};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// An article record together with its body.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleView {
    pub article: Article,
    pub content: String,
}

/// Stale-suppressed detail loads for a single view slot.
///
/// Each `load` supersedes the previous one: the generation counter is
/// captured when a load begins and re-checked after every fetch, so a
/// response (or failure) that resolves after a newer load began is
/// discarded as `Ok(None)` instead of being surfaced.
pub struct ArticleLoader {
    backend: Arc<dyn GenerationBackend>,
    generation: AtomicU64,
}

impl ArticleLoader {
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch an article and its content. Resolves to `Ok(None)` when the
    /// load was superseded before it finished.
    pub async fn load(&self, article_id: &str) -> ApiResult<Option<ArticleView>> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let article = self.backend.article(article_id).await;
        if self.is_stale(token) {
            return Ok(None);
        }
        let article = article?;

        let content = self.backend.article_content(article_id).await;
        if self.is_stale(token) {
            return Ok(None);
        }
        let content = content?;

        Ok(Some(ArticleView { article, content }))
    }

    /// Invalidate any load still in flight without starting a new one,
    /// e.g. when the view navigates away.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_stale(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != token
    }
}
