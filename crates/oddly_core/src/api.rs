use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::{Article, ArticleStats, TrackEvent};
use crate::Result;

/// The remote article API as seen by the pipeline.
///
/// The orchestrator and the preloader depend on this trait rather than on a
/// concrete HTTP client; tests inject mocks the same way.
#[async_trait]
pub trait ArticleApi: Send + Sync {
    /// Fetch the article list for a category (`"all"` for everything).
    async fn fetch_articles(&self, category: &str) -> Result<Vec<Article>>;

    /// Fetch the article list with the server's own cache bypassed.
    async fn refresh_articles(&self) -> Result<Vec<Article>>;

    /// Fetch the extracted full text for one article URL.
    async fn fetch_content(&self, url: &str) -> Result<String>;

    /// Fetch view/reaction counters for a set of article ids.
    async fn fetch_stats(&self, ids: &[String]) -> Result<HashMap<String, ArticleStats>>;

    /// Report a view or reaction. Best-effort; failures are swallowed.
    async fn track_event(&self, article_id: &str, event: TrackEvent) -> Result<()>;
}
