use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use oddly_core::{Article, KeyValueStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const CACHE_KEY: &str = "oddly_articles_cache";

/// Headline metadata churns fast; the list goes stale after half an hour.
pub const ARTICLE_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// One blob under one key: the article list and its timestamp are written
/// together, so a reader can never observe a list paired with a timestamp
/// from a different write.
#[derive(Debug, Serialize, Deserialize)]
struct CachedArticles {
    articles: Vec<Article>,
    /// Milliseconds since the epoch, set at write time.
    timestamp: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheInfo {
    pub cached: bool,
    pub age: Option<Duration>,
}

/// TTL'd persistent cache for the article list.
pub struct ArticleCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ArticleCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, ARTICLE_CACHE_TTL)
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Read the cached list. Missing, malformed, and expired entries all
    /// read as `None`; storage failures do too, because cache absence is
    /// always a safely-handled state.
    pub async fn get_cached_articles(&self) -> Option<Vec<Article>> {
        let raw = match self.store.get(CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!("Error reading cache: {}", e);
                return None;
            }
        };

        let entry: CachedArticles = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding malformed article cache: {}", e);
                return None;
            }
        };

        let age = Utc::now().timestamp_millis().saturating_sub(entry.timestamp);
        if age > self.ttl.as_millis() as i64 {
            debug!("Article cache expired ({age}ms old)");
            return None;
        }

        Some(entry.articles)
    }

    /// Persist the list with a fresh timestamp. Never surfaces an error:
    /// a failed cache write only costs the next cold start a network trip.
    pub async fn set_cached_articles(&self, articles: &[Article]) {
        let entry = CachedArticles {
            articles: articles.to_vec(),
            timestamp: Utc::now().timestamp_millis(),
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Error serializing cache: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(CACHE_KEY, &raw).await {
            warn!("Error writing cache: {}", e);
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(CACHE_KEY).await {
            warn!("Error clearing cache: {}", e);
        }
    }

    pub async fn cache_info(&self) -> CacheInfo {
        let raw = match self.store.get(CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            _ => return CacheInfo { cached: false, age: None },
        };
        match serde_json::from_str::<CachedArticles>(&raw) {
            Ok(entry) => {
                let age = Utc::now().timestamp_millis().saturating_sub(entry.timestamp);
                CacheInfo {
                    cached: true,
                    age: Some(Duration::from_millis(age.max(0) as u64)),
                }
            }
            Err(_) => CacheInfo { cached: false, age: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use oddly_storage::MemoryStore;

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Article {}", id),
            summary: "summary".to_string(),
            content: None,
            url: format!("https://example.com/{}", id),
            image_url: None,
            source: "test".to_string(),
            category: "animals".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrips() {
        let store = Arc::new(MemoryStore::new());
        let cache = ArticleCache::new(store);

        assert!(cache.get_cached_articles().await.is_none());

        cache.set_cached_articles(&[article("a"), article("b")]).await;
        let cached = cache.get_cached_articles().await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].id, "a");
        assert_eq!(cached[0].published_at, article("a").published_at);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_none() {
        let store = Arc::new(MemoryStore::new());
        let cache = ArticleCache::with_ttl(store, Duration::ZERO);

        cache.set_cached_articles(&[article("a")]).await;
        // Zero TTL: any nonzero age is already past the deadline
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get_cached_articles().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_timestamp_in_blob_expires() {
        let store = Arc::new(MemoryStore::new());
        let stale = CachedArticles {
            articles: vec![article("a")],
            timestamp: Utc::now().timestamp_millis() - 31 * 60 * 1000,
        };
        store
            .set(CACHE_KEY, &serde_json::to_string(&stale).unwrap())
            .await
            .unwrap();

        let cache = ArticleCache::new(store);
        assert!(cache.get_cached_articles().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_blob_reads_as_none() {
        let store = Arc::new(MemoryStore::new());
        store.set(CACHE_KEY, "{not json").await.unwrap();

        let cache = ArticleCache::new(store);
        assert!(cache.get_cached_articles().await.is_none());
    }

    #[tokio::test]
    async fn test_each_write_replaces_the_whole_blob() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let cache = ArticleCache::new(store.clone());

        cache.set_cached_articles(&[article("a")]).await;
        let first: CachedArticles =
            serde_json::from_str(&store.get(CACHE_KEY).await.unwrap().unwrap()).unwrap();

        cache.set_cached_articles(&[article("b"), article("c")]).await;
        let second: CachedArticles =
            serde_json::from_str(&store.get(CACHE_KEY).await.unwrap().unwrap()).unwrap();

        // The articles and timestamp always come from the same write
        assert_eq!(second.articles.len(), 2);
        assert!(second.timestamp >= first.timestamp);
        assert_eq!(store.keys().await.unwrap(), vec![CACHE_KEY.to_string()]);
    }

    #[tokio::test]
    async fn test_clear_and_info() {
        let store = Arc::new(MemoryStore::new());
        let cache = ArticleCache::new(store);

        let info = cache.cache_info().await;
        assert!(!info.cached);

        cache.set_cached_articles(&[article("a")]).await;
        let info = cache.cache_info().await;
        assert!(info.cached);
        assert!(info.age.unwrap() < Duration::from_secs(5));

        cache.clear().await;
        assert!(cache.get_cached_articles().await.is_none());
        assert!(!cache.cache_info().await.cached);
    }
}
