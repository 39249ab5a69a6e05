use std::sync::Arc;
use std::time::Duration;

use oddly_core::{Article, ArticleApi, KeyValueStore, ALL_CATEGORIES};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cache::ArticleCache;
use crate::fallback::fallback_articles;

/// Knobs for the orchestrator. Only tests usually touch these.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound on the persistent-cache read during a cold start; some
    /// storage backends can stall indefinitely.
    pub cache_read_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_read_timeout: Duration::from_secs(2),
        }
    }
}

/// Keep only the requested category and sort newest first. Date validity
/// needs no check here: `Article::published_at` is valid by construction.
pub fn filter_by_category(mut articles: Vec<Article>, category: &str) -> Vec<Article> {
    if category != ALL_CATEGORIES {
        articles.retain(|a| a.category == category);
    }
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles
}

/// The fetch orchestrator: composes the process memory cache, the persistent
/// cache, the remote API, and the static fallback into one resilient surface.
///
/// All state is owned here and injected at construction; there are no
/// module-level globals, so every test gets a fresh instance.
pub struct NewsService {
    api: Arc<dyn ArticleApi>,
    cache: Arc<ArticleCache>,
    memory: Arc<RwLock<Vec<Article>>>,
    background: Mutex<Vec<JoinHandle<()>>>,
    config: FetchConfig,
}

impl NewsService {
    pub fn new(api: Arc<dyn ArticleApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(api, ArticleCache::new(store), FetchConfig::default())
    }

    pub fn with_config(api: Arc<dyn ArticleApi>, cache: ArticleCache, config: FetchConfig) -> Self {
        Self {
            api,
            cache: Arc::new(cache),
            memory: Arc::new(RwLock::new(Vec::new())),
            background: Mutex::new(Vec::new()),
            config,
        }
    }

    /// Resolve the article list for a category, cheapest source first:
    ///
    /// 1. process memory cache (no I/O)
    /// 2. persistent cache, read under a bounded wait; a hit also kicks off
    ///    an unawaited network refresh (stale-while-revalidate)
    /// 3. the remote API, persisting the result without blocking on the write
    /// 4. bundled fallback articles
    ///
    /// Infallible by construction: every tier failure falls through, and
    /// tier 4 is static in-process data.
    pub async fn fetch_articles(&self, category: &str) -> Vec<Article> {
        debug!("fetch_articles called, category: {}", category);

        {
            let memory = self.memory.read().await;
            if !memory.is_empty() {
                debug!("Using memory cache: {} articles", memory.len());
                return filter_by_category(memory.clone(), category);
            }
        }

        // A read that loses the race is dropped outright; it does not warm
        // the memory cache late (the next call just retries this tier).
        match timeout(self.config.cache_read_timeout, self.cache.get_cached_articles()).await {
            Ok(Some(articles)) if !articles.is_empty() => {
                debug!("Using persistent cache: {} articles", articles.len());
                *self.memory.write().await = articles.clone();
                self.spawn_background_refresh().await;
                return filter_by_category(articles, category);
            }
            Ok(_) => debug!("No usable persistent cache, continuing to API"),
            Err(_) => warn!("Persistent cache read timed out, continuing to API"),
        }

        match self.api.fetch_articles(category).await {
            Ok(articles) if !articles.is_empty() => {
                info!("API returned {} articles", articles.len());
                *self.memory.write().await = articles.clone();
                // A slow storage write must not delay handing data back
                let cache = self.cache.clone();
                let to_store = articles.clone();
                self.track(tokio::spawn(async move {
                    cache.set_cached_articles(&to_store).await;
                }))
                .await;
                return filter_by_category(articles, category);
            }
            Ok(_) => warn!("API returned no articles"),
            Err(e) => warn!("API fetch failed: {}", e),
        }

        debug!("Using fallback articles");
        filter_by_category(fallback_articles(), category)
    }

    /// Always go to the network, bypassing the server's own cache. On
    /// failure this returns what the memory cache holds (or the fallback) —
    /// callers wanting a "refresh failed" signal compare before and after.
    pub async fn refresh_articles(&self) -> Vec<Article> {
        match self.api.refresh_articles().await {
            Ok(articles) if !articles.is_empty() => {
                info!("Refreshed {} articles", articles.len());
                *self.memory.write().await = articles.clone();
                self.cache.set_cached_articles(&articles).await;
                filter_by_category(articles, ALL_CATEGORIES)
            }
            Ok(_) => {
                warn!("Refresh returned no articles, serving cached data");
                self.current_or_fallback().await
            }
            Err(e) => {
                warn!("Refresh failed: {}, serving cached data", e);
                self.current_or_fallback().await
            }
        }
    }

    /// Look up one article from whatever list the service currently holds.
    pub async fn fetch_article_by_id(&self, id: &str) -> Option<Article> {
        let memory = self.memory.read().await;
        if memory.is_empty() {
            fallback_articles().into_iter().find(|a| a.id == id)
        } else {
            memory.iter().find(|a| a.id == id).cloned()
        }
    }

    /// Whether a usable (non-expired) persistent cache entry exists.
    pub async fn has_offline_data(&self) -> bool {
        self.cache
            .get_cached_articles()
            .await
            .map(|articles| !articles.is_empty())
            .unwrap_or(false)
    }

    /// Await every tracked background task (cache writes, refreshes).
    /// Orderly shutdown and tests use this to observe fire-and-forget
    /// effects deterministically.
    pub async fn drain_background(&self) {
        let handles: Vec<_> = self.background.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    async fn current_or_fallback(&self) -> Vec<Article> {
        let memory = self.memory.read().await;
        if memory.is_empty() {
            filter_by_category(fallback_articles(), ALL_CATEGORIES)
        } else {
            filter_by_category(memory.clone(), ALL_CATEGORIES)
        }
    }

    /// Unawaited full refresh keeping data fresh for the next call without
    /// delaying the current one.
    async fn spawn_background_refresh(&self) {
        let api = self.api.clone();
        let cache = self.cache.clone();
        let memory = self.memory.clone();
        self.track(tokio::spawn(async move {
            match api.fetch_articles(ALL_CATEGORIES).await {
                Ok(articles) if !articles.is_empty() => {
                    debug!("Background refresh fetched {} articles", articles.len());
                    *memory.write().await = articles.clone();
                    cache.set_cached_articles(&articles).await;
                }
                Ok(_) => {}
                Err(e) => debug!("Background refresh failed: {}", e),
            }
        }))
        .await;
    }

    async fn track(&self, handle: JoinHandle<()>) {
        self.background.lock().await.push(handle);
    }
}
