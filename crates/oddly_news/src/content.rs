use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use oddly_core::{ArticleApi, KeyValueStore};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub const CONTENT_CACHE_PREFIX: &str = "oddly_content_";

/// Full text is expensive to extract and far more stable than headline
/// metadata, so it lives a week instead of half an hour.
pub const CONTENT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const MAX_MEMORY_ENTRIES: usize = 20;
const PRELOAD_LIMIT: usize = 10;
const PRELOAD_BATCH_SIZE: usize = 5;
const PRELOAD_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, Deserialize)]
struct CachedContent {
    content: String,
    timestamp: i64,
}

/// Fixed-capacity window over the hottest entries. Eviction is
/// oldest-inserted-first, O(1); access order is deliberately not tracked.
struct MemoryWindow {
    entries: HashMap<String, String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl MemoryWindow {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, url: &str) -> Option<String> {
        self.entries.get(url).cloned()
    }

    fn insert(&mut self, url: &str, content: &str) {
        if let Some(existing) = self.entries.get_mut(url) {
            // Re-insert keeps the original queue position
            *existing = content.to_string();
            return;
        }
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(url.to_string());
        self.entries.insert(url.to_string(), content.to_string());
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

fn content_key(url: &str) -> String {
    format!("{}{}", CONTENT_CACHE_PREFIX, urlencoding::encode(url))
}

/// Per-URL cache for extracted article text: persistent entries with their
/// own TTL, fronted by a small in-memory window.
pub struct ContentCache {
    store: Arc<dyn KeyValueStore>,
    memory: Mutex<MemoryWindow>,
    ttl: Duration,
}

impl ContentCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, CONTENT_TTL, MAX_MEMORY_ENTRIES)
    }

    pub fn with_config(store: Arc<dyn KeyValueStore>, ttl: Duration, capacity: usize) -> Self {
        Self {
            store,
            memory: Mutex::new(MemoryWindow::new(capacity)),
            ttl,
        }
    }

    /// Memory first (no I/O), then the persistent store; a persistent hit
    /// backfills the memory window. Expired entries are removed on read.
    pub async fn get_cached_content(&self, url: &str) -> Option<String> {
        if let Some(content) = self.memory.lock().await.get(url) {
            return Some(content);
        }

        let key = content_key(url);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!("Error reading content cache: {}", e);
                return None;
            }
        };

        let entry: CachedContent = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding malformed content cache entry: {}", e);
                return None;
            }
        };

        let age = Utc::now().timestamp_millis().saturating_sub(entry.timestamp);
        if age > self.ttl.as_millis() as i64 {
            if let Err(e) = self.store.remove(&key).await {
                debug!("Error removing expired content: {}", e);
            }
            return None;
        }

        self.memory.lock().await.insert(url, &entry.content);
        Some(entry.content)
    }

    pub async fn set_cached_content(&self, url: &str, content: &str) {
        let entry = CachedContent {
            content: content.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };
        match serde_json::to_string(&entry) {
            Ok(raw) => {
                if let Err(e) = self.store.set(&content_key(url), &raw).await {
                    warn!("Error writing content cache: {}", e);
                }
            }
            Err(e) => warn!("Error serializing content cache: {}", e),
        }
        self.memory.lock().await.insert(url, content);
    }

    /// Remove every persistent content entry and empty the memory window.
    /// Returns how many entries were removed.
    pub async fn clear_content_cache(&self) -> usize {
        let mut cleared = 0;
        match self.store.keys().await {
            Ok(keys) => {
                for key in keys.iter().filter(|k| k.starts_with(CONTENT_CACHE_PREFIX)) {
                    match self.store.remove(key).await {
                        Ok(()) => cleared += 1,
                        Err(e) => warn!("Error removing {}: {}", key, e),
                    }
                }
            }
            Err(e) => warn!("Error listing content cache keys: {}", e),
        }
        self.memory.lock().await.clear();
        info!("Cleared {} cached articles", cleared);
        cleared
    }

    /// Warm the cache for the top of a freshly sorted article list.
    ///
    /// Takes the first 10 URLs, skips anything already cached, and fetches
    /// the rest in batches of 5 concurrent requests with a 5s per-request
    /// timeout. Best-effort throughout: a slow or failing origin is skipped,
    /// and nothing here ever surfaces an error to the caller.
    pub async fn preload_article_content(&self, urls: &[String], api: &dyn ArticleApi) {
        let mut uncached = Vec::new();
        for url in urls.iter().take(PRELOAD_LIMIT) {
            if self.get_cached_content(url).await.is_none() {
                uncached.push(url.clone());
            }
        }

        if uncached.is_empty() {
            return;
        }
        debug!("Preloading content for {} articles", uncached.len());

        for batch in uncached.chunks(PRELOAD_BATCH_SIZE) {
            let fetches = batch.iter().map(|url| async move {
                match timeout(PRELOAD_FETCH_TIMEOUT, api.fetch_content(url)).await {
                    Ok(Ok(content)) if !content.is_empty() => {
                        self.set_cached_content(url, &content).await;
                    }
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => debug!("Preload failed for {}: {}", url, e),
                    Err(_) => debug!("Preload timed out for {}", url),
                }
            });
            // Next batch starts only once this one has fully settled
            join_all(fetches).await;
        }
    }
}
