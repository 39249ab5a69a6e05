use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use oddly_core::{Article, ArticleApi, ArticleStats, Error, Result, TrackEvent, ALL_CATEGORIES};
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://oddly-enough-api.vercel.app";

// The server can be slow on a cache miss; refresh bypasses its cache and
// gets a little longer.
const FETCH_TIMEOUT: Duration = Duration::from_secs(8);
const REFRESH_TIMEOUT: Duration = Duration::from_secs(10);
const CONTENT_TIMEOUT: Duration = Duration::from_secs(5);
const STATS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    articles: Vec<WireArticle>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    stats: HashMap<String, ArticleStats>,
}

/// An article as it crosses the wire. Dates arrive as strings and lose their
/// type in JSON, so they are re-parsed here; everything unparseable is
/// dropped before an `Article` exists.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireArticle {
    id: String,
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    content: Option<String>,
    url: String,
    #[serde(default)]
    image_url: Option<String>,
    source: String,
    category: String,
    published_at: String,
}

impl WireArticle {
    fn normalize(self) -> Option<Article> {
        let published_at = parse_published_at(&self.published_at)?;
        Some(Article {
            id: self.id,
            title: self.title,
            summary: self.summary,
            content: self.content,
            url: self.url,
            image_url: self.image_url,
            source: self.source,
            category: self.category,
            published_at,
        })
    }
}

fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Some feeds publish date-only stamps
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
    }
    None
}

fn normalize_articles(wire: Vec<WireArticle>) -> Vec<Article> {
    let total = wire.len();
    let articles: Vec<Article> = wire.into_iter().filter_map(WireArticle::normalize).collect();
    if articles.len() < total {
        debug!(
            "Dropped {} articles with unparseable dates",
            total - articles.len()
        );
    }
    articles
}

/// HTTP client for the article API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_article_list(&self, url: String, limit: Duration) -> Result<Vec<Article>> {
        debug!("Fetching: {}", url);
        // One timeout around the whole exchange; dropping the future on
        // expiry aborts the in-flight request rather than orphaning it.
        let body = timeout(limit, async {
            let response = self.client.get(url.as_str()).send().await?;
            if !response.status().is_success() {
                return Err(Error::Api(format!("API error: {}", response.status())));
            }
            let body: ArticlesResponse = response.json().await?;
            Ok(body)
        })
        .await
        .map_err(|_| Error::Api(format!("Request timed out: {}", url)))??;

        Ok(normalize_articles(body.articles))
    }
}

#[async_trait]
impl ArticleApi for ApiClient {
    async fn fetch_articles(&self, category: &str) -> Result<Vec<Article>> {
        let url = if category == ALL_CATEGORIES {
            format!("{}/api/articles", self.base_url)
        } else {
            format!("{}/api/articles?category={}", self.base_url, category)
        };
        self.get_article_list(url, FETCH_TIMEOUT).await
    }

    async fn refresh_articles(&self) -> Result<Vec<Article>> {
        let url = format!("{}/api/articles?refresh=true", self.base_url);
        self.get_article_list(url, REFRESH_TIMEOUT).await
    }

    async fn fetch_content(&self, article_url: &str) -> Result<String> {
        let url = format!(
            "{}/api/content?url={}",
            self.base_url,
            urlencoding::encode(article_url)
        );
        let body = timeout(CONTENT_TIMEOUT, async {
            let response = self.client.get(url.as_str()).send().await?;
            if !response.status().is_success() {
                return Err(Error::Api(format!("Content error: {}", response.status())));
            }
            let body: ContentResponse = response.json().await?;
            Ok(body)
        })
        .await
        .map_err(|_| Error::Api(format!("Content request timed out: {}", article_url)))??;

        Ok(body.content)
    }

    async fn fetch_stats(&self, ids: &[String]) -> Result<HashMap<String, ArticleStats>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let url = format!("{}/api/stats?ids={}", self.base_url, ids.join(","));
        let body = timeout(STATS_TIMEOUT, async {
            let response = self.client.get(url.as_str()).send().await?;
            if !response.status().is_success() {
                return Err(Error::Api(format!("Stats error: {}", response.status())));
            }
            let body: StatsResponse = response.json().await?;
            Ok(body)
        })
        .await
        .map_err(|_| Error::Api("Stats request timed out".to_string()))??;

        Ok(body.stats)
    }

    async fn track_event(&self, article_id: &str, event: TrackEvent) -> Result<()> {
        let mut payload = serde_json::json!({
            "articleId": article_id,
            "event": event.name(),
        });
        if let TrackEvent::Reaction(ref emoji) = event {
            payload["reaction"] = serde_json::Value::String(emoji.clone());
        }

        // Best-effort: tracking must never break the reading experience
        let url = format!("{}/api/track", self.base_url);
        if let Err(e) = self.client.post(url.as_str()).json(&payload).send().await {
            warn!("Track failed: {}", e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_published_at() {
        assert!(parse_published_at("2026-01-31T09:30:00Z").is_some());
        assert!(parse_published_at("2026-01-31T09:30:00+01:00").is_some());
        assert!(parse_published_at("2026-01-31").is_some());
        assert!(parse_published_at("not a date").is_none());
        assert!(parse_published_at("").is_none());
    }

    #[test]
    fn test_rfc3339_round_trips_the_instant() {
        let parsed = parse_published_at("2026-01-31T09:30:00+01:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 31, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_unparseable_dates_are_dropped() {
        let raw = r#"{
            "articles": [
                {
                    "id": "a1",
                    "title": "Seal Pup Found in Garden",
                    "summary": "A seal pup turned up beside a chicken coop.",
                    "url": "https://example.com/seal",
                    "source": "BBC",
                    "category": "animals",
                    "publishedAt": "2026-01-31T00:00:00Z"
                },
                {
                    "id": "a2",
                    "title": "Broken Date Article",
                    "summary": "This one never reaches the UI.",
                    "url": "https://example.com/broken",
                    "source": "UPI",
                    "category": "viral",
                    "publishedAt": "yesterday-ish"
                }
            ]
        }"#;

        let body: ArticlesResponse = serde_json::from_str(raw).unwrap();
        let articles = normalize_articles(body.articles);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "a1");
        assert_eq!(articles[0].content, None);
    }
}
