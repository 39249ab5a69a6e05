use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single news item as served to the reading UI.
///
/// `published_at` is always a resolved instant: raw date strings only exist
/// inside the API wire types, and anything unparseable is dropped there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub source: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
}

/// Category filter sentinel meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
}

/// The category set is a product decision, not a stable contract; the
/// pipeline treats `Article::category` as an opaque string and this table
/// only drives display.
pub const CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo { id: "all", label: "The Lot", emoji: "✨" },
    CategoryInfo { id: "animals", label: "Beasts", emoji: "🦔" },
    CategoryInfo { id: "viral", label: "Bangers", emoji: "🔥" },
    CategoryInfo { id: "fails", label: "Oops", emoji: "🤦" },
    CategoryInfo { id: "british", label: "Blighty", emoji: "🇬🇧" },
    CategoryInfo { id: "mystery", label: "Huh?", emoji: "👽" },
    CategoryInfo { id: "sport", label: "Mad Lads", emoji: "🏆" },
    CategoryInfo { id: "tech", label: "Bots & Bytes", emoji: "🤖" },
    CategoryInfo { id: "property", label: "Cribs", emoji: "🏠" },
    CategoryInfo { id: "food", label: "Grub", emoji: "🍕" },
    CategoryInfo { id: "crime", label: "Busted", emoji: "🚨" },
    CategoryInfo { id: "world", label: "Far Out", emoji: "🌍" },
];

/// Social-proof counters for one article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleStats {
    pub views: u64,
    #[serde(default)]
    pub reactions: std::collections::HashMap<String, u64>,
}

/// Events reported back to the stats endpoint.
#[derive(Debug, Clone)]
pub enum TrackEvent {
    View,
    Reaction(String),
}

impl TrackEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TrackEvent::View => "view",
            TrackEvent::Reaction(_) => "reaction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn article_roundtrips_published_at() {
        let article = Article {
            id: "a1".to_string(),
            title: "Test Article".to_string(),
            summary: "A test".to_string(),
            content: None,
            url: "https://example.com/a1".to_string(),
            image_url: None,
            source: "test".to_string(),
            category: "animals".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 1, 31, 9, 30, 0).unwrap(),
        };

        let json = serde_json::to_string(&article).unwrap();
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back.published_at, article.published_at);
        assert_eq!(back.url, article.url);
    }

    #[test]
    fn categories_include_the_all_sentinel() {
        assert!(CATEGORIES.iter().any(|c| c.id == ALL_CATEGORIES));
    }
}
