use std::collections::HashSet;

use oddly_core::Article;
use url::Url;

/// Canonical form of an article link: scheme and query dropped, trailing
/// slash trimmed, `www.` stripped, known domain aliases collapsed so the
/// same story syndicated under two hostnames keys identically.
fn normalize_url_key(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let host = url
                .host_str()
                .unwrap_or_default()
                .trim_start_matches("www.")
                .replace("bbc.co.uk", "bbc.com");
            format!("{}{}", host, url.path().trim_end_matches('/'))
        }
        // Not a parseable URL; fall back to string cleanup so dedup still
        // keys on something stable
        Err(_) => raw
            .split(['?', '#'])
            .next()
            .unwrap_or(raw)
            .trim_end_matches('/')
            .replace("bbc.co.uk", "bbc.com")
            .replace("www.", ""),
    }
}

/// First 3 words of the title, lowercased, punctuation stripped. Aggressive
/// on purpose: two outlets covering the same story rarely agree past the
/// opening words.
fn normalize_title_key(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse near-duplicate articles from overlapping feeds.
///
/// An article is dropped if its canonical URL was already seen, or if its
/// title key matches an earlier article from a different URL. First
/// occurrence wins and output preserves first-seen order, so callers wanting
/// "best first" sort before deduplicating. Idempotent.
///
/// A title that normalizes to the empty string skips title matching rather
/// than sharing one key with every other unusable title; such articles
/// still deduplicate by URL.
pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
    let mut seen_urls = HashSet::new();
    let mut seen_titles = HashSet::new();
    let mut kept = Vec::with_capacity(articles.len());

    for article in articles {
        let url_key = normalize_url_key(&article.url);
        if seen_urls.contains(&url_key) {
            continue;
        }

        let title_key = normalize_title_key(&article.title);
        if !title_key.is_empty() && seen_titles.contains(&title_key) {
            continue;
        }

        // Keys are recorded only for kept articles: a dropped duplicate must
        // not block a later article that shares nothing with a survivor
        seen_urls.insert(url_key);
        if !title_key.is_empty() {
            seen_titles.insert(title_key);
        }
        kept.push(article);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(id: &str, title: &str, url: &str) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            summary: String::new(),
            content: None,
            url: url.to_string(),
            image_url: None,
            source: "test".to_string(),
            category: "animals".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_same_canonical_url_collapses() {
        let out = deduplicate(vec![
            article("a", "Seal pup rescued from storm drain", "https://www.bbc.co.uk/news/x?ref=1"),
            article("b", "Completely different headline here", "https://bbc.com/news/x"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");
    }

    #[test]
    fn test_trailing_slash_and_query_are_ignored() {
        let out = deduplicate(vec![
            article("a", "First story headline words", "https://example.com/story/"),
            article("b", "Second story headline words", "https://example.com/story?utm=feed"),
        ]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_similar_titles_collapse_across_outlets() {
        let out = deduplicate(vec![
            article("a", "Seal pup rescued from storm drain", "https://upi.com/odd/1"),
            article("b", "Seal Pup Rescued From Storm, Drain!!", "https://mirror.co.uk/weird/2"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");
    }

    #[test]
    fn test_first_occurrence_wins_and_order_is_preserved() {
        let out = deduplicate(vec![
            article("a", "Raccoon stows away in car", "https://upi.com/odd/1"),
            article("b", "Dad buys pirate ship on eBay", "https://mirror.co.uk/weird/2"),
            article("c", "Raccoon stows away again somehow", "https://metro.co.uk/weird/3"),
            article("d", "Goat elected honorary mayor", "https://upi.com/odd/4"),
        ]);
        let ids: Vec<&str> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "d"]);
    }

    #[test]
    fn test_idempotent() {
        let input = vec![
            article("a", "Seal pup rescued from storm drain", "https://www.bbc.co.uk/news/x?ref=1"),
            article("b", "Seal Pup Rescued From Storm, Drain!!", "https://mirror.co.uk/weird/2"),
            article("c", "Dad buys pirate ship on eBay", "https://mirror.co.uk/weird/3"),
        ];
        let once = deduplicate(input);
        let twice = deduplicate(once.clone());
        let once_ids: Vec<&str> = once.iter().map(|a| a.id.as_str()).collect();
        let twice_ids: Vec<&str> = twice.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn test_empty_titles_do_not_collapse_into_one() {
        let out = deduplicate(vec![
            article("a", "???", "https://example.com/1"),
            article("b", "!!!", "https://example.com/2"),
            article("c", "", "https://example.com/3"),
        ]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_url_key_normalization() {
        assert_eq!(
            normalize_url_key("https://www.bbc.co.uk/news/x?ref=1"),
            "bbc.com/news/x"
        );
        assert_eq!(normalize_url_key("https://bbc.com/news/x"), "bbc.com/news/x");
        assert_eq!(
            normalize_url_key("not a url at all/"),
            "not a url at all"
        );
    }

    #[test]
    fn test_title_key_normalization() {
        assert_eq!(
            normalize_title_key("Seal Pup Rescued From Storm, Drain!!"),
            "seal pup rescued"
        );
        assert_eq!(normalize_title_key("Two words"), "two words");
        assert_eq!(normalize_title_key("?!?"), "");
    }
}
