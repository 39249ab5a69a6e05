use chrono::{TimeZone, Utc};
use oddly_core::Article;

/// Bundled articles served only when network and both caches come up empty,
/// so a first offline launch never shows a hard empty state. Real historical
/// stories, not lorem ipsum.
pub fn fallback_articles() -> Vec<Article> {
    vec![
        Article {
            id: "fallback-1".to_string(),
            title: "Seal Pup Found in Cornwall Garden After Storm".to_string(),
            summary: "A seal pup escaped rough seas, crossed the coastal path, and ended up beside a chicken coop.".to_string(),
            content: None,
            url: "https://www.bbc.co.uk/news/articles/c99k2m78dl2o".to_string(),
            image_url: Some("https://ichef.bbci.co.uk/ace/branded_news/1200/cpsprodpb/86c1/live/33837de0-fd28-11f0-890b-55ca0a00c59d.jpg".to_string()),
            source: "BBC".to_string(),
            category: "animals".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap(),
        },
        Article {
            id: "fallback-2".to_string(),
            title: "Raccoon Stows Away to Belarus in Shipped Car".to_string(),
            summary: "Customs found a raccoon napping on the dashboard. He's now named Senya and loves eggs.".to_string(),
            content: None,
            url: "https://www.upi.com/Odd_News/2026/01/30/belarus-raccoon-stowaway-shipped/7831769792654/".to_string(),
            image_url: Some("https://cdnph.upi.com/ph/st/th/7831769792654/2026/i/17697927912453/v1.5/Raccoon-stows-away-to-Belarus-in-shipped-car.jpg?lg=5".to_string()),
            source: "UPI".to_string(),
            category: "animals".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 1, 30, 0, 0, 0).unwrap(),
        },
        Article {
            id: "fallback-3".to_string(),
            title: "Dad Buys Pirate Ship on eBay for £500, Lives in It".to_string(),
            summary: "Sam Griffiss, 35, converted an eBay pirate ship into an off-grid home by the River Severn.".to_string(),
            content: None,
            url: "https://www.mirror.co.uk/news/weird-news/dad-buys-pirate-ship-ebay-36634191".to_string(),
            image_url: Some("https://i2-prod.mirror.co.uk/article36635314.ece/ALTERNATES/s1200/622779517_10162341983697843_2559324211036302931_n.jpg".to_string()),
            source: "Mirror".to_string(),
            category: "culture".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 1, 29, 0, 0, 0).unwrap(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_nonempty_and_newest_first() {
        let articles = fallback_articles();
        assert_eq!(articles.len(), 3);
        assert!(articles.windows(2).all(|w| w[0].published_at >= w[1].published_at));
    }
}
