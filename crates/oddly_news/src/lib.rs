pub mod api;
pub mod cache;
pub mod content;
pub mod dedup;
pub mod fallback;
pub mod service;

pub use api::ApiClient;
pub use cache::{ArticleCache, CacheInfo};
pub use content::ContentCache;
pub use dedup::deduplicate;
pub use fallback::fallback_articles;
pub use service::{filter_by_category, FetchConfig, NewsService};

pub mod prelude {
    pub use crate::{deduplicate, ApiClient, ArticleCache, ContentCache, NewsService};
    pub use oddly_core::{Article, ArticleApi, Error, KeyValueStore, Result};
}
