pub mod api;
pub mod error;
pub mod storage;
pub mod types;

pub use api::ArticleApi;
pub use error::Error;
pub use storage::KeyValueStore;
pub use types::{Article, ArticleStats, CategoryInfo, TrackEvent, ALL_CATEGORIES, CATEGORIES};

pub type Result<T> = std::result::Result<T, Error>;
