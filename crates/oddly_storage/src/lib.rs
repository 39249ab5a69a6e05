use std::path::Path;
use std::sync::Arc;

use oddly_core::{Error, KeyValueStore, Result};

pub mod backends;

pub use backends::*;

/// Build a store by backend name, as selected on the CLI.
pub async fn create_store(name: &str, db_path: &Path) -> Result<Arc<dyn KeyValueStore>> {
    match name {
        "memory" => Ok(Arc::new(backends::MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(
            backends::SqliteStore::new_with_path(db_path).await?,
        )),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(Error::Storage(
            "sqlite backend not compiled in (enable the `sqlite` feature)".to_string(),
        )),
        other => Err(Error::Storage(format!("Unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use oddly_core::KeyValueStore;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_store_by_name() {
        let store = create_store("memory", Path::new("unused.db")).await.unwrap();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        assert!(create_store("etcd", Path::new("unused.db")).await.is_err());
    }
}
