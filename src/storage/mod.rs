//! Keyed document persistence.
//!
//! The backing store only knows whole documents: a collection is read with
//! `get` and rewritten with `put`. Last writer wins.

mod file;
mod repositories;

pub use file::FileDocumentStore;
pub use repositories::{AddressRepository, CartRepository, OrderRepository};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored document is not valid: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn put(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if key.is_empty() { return Err(StorageError::InvalidKey(key.to_string())); }
        self.documents.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory store whose writes can be switched off.
    #[derive(Debug, Default)]
    pub struct FlakyStore {
        inner: MemoryDocumentStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        pub fn set_failing(&self, failing: bool) { self.fail_writes.store(failing, Ordering::SeqCst); }
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: Value) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("write rejected".into()));
            }
            self.inner.put(key, value).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_store_put_get() {
        let store = MemoryDocumentStore::new();
        assert!(store.get("k").await.unwrap().is_none());
        store.put("k", json!([1, 2])).await.unwrap();
        store.put("k", json!([3])).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!([3])));
        assert!(matches!(store.put("", json!(null)).await, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_arc_dyn_store() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        store.put("k", json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap()["a"], 1);
    }
}
