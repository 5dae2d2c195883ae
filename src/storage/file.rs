use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{DocumentStore, StorageError};

/// One JSON file per key. Each write goes to its own temporary file that is
/// renamed over the old document, so a reader sees either the old or the new
/// collection and concurrent writers never share a temp file.
#[derive(Clone, Debug)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path { &self.root }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() { return Err(StorageError::InvalidKey(key.to_string())); }
        Ok(self.root.join(format!("{}.json", encode_key(key))))
    }
}

/// Keeps ASCII alphanumerics and `-`; every other byte becomes `_xx`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("_{byte:02x}"));
        }
    }
    out
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        let bytes = serde_json::to_vec_pretty(&value)?;
        let written = match tokio::fs::write(&tmp, bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::debug!(key, path = %path.display(), "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_encoding_is_injective() {
        assert_eq!(encode_key("addresses_u1"), "addresses_5fu1");
        assert_eq!(encode_key("a@b.c"), "a_40b_2ec");
        assert_ne!(encode_key("a_40"), encode_key("a@"));
        assert_eq!(encode_key("../x"), "_2e_2e_2fx");
    }

    #[tokio::test]
    async fn test_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::open(dir.path().join("data")).await.unwrap();
        assert!(store.get("orders").await.unwrap().is_none());
        store.put("orders", json!([{"id": 1}])).await.unwrap();
        store.put("orders", json!([{"id": 2}])).await.unwrap();
        assert_eq!(store.get("orders").await.unwrap(), Some(json!([{"id": 2}])));
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 1);

        let reopened = FileDocumentStore::open(dir.path().join("data")).await.unwrap();
        assert_eq!(reopened.get("orders").await.unwrap(), Some(json!([{"id": 2}])));
    }

    #[tokio::test]
    async fn test_concurrent_writers_to_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(FileDocumentStore::open(dir.path()).await.unwrap());
        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.put("cart_u1", json!({"n": i})).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }
        let n = store.get("cart_u1").await.unwrap().unwrap()["n"].as_i64().unwrap();
        assert!((0..16).contains(&n));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), b"{not json").unwrap();
        assert!(matches!(store.get("broken").await, Err(StorageError::Serialization(_))));
        assert!(matches!(store.get("").await, Err(StorageError::InvalidKey(_))));
    }
}
