//! Persistent per-user snapshot store for shop orders.
//!
//! Snapshots are opaque serialized blobs. The query layer writes one after a
//! fresh fetch and afterwards only ever reads it back.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<String>>;

    /// Insert or replace the snapshot for `user_id`.
    async fn upsert(&self, user_id: &str, blob: &str) -> Result<()>;
}

/// Stores each user's snapshot as `<dir>/orders_<user>.json`.
pub struct JsonFileOrderStore {
    dir: PathBuf,
}

impl JsonFileOrderStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create order cache dir: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn snapshot_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("orders_{}.json", encode_user_id(user_id)))
    }
}

/// File-name-safe, reversible encoding of a user id. ASCII alphanumerics and
/// `-` pass through; every other byte, `_` included, becomes `_XX` (hex).
fn encode_user_id(user_id: &str) -> String {
    let mut out = String::with_capacity(user_id.len());
    for byte in user_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("_{:02X}", byte));
        }
    }
    out
}

#[async_trait]
impl OrderStore for JsonFileOrderStore {
    async fn get(&self, user_id: &str) -> Result<Option<String>> {
        let path = self.snapshot_path(user_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read order snapshot: {}", path.display())),
        }
    }

    async fn upsert(&self, user_id: &str, blob: &str) -> Result<()> {
        let path = self.snapshot_path(user_id);
        // Write then rename so readers never see a half-written snapshot
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob)
            .await
            .with_context(|| format!("Failed to write order snapshot: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace order snapshot: {}", path.display()))?;
        Ok(())
    }
}

/// Process-local store, for tests and one-shot tools.
#[derive(Default)]
pub struct MemoryOrderStore {
    snapshots: Mutex<HashMap<String, String>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn get(&self, user_id: &str) -> Result<Option<String>> {
        let snapshots = self
            .snapshots
            .lock()
            .map_err(|_| anyhow!("order store lock poisoned"))?;
        Ok(snapshots.get(user_id).cloned())
    }

    async fn upsert(&self, user_id: &str, blob: &str) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .lock()
            .map_err(|_| anyhow!("order store lock poisoned"))?;
        snapshots.insert(user_id.to_string(), blob.to_string());
        Ok(())
    }
}
