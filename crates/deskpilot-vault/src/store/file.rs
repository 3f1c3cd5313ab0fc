//! JSON file store.

use async_trait::async_trait;
use deskpilot_protocols::{KeyValueStore, StoreError};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

type Document = BTreeMap<String, String>;

/// Stores every key in one JSON document.
///
/// Every read-modify-write holds an advisory lock on a sibling `.lock`
/// file, so stores in other processes (or other instances in this one)
/// pointed at the same document do not overwrite each other. Writes go to
/// a uniquely named temp file that is then renamed over the original, so a
/// crash never leaves a half-written document. The file and its directory
/// are created on the first write.
#[derive(Debug)]
pub struct FileStore {
    path: Arc<PathBuf>,
    lock: Mutex<()>,
}

#[derive(Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` on the document under the file lock, off the async runtime.
    async fn with_document<T, F>(&self, mode: LockMode, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, StoreError> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let _lock = lock_file(&path, mode)?;
            op(&path)
        })
        .await
        .map_err(|e| StoreError::Storage(format!("store task failed: {}", e)))?
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

/// Open and lock the document's lock file. The lock is released when the
/// returned handle is dropped.
fn lock_file(path: &Path, mode: LockMode) -> Result<File, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path(path))?;
    match mode {
        LockMode::Shared => file.lock_shared()?,
        LockMode::Exclusive => file.lock()?,
    }
    Ok(file)
}

fn read_document(path: &Path) -> Result<Document, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(Document::new()),
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Created with owner-only permissions on unix.
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(&serde_json::to_vec_pretty(doc)?)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!("Wrote {} keys to {}", doc.len(), path.display());
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.with_document(LockMode::Shared, move |path| {
            Ok(read_document(path)?.remove(&key))
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.with_document(LockMode::Exclusive, move |path| {
            let mut doc = read_document(path)?;
            doc.insert(key, value);
            write_document(path, &doc)
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.with_document(LockMode::Exclusive, move |path| {
            let mut doc = read_document(path)?;
            if doc.remove(&key).is_some() {
                write_document(path, &doc)?;
            }
            Ok(())
        })
        .await
    }
}
