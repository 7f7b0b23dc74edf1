//! In-memory [`ContentStore`] backed by hash maps.
//!
//! Intended for tests and local experiments: rows and objects are seeded up
//! front, and every patch a scan run applies is recorded in order so a test
//! can assert exactly what was persisted. Updates can be switched to fail to
//! exercise the persistence error paths.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ContentStore, DocumentPatch, DocumentRow, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: HashMap<String, DocumentRow>,
    objects: HashMap<String, Vec<u8>>,
    patches: HashMap<String, Vec<DocumentPatch>>,
    fail_updates: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_document(&self, id: impl Into<String>, row: DocumentRow) {
        self.lock().documents.insert(id.into(), row);
    }

    pub fn put_object(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.lock().objects.insert(path.into(), bytes);
    }

    /// Make every subsequent `update_document` fail with HTTP 500.
    pub fn fail_updates(&self, fail: bool) {
        self.lock().fail_updates = fail;
    }

    /// Every patch applied to `id`, in application order.
    pub fn patches(&self, id: &str) -> Vec<DocumentPatch> {
        self.lock().patches.get(id).cloned().unwrap_or_default()
    }

    /// The most recent patch applied to `id`.
    pub fn last_patch(&self, id: &str) -> Option<DocumentPatch> {
        self.lock().patches.get(id).and_then(|v| v.last().cloned())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("MemoryStore mutex poisoned")
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_document(&self, id: &str) -> Result<DocumentRow, StoreError> {
        self.lock()
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_document(&self, id: &str, patch: &DocumentPatch) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_updates {
            return Err(StoreError::RequestFailed {
                status: 500,
                body: "updates disabled".into(),
            });
        }
        inner
            .patches
            .entry(id.to_string())
            .or_default()
            .push(patch.clone());
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.lock()
            .objects
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}
