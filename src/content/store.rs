//! In-memory content repository.
//!
//! Backs the binary's content service and serves as the default
//! [`ContentResolver`]. Contents are (re)loaded from the `[[content]]`
//! configuration entries.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::content::{ContentError, ContentResolver, Resource};

/// A thread-safe map of path -> resource.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    inner: Arc<DashMap<String, Resource>>,
}

impl ContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given resources.
    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        let store = Self::new();
        for resource in resources {
            store.insert(resource);
        }
        store
    }

    pub fn insert(&self, resource: Resource) {
        self.inner.insert(resource.path.clone(), resource);
    }

    pub fn get(&self, path: &str) -> Option<Resource> {
        self.inner.get(path).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Replace the store contents with `resources`.
    ///
    /// New entries are upserted before stale ones are dropped, so a path
    /// present in both sets never disappears for concurrent readers.
    pub fn replace(&self, resources: Vec<Resource>) {
        let keep: HashSet<String> = resources.iter().map(|r| r.path.clone()).collect();
        for resource in resources {
            self.insert(resource);
        }
        self.inner.retain(|path, _| keep.contains(path));
        tracing::debug!(resources = self.inner.len(), "Content store replaced");
    }
}

#[async_trait]
impl ContentResolver for ContentStore {
    async fn resolve(&self, path: &str) -> Result<Resource, ContentError> {
        Ok(self.get(path).unwrap_or_else(|| Resource::non_existing(path)))
    }
}
