// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::CacheError;
use crate::traits::{ReferenceCache, ReferenceEntry};

/// Process-local reference data, shared by every enricher that holds it.
#[derive(Debug, Default)]
pub struct InMemoryReferenceCache {
    entries: RwLock<HashMap<String, ReferenceEntry>>,
}

impl InMemoryReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, key: impl Into<String>, entry: ReferenceEntry) {
        self.entries.write().await.insert(key.into(), entry);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl From<HashMap<String, ReferenceEntry>> for InMemoryReferenceCache {
    fn from(entries: HashMap<String, ReferenceEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl ReferenceCache for InMemoryReferenceCache {
    async fn lookup(&self, key: &str) -> Result<Option<ReferenceEntry>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}
