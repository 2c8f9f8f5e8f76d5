// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CacheError;

/// Reference entries returned for one key.
pub type ReferenceEntry = HashMap<String, serde_json::Value>;

/// Lookup collaborator used by reference-data enrichment.
///
/// `Ok(None)` is a miss. Errors are reported to the enricher, which logs them
/// and lets the event through unenriched.
#[async_trait]
pub trait ReferenceCache: Send + Sync {
    async fn lookup(&self, key: &str) -> Result<Option<ReferenceEntry>, CacheError>;
}
