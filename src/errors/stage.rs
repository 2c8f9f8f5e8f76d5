// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for pipeline stages and the reference-data collaborator.

use thiserror::Error;

/// Failure inside a pipeline stage.
///
/// The stream processor catches these per event: the affected event is
/// skipped and counted as an error, its siblings in the batch are unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("Stage '{stage}' requires field '{field}' which is missing")]
    MissingField { stage: String, field: String },

    #[error("Stage '{stage}' cannot use field '{field}': {reason}")]
    InvalidField {
        stage: String,
        field: String,
        reason: String,
    },

    #[error("Stage '{stage}' failed: {reason}")]
    Failed { stage: String, reason: String },
}

/// Failure of a reference-data lookup. Enrichers swallow these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("Reference cache unavailable: {0}")]
    Unavailable(String),

    #[error("Reference cache lookup for '{key}' timed out")]
    Timeout { key: String },
}
