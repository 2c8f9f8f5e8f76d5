// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded, backpressure-aware ingestion buffer.
//!
//! The buffer sits between producers and the stream processor workers. It
//! enforces a hard capacity and signals overload by rejecting new items
//! (never by evicting old ones). An optional `ResizePolicy` turns it into the
//! adaptive variant, which grows capacity under sustained pressure.

mod ingestion;
mod policy;

pub use ingestion::{BufferStats, IngestionBuffer};
pub use policy::ResizePolicy;
