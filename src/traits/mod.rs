// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod reference_cache;
pub mod stage;

pub use reference_cache::{ReferenceCache, ReferenceEntry};
pub use stage::{Stage, StageKind};
