// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use serde_json::Value;

/// Merge reference entries into event metadata under prefixed keys.
///
/// Keys are written as `"{prefix}_{key}"` so entries from different lookups
/// cannot collide with each other or with keys already present. An existing
/// key with the same prefixed name is overwritten.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use the_sluice::utils::merge_with_prefix;
///
/// let mut metadata = HashMap::new();
/// metadata.insert("processed_at".to_string(), serde_json::json!(1.5));
///
/// let mut entry = HashMap::new();
/// entry.insert("site".to_string(), serde_json::json!("north-yard"));
///
/// merge_with_prefix(&mut metadata, "ref", entry);
///
/// assert_eq!(metadata["ref_site"], serde_json::json!("north-yard"));
/// assert_eq!(metadata.len(), 2);
/// ```
pub fn merge_with_prefix(
    metadata: &mut HashMap<String, Value>,
    prefix: &str,
    entries: HashMap<String, Value>,
) {
    for (key, value) in entries {
        let prefixed_key = if prefix.is_empty() {
            key
        } else {
            format!("{}_{}", prefix, key)
        };
        metadata.insert(prefixed_key, value);
    }
}
