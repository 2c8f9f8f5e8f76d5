// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

use crate::errors::StreamError;

use super::unix_now;

/// Closed set of event kinds. The kind selects which pipeline stages apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SensorData,
    UserAction,
    SystemMetric,
    ErrorLog,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::SensorData,
        EventType::UserAction,
        EventType::SystemMetric,
        EventType::ErrorLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::SensorData => "sensor_data",
            EventType::UserAction => "user_action",
            EventType::SystemMetric => "system_metric",
            EventType::ErrorLog => "error_log",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value carried by an event.
///
/// Numbers are kept apart from every other shape so aggregation never has to
/// inspect values at runtime: only `Number` is folded into window statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Flag(bool),
    Text(String),
    Nested(serde_json::Value),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// One record flowing through the engine.
///
/// The identifier is assigned once, either by the producer or on decode when
/// the payload carries none, and cannot be changed afterwards.
///
/// # Example
/// ```
/// use the_sluice::event::{EventType, StreamEvent};
///
/// let event = StreamEvent::new("probe-7", EventType::SensorData)
///     .with_field("value", 21.5)
///     .with_field("unit", "celsius");
///
/// let bytes = event.to_bytes().unwrap();
/// let decoded = StreamEvent::from_bytes(&bytes).unwrap();
/// assert_eq!(decoded.id(), event.id());
/// assert_eq!(decoded.numeric_field("value"), Some(21.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(default = "generate_id")]
    id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: f64,
    #[serde(default)]
    pub data: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StreamEvent {
    /// New event stamped with the current time and a fresh identifier.
    pub fn new(source: impl Into<String>, event_type: EventType) -> Self {
        Self::with_id(generate_id(), source, event_type)
    }

    /// New event with a caller-supplied identifier.
    pub fn with_id(id: impl Into<String>, source: impl Into<String>, event_type: EventType) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            event_type,
            timestamp: unix_now(),
            data: BTreeMap::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        self.data.get(name).and_then(FieldValue::as_number)
    }

    /// Numeric fields only, in name order.
    pub fn numeric_fields(&self) -> impl Iterator<Item = (&str, f64)> {
        self.data
            .iter()
            .filter_map(|(name, value)| value.as_number().map(|n| (name.as_str(), n)))
    }

    /// Seconds elapsed between the event timestamp and `now`.
    pub fn age(&self, now: f64) -> f64 {
        now - self.timestamp
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StreamError> {
        serde_json::to_vec(self).map_err(|source| StreamError::Encode {
            event_id: self.id.clone(),
            source,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StreamError> {
        serde_json::from_slice(bytes).map_err(StreamError::Decode)
    }
}
