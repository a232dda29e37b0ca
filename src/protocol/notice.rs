//! Inbound message types.
//!
//! Notices are messages received from the helper: acknowledgments for
//! commands and asynchronously pushed notifications such as `frameReady`.
//! Both share the same wire representation, so they share one type here.
//!
//! # Format
//!
//! ```json
//! {
//!   "type": "frameReady",
//!   "width": 800,
//!   "height": 600,
//!   "data": "..."
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::{Map, Value};

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of `data` characters shown in log previews.
const PREVIEW_DATA_LIMIT: usize = 100;

/// Marker appended to truncated `data` previews.
const TRUNCATION_MARKER: &str = "...(truncated)";

// ============================================================================
// Notice
// ============================================================================

/// A raw inbound message from the helper.
///
/// The `type` discriminator is pulled out; all remaining fields are kept
/// as-is. Use [`Notice::parse`] for typed handling and [`Notice::preview`]
/// for a log-safe rendering.
#[derive(Debug, Clone, Deserialize)]
pub struct Notice {
    /// Message type discriminator. Empty if the helper omitted it.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Remaining message fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Notice {
    /// Parses the notice into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedNotice {
        match self.kind.as_str() {
            "frameReady" => ParsedNotice::FrameReady {
                width: self.get_u32("width"),
                height: self.get_u32("height"),
                data_len: self.data_len(),
            },

            _ => ParsedNotice::Unknown {
                kind: self.kind.clone(),
            },
        }
    }

    /// Renders the notice for logging.
    ///
    /// The rendered form truncates an oversized `data` field; the notice
    /// itself is never modified, so length checks downstream still see the
    /// full payload.
    #[must_use]
    pub fn preview(&self) -> String {
        let mut object = self.fields.clone();
        if !self.kind.is_empty() {
            object.insert("type".to_string(), Value::String(self.kind.clone()));
        }
        preview(&Value::Object(object))
    }

    /// Gets a u32 from the fields.
    ///
    /// Returns 0 if key not found or not a number.
    #[inline]
    fn get_u32(&self, key: &str) -> u32 {
        self.fields
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or_default() as u32
    }

    /// Length of the `data` payload in characters.
    ///
    /// A missing or non-string `data` counts as 0.
    #[inline]
    fn data_len(&self) -> usize {
        self.fields
            .get("data")
            .and_then(Value::as_str)
            .map(|s| s.chars().count())
            .unwrap_or_default()
    }
}

// ============================================================================
// ParsedNotice
// ============================================================================

/// Parsed notice types for type-safe handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedNotice {
    /// A rendered bitmap is available.
    ///
    /// The payload itself is not decoded; only its size is recorded.
    FrameReady {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
        /// Length of the `data` payload in characters.
        data_len: usize,
    },

    /// Unrecognized or absent message type.
    ///
    /// Unknown types are not errors; the collection loop skips them.
    Unknown {
        /// The wire `type` value.
        kind: String,
    },
}

// ============================================================================
// Log Previews
// ============================================================================

/// Renders a message value for logging.
///
/// A string `data` field longer than 100 characters is shown as its first
/// 100 characters plus a truncation marker. All other values pass through
/// unchanged.
#[must_use]
pub fn preview(value: &Value) -> String {
    let Some(object) = value.as_object() else {
        return value.to_string();
    };

    let Some(data) = object.get("data").and_then(Value::as_str) else {
        return value.to_string();
    };

    if data.chars().count() <= PREVIEW_DATA_LIMIT {
        return value.to_string();
    }

    let mut shortened: String = data.chars().take(PREVIEW_DATA_LIMIT).collect();
    shortened.push_str(TRUNCATION_MARKER);

    let mut display = object.clone();
    display.insert("data".to_string(), Value::String(shortened));
    Value::Object(display).to_string()
}

// ============================================================================
// Tests
// ============================================================================
