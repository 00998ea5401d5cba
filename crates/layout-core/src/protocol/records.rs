//! Serialized layout document shape.
//!
//! These structs mirror the JSON the persistence backend stores, field for
//! field.  They are deliberately loose: strings where the domain has enums,
//! defaults everywhere, so that old or hand-edited records still parse.  All
//! validation happens in [`crate::protocol::codec`] when a record is turned
//! into a [`crate::LayoutDocument`].
//!
//! ```json
//! {
//!   "name": "Lobby",
//!   "description": "",
//!   "type": "custom",
//!   "zones": [{
//!     "id": 1, "zone_name": "Image 1", "display_id": 1,
//!     "position": { "x": 40, "y": 40, "width": 20, "height": 20, "unit": "percentage" },
//!     "content_type": "image", "settings": { "scale": "cover", "duration": 10 },
//!     "z_index": 1, "is_visible": true
//!   }],
//!   "displays": [{
//!     "id": 1, "name": "Display 1", "orientation": "landscape", "primary": true,
//!     "resolution": "1920x1080", "position": { "x": 0, "y": 0 }
//!   }]
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::document::{DisplayOffset, LayoutType};

/// Unit tag written into every zone position.
pub const PERCENTAGE_UNIT: &str = "percentage";

fn default_true() -> bool {
    true
}

fn default_unit() -> String {
    PERCENTAGE_UNIT.to_string()
}

fn default_orientation() -> String {
    "landscape".to_string()
}

fn default_resolution() -> String {
    "1920x1080".to_string()
}

// Explicit `null` reads the same as a missing field.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

fn null_as_unit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_unit))
}

fn null_as_orientation<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_orientation))
}

fn null_as_resolution<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_resolution))
}

/// A whole layout as stored by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type", default)]
    pub layout_type: LayoutType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zones: Vec<ZoneRecord>,
    /// Missing in records written before multi-display support.
    #[serde(default, deserialize_with = "null_as_default")]
    pub displays: Vec<DisplayRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// `0` means "not assigned"; a fresh id is issued on load.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zone_name: String,
    #[serde(default)]
    pub display_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: PositionRecord,
    /// Empty when the record has none; such zones are dropped on load.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(default)]
    pub settings: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub z_index: i32,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: f64,
    #[serde(default = "default_unit", deserialize_with = "null_as_unit")]
    pub unit: String,
}

impl Default for PositionRecord {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            unit: default_unit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default = "default_orientation", deserialize_with = "null_as_orientation")]
    pub orientation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary: bool,
    #[serde(default = "default_resolution", deserialize_with = "null_as_resolution")]
    pub resolution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: DisplayOffset,
}
