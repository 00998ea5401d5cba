//! Conversion between [`LayoutDocument`] and its serialized [`LayoutRecord`].
//!
//! Writing is exact.  Reading is forgiving: a record that breaks a document
//! invariant is repaired rather than rejected, and every repair is logged at
//! `warn` level.  The only hard failure is JSON that does not parse at all.

use thiserror::Error;
use tracing::warn;

use crate::domain::document::{Display, LayoutDocument, Orientation, Zone};
use crate::domain::geometry::Rect;
use crate::domain::ids::{DisplayId, ZoneId};
use crate::domain::settings::{ContentSettings, ContentType};
use crate::domain::units::Resolution;
use crate::protocol::records::{DisplayRecord, LayoutRecord, PositionRecord, ZoneRecord, PERCENTAGE_UNIT};

/// Errors that can occur while encoding or decoding a layout document.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The input is not valid JSON or does not have the layout shape.
    #[error("malformed layout document: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serializes `doc` into pretty-printed JSON.
pub fn encode_document(doc: &LayoutDocument) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string_pretty(&doc.to_record())?)
}

/// Parses JSON into a repaired [`LayoutDocument`].
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] when `json` is not a layout object.
/// Invariant violations inside a well-formed record are repaired, not reported.
pub fn decode_document(json: &str) -> Result<LayoutDocument, ProtocolError> {
    let record: LayoutRecord = serde_json::from_str(json)?;
    Ok(LayoutDocument::from_record(record))
}

impl LayoutDocument {
    /// Snapshots the document in its wire shape.
    ///
    /// Editor-only state (selection, current display) is not included.
    pub fn to_record(&self) -> LayoutRecord {
        LayoutRecord {
            name: self.name().to_string(),
            description: self.description().to_string(),
            layout_type: self.layout_type(),
            zones: self.zones().iter().map(zone_to_record).collect(),
            displays: self.displays().iter().map(display_to_record).collect(),
        }
    }

    /// Builds a document from a persisted record, repairing what it must.
    ///
    /// - no displays: a primary "Display 1" is synthesized and every zone
    ///   becomes an all-displays zone;
    /// - no primary, or several: the first display wins;
    /// - repeated ids: the first holder keeps it, later ones get fresh ids;
    /// - out-of-range geometry: clamped;
    /// - unknown content type: the zone is dropped.
    pub fn from_record(record: LayoutRecord) -> Self {
        let synthesize_display = record.displays.is_empty();
        if synthesize_display {
            warn!("layout {:?} has no displays, synthesizing a primary display", record.name);
        }

        let displays: Vec<Display> = record.displays.into_iter().map(display_from_record).collect();
        let zones: Vec<Zone> = record
            .zones
            .into_iter()
            .filter_map(|z| zone_from_record(z, synthesize_display))
            .collect();

        LayoutDocument::from_parts(record.name, record.description, record.layout_type, displays, zones)
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn zone_to_record(zone: &Zone) -> ZoneRecord {
    ZoneRecord {
        id: zone.id.0,
        zone_name: zone.name.clone(),
        display_id: zone.display_id.map(|id| id.0),
        position: PositionRecord {
            x: zone.rect.x,
            y: zone.rect.y,
            width: zone.rect.width,
            height: zone.rect.height,
            unit: PERCENTAGE_UNIT.to_string(),
        },
        content_type: zone.content_type().as_str().to_string(),
        settings: zone.settings.to_wire(),
        z_index: zone.z_index,
        is_visible: zone.is_visible,
        content_id: zone.content_id,
        playlist_id: zone.playlist_id,
    }
}

fn display_to_record(display: &Display) -> DisplayRecord {
    DisplayRecord {
        id: display.id.0,
        name: display.name.clone(),
        orientation: display.orientation.as_str().to_string(),
        primary: display.primary,
        resolution: display.resolution.to_string(),
        position: display.position,
    }
}

fn zone_from_record(record: ZoneRecord, drop_display: bool) -> Option<Zone> {
    let Some(content_type) = ContentType::parse(&record.content_type) else {
        warn!(
            "dropping zone {} with unknown content type {:?}",
            record.id, record.content_type
        );
        return None;
    };

    if record.position.unit != PERCENTAGE_UNIT {
        warn!(
            "zone {} position unit {:?} read as percentage",
            record.id, record.position.unit
        );
    }
    let raw = Rect::new(
        record.position.x,
        record.position.y,
        record.position.width,
        record.position.height,
    );
    let rect = raw.clamped();
    if rect != raw {
        warn!("zone {} geometry {:?} clamped to {:?}", record.id, raw, rect);
    }

    Some(Zone {
        id: ZoneId(record.id),
        name: record.zone_name,
        display_id: if drop_display { None } else { record.display_id.map(DisplayId) },
        rect,
        settings: ContentSettings::from_wire(content_type, &record.settings),
        z_index: record.z_index,
        is_visible: record.is_visible,
        content_id: record.content_id,
        playlist_id: record.playlist_id,
    })
}

fn display_from_record(record: DisplayRecord) -> Display {
    let orientation = Orientation::parse(&record.orientation).unwrap_or_else(|| {
        warn!(
            "display {} has unknown orientation {:?}, using landscape",
            record.id, record.orientation
        );
        Orientation::Landscape
    });
    let resolution = record.resolution.parse::<Resolution>().unwrap_or_else(|e| {
        warn!("display {}: {e}, using {}", record.id, Resolution::FULL_HD);
        Resolution::FULL_HD
    });

    Display {
        id: DisplayId(record.id),
        name: record.name,
        orientation,
        primary: record.primary,
        resolution,
        position: record.position,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
