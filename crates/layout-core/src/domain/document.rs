//! Layout document: displays, zones and every operation that mutates them.
//!
//! A [`LayoutDocument`] describes one multi-screen presentation.  It owns an
//! ordered list of displays (tab order) and a collection of zones, each zone
//! optionally bound to one display.
//!
//! The document is the sole owner of the layout invariants:
//!
//! - every zone rectangle is valid (see [`Rect::is_valid`]);
//! - zone ids and display ids are unique;
//! - there is always at least one display and exactly one primary display;
//! - `current_display_index` always points at an existing display.
//!
//! Every mutating operation re-establishes these before it returns.  Operations
//! that name a zone or display that no longer exists are no-ops rather than
//! errors: the UI can race a deletion (a zone removed while it is being
//! dragged) and that is not a failure.
//!
//! # Orphaned zones
//!
//! Removing a display does not delete its zones.  They keep their stale
//! `display_id` and simply stop matching any display filter.  Zones with no
//! `display_id` at all are legacy "all displays" zones and match every filter.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::geometry::{Point, Rect, DEFAULT_ZONE_SIZE};
use super::ids::{DisplayId, IdAllocator, ZoneId};
use super::settings::{defaults_for, ContentSettings, ContentType, SettingsPatch};
use super::units::Resolution;

/// Invariant violations reported by [`LayoutDocument::check_invariants`].
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// A zone rectangle breaks the containment rules.
    #[error("{0} has an invalid rectangle")]
    InvalidGeometry(ZoneId),

    /// Two zones share an id.
    #[error("duplicate zone id {0}")]
    DuplicateZoneId(ZoneId),

    /// Two displays share an id.
    #[error("duplicate display id {0}")]
    DuplicateDisplayId(DisplayId),

    /// The document has no displays.
    #[error("layout has no displays")]
    NoDisplays,

    /// The number of primary displays is not exactly one.
    #[error("expected exactly one primary display, found {0}")]
    PrimaryCount(usize),

    /// `current_display_index` does not point at a display.
    #[error("current display index {index} out of range for {len} displays")]
    DisplayIndexOutOfRange { index: usize, len: usize },
}

/// Kind of layout.  Only `custom` layouts are edited zone by zone; the other
/// values are carried through for backends that use preset templates.
///
/// Unrecognised or missing names read as `custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    #[default]
    Custom,
    Fullscreen,
    SplitScreen,
    Grid,
}

impl LayoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutType::Custom => "custom",
            LayoutType::Fullscreen => "fullscreen",
            LayoutType::SplitScreen => "split_screen",
            LayoutType::Grid => "grid",
        }
    }

    /// Parses a wire name, falling back to `Custom`.
    pub fn parse_or_custom(name: &str) -> LayoutType {
        match name.trim().to_ascii_lowercase().as_str() {
            "fullscreen" => LayoutType::Fullscreen,
            "split_screen" => LayoutType::SplitScreen,
            "grid" => LayoutType::Grid,
            _ => LayoutType::Custom,
        }
    }
}

impl<'de> Deserialize<'de> for LayoutType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name.as_deref().map_or(LayoutType::Custom, LayoutType::parse_or_custom))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }

    pub fn parse(name: &str) -> Option<Orientation> {
        match name.trim().to_ascii_lowercase().as_str() {
            "landscape" => Some(Orientation::Landscape),
            "portrait" => Some(Orientation::Portrait),
            _ => None,
        }
    }
}

/// Offset of a display relative to the primary display, in pixels.
///
/// Informational only: nothing in the editor enforces it geometrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOffset {
    pub x: i32,
    pub y: i32,
}

/// One virtual screen of a multi-screen layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub id: DisplayId,
    pub name: String,
    pub orientation: Orientation,
    pub primary: bool,
    pub resolution: Resolution,
    pub position: DisplayOffset,
}

/// A rectangular region bound to one content source.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// `None` marks a legacy zone that belongs to every display.
    pub display_id: Option<DisplayId>,
    pub rect: Rect,
    pub settings: ContentSettings,
    /// Stacking order; higher is drawn on top.  Ties fall back to creation order.
    pub z_index: i32,
    pub is_visible: bool,
    pub content_id: Option<i64>,
    pub playlist_id: Option<i64>,
}

impl Zone {
    pub fn content_type(&self) -> ContentType {
        self.settings.content_type()
    }

    /// Returns `true` if this zone is shown when `display` is active.
    pub fn is_on_display(&self, display: DisplayId) -> bool {
        self.display_id.map_or(true, |id| id == display)
    }
}

/// Partial update merged into an existing zone by [`LayoutDocument::update_zone`].
///
/// `None` leaves a field alone.  The double `Option`s distinguish "leave
/// alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneUpdate {
    pub name: Option<String>,
    pub display_id: Option<Option<DisplayId>>,
    pub rect: Option<Rect>,
    pub content_type: Option<ContentType>,
    pub settings: Option<SettingsPatch>,
    pub z_index: Option<i32>,
    pub is_visible: Option<bool>,
    pub content_id: Option<Option<i64>>,
    pub playlist_id: Option<Option<i64>>,
}

impl ZoneUpdate {
    /// An update that only replaces the rectangle.
    pub fn with_rect(rect: Rect) -> Self {
        Self {
            rect: Some(rect),
            ..Self::default()
        }
    }
}

/// Partial update for display metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayUpdate {
    pub name: Option<String>,
    pub orientation: Option<Orientation>,
    pub resolution: Option<Resolution>,
    pub position: Option<DisplayOffset>,
}

/// The in-memory layout being edited.
#[derive(Debug, Clone)]
pub struct LayoutDocument {
    name: String,
    description: String,
    layout_type: LayoutType,
    displays: Vec<Display>,
    /// Kept in creation order.
    zones: Vec<Zone>,
    current_display_index: usize,
    selected_zone: Option<ZoneId>,
    zone_ids: IdAllocator<ZoneId>,
    display_ids: IdAllocator<DisplayId>,
}

impl Default for LayoutDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutDocument {
    /// Creates an empty layout with a single primary display named "Display 1".
    pub fn new() -> Self {
        let mut display_ids = IdAllocator::new();
        let first = Display {
            id: display_ids.next_id(),
            name: "Display 1".to_string(),
            orientation: Orientation::Landscape,
            primary: true,
            resolution: Resolution::FULL_HD,
            position: DisplayOffset::default(),
        };
        Self {
            name: String::new(),
            description: String::new(),
            layout_type: LayoutType::Custom,
            displays: vec![first],
            zones: Vec::new(),
            current_display_index: 0,
            selected_zone: None,
            zone_ids: IdAllocator::new(),
            display_ids,
        }
    }

    /// Assembles a document from already-decoded parts and repairs it.
    ///
    /// Used by the wire codec.  Later duplicates of an id, and the unset id
    /// `0`, are re-issued; geometry is clamped and the primary flag is
    /// normalised.
    pub(crate) fn from_parts(
        name: String,
        description: String,
        layout_type: LayoutType,
        displays: Vec<Display>,
        zones: Vec<Zone>,
    ) -> Self {
        let mut display_ids: IdAllocator<DisplayId> = IdAllocator::new();
        let mut zone_ids: IdAllocator<ZoneId> = IdAllocator::new();
        for d in &displays {
            display_ids.observe(d.id.0);
        }
        for z in &zones {
            zone_ids.observe(z.id.0);
            // Orphaned zones still reference removed displays; never hand those ids out again.
            if let Some(display) = z.display_id {
                display_ids.observe(display.0);
            }
        }

        let mut seen_displays = std::collections::HashSet::new();
        let displays = displays
            .into_iter()
            .map(|mut d| {
                if d.id.0 == 0 || !seen_displays.insert(d.id) {
                    let fresh = display_ids.next_id();
                    warn!("re-issuing duplicate {} as {fresh}", d.id);
                    d.id = fresh;
                    seen_displays.insert(fresh);
                }
                d
            })
            .collect();

        let mut seen_zones = std::collections::HashSet::new();
        let zones = zones
            .into_iter()
            .map(|mut z| {
                if z.id.0 == 0 || !seen_zones.insert(z.id) {
                    let fresh = zone_ids.next_id();
                    warn!("re-issuing duplicate {} as {fresh}", z.id);
                    z.id = fresh;
                    seen_zones.insert(fresh);
                }
                z
            })
            .collect();

        let mut doc = Self {
            name,
            description,
            layout_type,
            displays,
            zones,
            current_display_index: 0,
            selected_zone: None,
            zone_ids,
            display_ids,
        };
        doc.enforce_invariants();
        doc
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn layout_type(&self) -> LayoutType {
        self.layout_type
    }

    /// Displays in tab order.
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    /// All zones in creation order, including orphaned ones.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn display(&self, id: DisplayId) -> Option<&Display> {
        self.displays.iter().find(|d| d.id == id)
    }

    pub fn current_display_index(&self) -> usize {
        self.current_display_index
    }

    pub fn current_display(&self) -> &Display {
        &self.displays[self.current_display_index]
    }

    pub fn primary_display(&self) -> Option<&Display> {
        self.displays.iter().find(|d| d.primary)
    }

    pub fn selected_zone(&self) -> Option<ZoneId> {
        self.selected_zone
    }

    /// A layout can only be saved once it has a name.
    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Zones shown on `display`, in stacking order.
    ///
    /// Legacy zones without a display match every display.  Ties in `z_index`
    /// are broken by creation order.
    pub fn zones_for_display(&self, display: DisplayId) -> Vec<&Zone> {
        let mut zones: Vec<&Zone> = self.zones.iter().filter(|z| z.is_on_display(display)).collect();
        zones.sort_by_key(|z| (z.z_index, z.id));
        zones
    }

    /// Zones shown on the current display, in stacking order.
    pub fn active_zones(&self) -> Vec<&Zone> {
        self.zones_for_display(self.current_display().id)
    }

    // ── Document metadata ─────────────────────────────────────────────────────

    pub fn set_details(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.name = name.into();
        self.description = description.into();
    }

    pub fn set_layout_type(&mut self, layout_type: LayoutType) {
        self.layout_type = layout_type;
    }

    /// Selects a zone, or clears the selection with `None`.
    ///
    /// Selecting an unknown zone clears the selection.
    pub fn select_zone(&mut self, id: Option<ZoneId>) {
        self.selected_zone = id.filter(|id| self.zone(*id).is_some());
    }

    // ── Zone operations ───────────────────────────────────────────────────────

    /// Creates a default-sized zone centred on `drop_point`.
    pub fn add_zone(
        &mut self,
        display: Option<DisplayId>,
        content_type: ContentType,
        drop_point: Point,
    ) -> Zone {
        self.add_zone_sized(display, content_type, drop_point, DEFAULT_ZONE_SIZE)
    }

    /// Creates a `size` × `size` zone centred on `drop_point`.
    ///
    /// The zone is clamped onto the canvas, receives the registry defaults for
    /// `content_type` and a `z_index` of the current zone count plus one.  A
    /// display id that no longer exists falls back to the current display.
    pub fn add_zone_sized(
        &mut self,
        display: Option<DisplayId>,
        content_type: ContentType,
        drop_point: Point,
        size: f64,
    ) -> Zone {
        let display_id = display.map(|id| {
            if self.display(id).is_some() {
                id
            } else {
                debug!("{id} vanished before zone drop, using current display");
                self.current_display().id
            }
        });

        let z_index = i32::try_from(self.zones.len()).unwrap_or(i32::MAX - 1) + 1;
        let zone = Zone {
            id: self.zone_ids.next_id(),
            name: format!("{} {}", content_type.label(), self.zones.len() + 1),
            display_id,
            rect: Rect::centered_at(drop_point, size, size),
            settings: defaults_for(content_type),
            z_index,
            is_visible: true,
            content_id: None,
            playlist_id: None,
        };
        debug!("added {} ({}) at {:?}", zone.id, content_type.as_str(), zone.rect);
        self.zones.push(zone.clone());
        self.enforce_invariants();
        zone
    }

    /// Merges `update` into the zone `id` and returns the updated zone.
    ///
    /// Returns `None` (and changes nothing) if the zone does not exist.
    pub fn update_zone(&mut self, id: ZoneId, update: ZoneUpdate) -> Option<Zone> {
        let Some(zone) = self.zones.iter_mut().find(|z| z.id == id) else {
            debug!("update for missing {id} ignored");
            return None;
        };

        if let Some(name) = update.name {
            zone.name = name;
        }
        if let Some(display_id) = update.display_id {
            zone.display_id = display_id;
        }
        if let Some(rect) = update.rect {
            zone.rect = rect.clamped();
        }
        if let Some(content_type) = update.content_type {
            if content_type != zone.content_type() {
                zone.settings = defaults_for(content_type);
                if content_type == ContentType::Playlist {
                    zone.content_id = None;
                } else {
                    zone.playlist_id = None;
                }
            }
        }
        if let Some(patch) = &update.settings {
            zone.settings.apply_patch(patch);
        }
        if let Some(z_index) = update.z_index {
            zone.z_index = z_index;
        }
        if let Some(is_visible) = update.is_visible {
            zone.is_visible = is_visible;
        }
        if let Some(content_id) = update.content_id {
            zone.content_id = content_id;
        }
        if let Some(playlist_id) = update.playlist_id {
            zone.playlist_id = playlist_id;
        }

        let updated = zone.clone();
        self.enforce_invariants();
        Some(updated)
    }

    /// Removes the zone `id`; clears the selection if it pointed at it.
    ///
    /// Returns `false` if the zone did not exist.  Remaining zones keep their
    /// `z_index` values.
    pub fn delete_zone(&mut self, id: ZoneId) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| z.id != id);
        let removed = self.zones.len() != before;
        if removed && self.selected_zone == Some(id) {
            self.selected_zone = None;
        }
        if !removed {
            debug!("delete for missing {id} ignored");
        }
        removed
    }

    // ── Display operations ────────────────────────────────────────────────────

    /// Appends a non-primary 1920x1080 landscape display.
    ///
    /// The new display is placed to the right of the last one.  The current
    /// display does not change.
    pub fn add_display(&mut self) -> Display {
        let position = self
            .displays
            .last()
            .map(|last| DisplayOffset {
                x: last.position.x.saturating_add(i32::try_from(last.resolution.width).unwrap_or(i32::MAX)),
                y: last.position.y,
            })
            .unwrap_or_default();

        let display = Display {
            id: self.display_ids.next_id(),
            name: format!("Display {}", self.displays.len() + 1),
            orientation: Orientation::Landscape,
            primary: false,
            resolution: Resolution::FULL_HD,
            position,
        };
        let id = display.id;
        debug!("added {id}");
        self.displays.push(display.clone());
        self.enforce_invariants();
        display
    }

    /// Removes the display `id`, leaving its zones orphaned.
    ///
    /// No-op when `id` is the only display or does not exist.  Removing the
    /// current display resets the current index to 0; removing a primary
    /// display promotes the first remaining one.
    pub fn remove_display(&mut self, id: DisplayId) -> bool {
        if self.displays.len() <= 1 {
            debug!("refusing to remove the last display");
            return false;
        }
        let Some(index) = self.displays.iter().position(|d| d.id == id) else {
            debug!("remove for missing {id} ignored");
            return false;
        };

        self.displays.remove(index);
        if index == self.current_display_index {
            self.current_display_index = 0;
            self.selected_zone = None;
        } else if index < self.current_display_index {
            self.current_display_index -= 1;
        }
        self.enforce_invariants();
        true
    }

    /// Makes the display at `index` current and clears the selection.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn switch_display(&mut self, index: usize) -> bool {
        if index >= self.displays.len() {
            debug!("switch to display index {index} out of range ignored");
            return false;
        }
        self.current_display_index = index;
        self.selected_zone = None;
        true
    }

    /// Marks `id` as the only primary display.
    ///
    /// Returns `false` (and changes nothing) if the display does not exist.
    pub fn set_primary(&mut self, id: DisplayId) -> bool {
        if self.display(id).is_none() {
            debug!("set_primary for missing {id} ignored");
            return false;
        }
        for display in &mut self.displays {
            display.primary = display.id == id;
        }
        true
    }

    /// Edits display metadata.  Returns `None` if the display does not exist.
    pub fn update_display(&mut self, id: DisplayId, update: DisplayUpdate) -> Option<Display> {
        let display = self.displays.iter_mut().find(|d| d.id == id)?;
        if let Some(name) = update.name {
            display.name = name;
        }
        if let Some(orientation) = update.orientation {
            display.orientation = orientation;
        }
        if let Some(resolution) = update.resolution {
            display.resolution = resolution;
        }
        if let Some(position) = update.position {
            display.position = position;
        }
        Some(display.clone())
    }

    // ── Invariants ────────────────────────────────────────────────────────────

    /// Verifies every document invariant.
    pub fn check_invariants(&self) -> Result<(), LayoutError> {
        if self.displays.is_empty() {
            return Err(LayoutError::NoDisplays);
        }
        if self.current_display_index >= self.displays.len() {
            return Err(LayoutError::DisplayIndexOutOfRange {
                index: self.current_display_index,
                len: self.displays.len(),
            });
        }
        let primaries = self.displays.iter().filter(|d| d.primary).count();
        if primaries != 1 {
            return Err(LayoutError::PrimaryCount(primaries));
        }

        let mut display_ids = std::collections::HashSet::new();
        for d in &self.displays {
            if !display_ids.insert(d.id) {
                return Err(LayoutError::DuplicateDisplayId(d.id));
            }
        }
        let mut zone_ids = std::collections::HashSet::new();
        for z in &self.zones {
            if !zone_ids.insert(z.id) {
                return Err(LayoutError::DuplicateZoneId(z.id));
            }
            if !z.rect.is_valid() {
                return Err(LayoutError::InvalidGeometry(z.id));
            }
        }
        Ok(())
    }

    /// Re-establishes the invariants that can be repaired in place.
    fn enforce_invariants(&mut self) {
        if self.displays.is_empty() {
            self.displays.push(Display {
                id: self.display_ids.next_id(),
                name: "Display 1".to_string(),
                orientation: Orientation::Landscape,
                primary: true,
                resolution: Resolution::FULL_HD,
                position: DisplayOffset::default(),
            });
        }

        let mut seen_primary = false;
        for display in &mut self.displays {
            if display.primary && seen_primary {
                display.primary = false;
            }
            seen_primary |= display.primary;
        }
        if !seen_primary {
            self.displays[0].primary = true;
        }

        if self.current_display_index >= self.displays.len() {
            self.current_display_index = 0;
        }

        for zone in &mut self.zones {
            if !zone.rect.is_valid() {
                zone.rect = zone.rect.clamped();
            }
        }

        if let Some(selected) = self.selected_zone {
            if self.zone(selected).is_none() {
                self.selected_zone = None;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::ImageSettings;
    use serde_json::json;

    fn doc_with_zone(content_type: ContentType) -> (LayoutDocument, ZoneId) {
        let mut doc = LayoutDocument::new();
        let display = doc.current_display().id;
        let zone = doc.add_zone(Some(display), content_type, Point::new(50.0, 50.0));
        (doc, zone.id)
    }

    // ── new ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_new_document_has_single_primary_display() {
        let doc = LayoutDocument::new();
        assert_eq!(doc.displays().len(), 1);
        assert_eq!(doc.displays()[0].id, DisplayId(1));
        assert_eq!(doc.displays()[0].name, "Display 1");
        assert!(doc.displays()[0].primary);
        assert_eq!(doc.current_display_index(), 0);
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_new_document_cannot_be_saved_without_name() {
        let mut doc = LayoutDocument::new();
        assert!(!doc.can_save());
        doc.set_details("   ", "");
        assert!(!doc.can_save());
        doc.set_details("Lobby", "Main entrance screens");
        assert!(doc.can_save());
    }

    // ── add_zone ──────────────────────────────────────────────────────────────

    #[test]
    fn test_add_zone_centres_default_box_on_drop_point() {
        let (doc, id) = doc_with_zone(ContentType::Image);
        let zone = doc.zone(id).unwrap();
        assert_eq!(zone.rect, Rect::new(40.0, 40.0, 20.0, 20.0));
        assert_eq!(zone.settings, ContentSettings::Image(ImageSettings::default()));
        assert_eq!(zone.z_index, 1);
        assert_eq!(zone.display_id, Some(DisplayId(1)));
        assert!(zone.is_visible);
    }

    #[test]
    fn test_add_zone_near_corner_is_clamped() {
        let mut doc = LayoutDocument::new();
        let zone = doc.add_zone(None, ContentType::Clock, Point::new(100.0, 100.0));
        assert_eq!(zone.rect, Rect::new(80.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_add_zone_assigns_unique_ids_and_growing_z_index() {
        let mut doc = LayoutDocument::new();
        let a = doc.add_zone(None, ContentType::Text, Point::new(10.0, 10.0));
        let b = doc.add_zone(None, ContentType::Text, Point::new(60.0, 60.0));
        assert_ne!(a.id, b.id);
        assert_eq!(a.z_index, 1);
        assert_eq!(b.z_index, 2);
    }

    #[test]
    fn test_add_zone_for_missing_display_falls_back_to_current() {
        let mut doc = LayoutDocument::new();
        let zone = doc.add_zone(Some(DisplayId(99)), ContentType::Video, Point::new(50.0, 50.0));
        assert_eq!(zone.display_id, Some(DisplayId(1)));
    }

    #[test]
    fn test_z_index_is_not_renumbered_after_delete() {
        let mut doc = LayoutDocument::new();
        let a = doc.add_zone(None, ContentType::Text, Point::new(10.0, 10.0));
        let _b = doc.add_zone(None, ContentType::Text, Point::new(30.0, 30.0));
        doc.delete_zone(a.id);
        let c = doc.add_zone(None, ContentType::Text, Point::new(60.0, 60.0));
        // Two zones remain before the add, so the new one also gets z_index 2.
        assert_eq!(c.z_index, 2);
        let order: Vec<ZoneId> = doc.active_zones().iter().map(|z| z.id).collect();
        assert_eq!(order.last(), Some(&c.id), "creation order breaks the tie");
    }

    // ── update_zone ───────────────────────────────────────────────────────────

    #[test]
    fn test_update_zone_clamps_rect() {
        let (mut doc, id) = doc_with_zone(ContentType::Image);
        let updated = doc
            .update_zone(id, ZoneUpdate::with_rect(Rect::new(90.0, 90.0, 20.0, 20.0)))
            .unwrap();
        assert_eq!(updated.rect, Rect::new(80.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_update_missing_zone_is_noop() {
        let (mut doc, _) = doc_with_zone(ContentType::Image);
        let before = doc.zones().to_vec();
        assert!(doc.update_zone(ZoneId(404), ZoneUpdate::default()).is_none());
        assert_eq!(doc.zones(), before.as_slice());
    }

    #[test]
    fn test_update_zone_merges_settings_patch() {
        let (mut doc, id) = doc_with_zone(ContentType::Image);
        let update = ZoneUpdate {
            settings: Some(SettingsPatch::from_value(ContentType::Image, json!({ "duration": 30 }))),
            ..ZoneUpdate::default()
        };
        let zone = doc.update_zone(id, update).unwrap();
        assert_eq!(zone.settings.to_wire(), json!({ "scale": "cover", "duration": 30 }));
    }

    #[test]
    fn test_update_zone_content_type_resets_settings_and_clears_content() {
        let (mut doc, id) = doc_with_zone(ContentType::Video);
        doc.update_zone(
            id,
            ZoneUpdate { content_id: Some(Some(12)), ..ZoneUpdate::default() },
        );
        let zone = doc
            .update_zone(
                id,
                ZoneUpdate {
                    content_type: Some(ContentType::Playlist),
                    playlist_id: Some(Some(3)),
                    ..ZoneUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(zone.content_type(), ContentType::Playlist);
        assert_eq!(zone.content_id, None);
        assert_eq!(zone.playlist_id, Some(3));
    }

    // ── delete_zone ───────────────────────────────────────────────────────────

    #[test]
    fn test_delete_selected_zone_clears_selection() {
        let (mut doc, id) = doc_with_zone(ContentType::Text);
        doc.select_zone(Some(id));
        assert!(doc.delete_zone(id));
        assert_eq!(doc.selected_zone(), None);
        assert!(!doc.delete_zone(id), "second delete is a no-op");
    }

    // ── displays ──────────────────────────────────────────────────────────────

    #[test]
    fn test_add_display_keeps_current_index_and_filters_zones() {
        let (mut doc, _) = doc_with_zone(ContentType::Image);
        let second = doc.add_display();
        assert_eq!(second.id, DisplayId(2));
        assert!(!second.primary);
        assert_eq!(second.resolution.to_string(), "1920x1080");
        assert_eq!(second.orientation, Orientation::Landscape);
        assert_eq!(second.position, DisplayOffset { x: 1920, y: 0 });
        assert_eq!(doc.displays().len(), 2);
        assert_eq!(doc.current_display_index(), 0);
        assert!(doc.zones_for_display(DisplayId(2)).is_empty());
    }

    #[test]
    fn test_legacy_zone_matches_every_display() {
        let mut doc = LayoutDocument::new();
        let zone = doc.add_zone(None, ContentType::Logo, Point::new(50.0, 50.0));
        let second = doc.add_display();
        assert_eq!(doc.zones_for_display(second.id)[0].id, zone.id);
        assert_eq!(doc.zones_for_display(DisplayId(1))[0].id, zone.id);
    }

    #[test]
    fn test_remove_last_display_is_noop() {
        let mut doc = LayoutDocument::new();
        assert!(!doc.remove_display(DisplayId(1)));
        assert_eq!(doc.displays().len(), 1);
        assert!(doc.displays()[0].primary);
    }

    #[test]
    fn test_remove_display_orphans_its_zones() {
        let mut doc = LayoutDocument::new();
        let second = doc.add_display();
        let zone = doc.add_zone(Some(second.id), ContentType::Text, Point::new(50.0, 50.0));
        assert!(doc.remove_display(second.id));
        assert_eq!(doc.zones().len(), 1, "zones survive display removal");
        assert_eq!(doc.zone(zone.id).unwrap().display_id, Some(second.id));
        assert!(doc.active_zones().is_empty());
    }

    #[test]
    fn test_remove_current_display_resets_index() {
        let mut doc = LayoutDocument::new();
        doc.add_display();
        let third = doc.add_display();
        assert!(doc.switch_display(2));
        assert!(doc.remove_display(third.id));
        assert_eq!(doc.current_display_index(), 0);
    }

    #[test]
    fn test_remove_earlier_display_keeps_current_display() {
        let mut doc = LayoutDocument::new();
        let second = doc.add_display();
        let third = doc.add_display();
        doc.switch_display(2);
        doc.remove_display(second.id);
        assert_eq!(doc.current_display().id, third.id);
    }

    #[test]
    fn test_remove_primary_display_promotes_first_remaining() {
        let mut doc = LayoutDocument::new();
        let second = doc.add_display();
        doc.set_primary(second.id);
        doc.remove_display(second.id);
        assert!(doc.displays()[0].primary);
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_switch_display_clears_selection_and_rejects_out_of_range() {
        let (mut doc, id) = doc_with_zone(ContentType::Text);
        doc.add_display();
        doc.select_zone(Some(id));
        assert!(doc.switch_display(1));
        assert_eq!(doc.selected_zone(), None);
        assert!(!doc.switch_display(5));
        assert_eq!(doc.current_display_index(), 1);
    }

    #[test]
    fn test_set_primary_is_exclusive() {
        let mut doc = LayoutDocument::new();
        let second = doc.add_display();
        let third = doc.add_display();
        assert!(doc.set_primary(third.id));
        let primaries: Vec<DisplayId> =
            doc.displays().iter().filter(|d| d.primary).map(|d| d.id).collect();
        assert_eq!(primaries, vec![third.id]);
        assert!(!doc.set_primary(DisplayId(77)));
        assert!(!doc.display(second.id).unwrap().primary);
    }

    #[test]
    fn test_update_display_changes_metadata() {
        let mut doc = LayoutDocument::new();
        let updated = doc
            .update_display(
                DisplayId(1),
                DisplayUpdate {
                    name: Some("Menu board".to_string()),
                    orientation: Some(Orientation::Portrait),
                    resolution: Some(Resolution::new(1080, 1920)),
                    position: None,
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Menu board");
        assert_eq!(updated.orientation, Orientation::Portrait);
        assert!(doc.update_display(DisplayId(9), DisplayUpdate::default()).is_none());
    }

    #[test]
    fn test_select_unknown_zone_clears_selection() {
        let (mut doc, id) = doc_with_zone(ContentType::Text);
        doc.select_zone(Some(id));
        doc.select_zone(Some(ZoneId(999)));
        assert_eq!(doc.selected_zone(), None);
    }
}
