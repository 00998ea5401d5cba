//! UI command bridge: exposes the editing session to a web frontend.
//!
//! Every command is an `async fn` taking the shared [`AppState`] and returning
//! a [`CommandResult`], so the frontend always receives the same JSON shape:
//! `{ success: bool, data: T | null, error: string | null }`.
//!
//! The DTOs below use camelCase keys for the frontend, while their values keep
//! the stored layout's form: camelCase settings objects, percentage positions
//! and `"1920x1080"` resolutions.  The Application and Domain layers must never
//! import this module.

use std::sync::Arc;

use layout_core::{
    CanvasMetrics, ContentType, Display, DisplayId, DisplayOffset, DisplayUpdate,
    InteractionState, LayoutDocument, LayoutType, Orientation, Point, PointerOutcome, Rect,
    ResizeHandle, Resolution, SettingsPatch, SurfacePoint, Zone, ZoneId, ZoneUpdate,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{
    catalog::{load_catalog, CatalogSource, PlaylistItem},
    edit_layout::EditLayoutUseCase,
    save_layout::{
        LayoutId, LayoutRepository, SaveLayoutUseCase, SaveOutcome, SaveStatus, SaveTracker,
    },
};
use crate::infrastructure::storage::config::{EditorConfig, EditorSection};

// ── Shared application state ──────────────────────────────────────────────────

/// State shared between command invocations.
///
/// Fields use the async Tokio mutex because commands run on the Tokio
/// runtime.  The session lock is never held across a network call.
pub struct AppState {
    /// The open editing session.
    pub session: Mutex<EditLayoutUseCase>,
    /// Saves and loads layouts.
    pub saver: SaveLayoutUseCase,
    /// Status of overlapping save attempts.
    pub save_tracker: Mutex<SaveTracker>,
    /// Where content and playlist catalogs come from.
    pub catalog_source: Arc<dyn CatalogSource>,
    pub config: Mutex<EditorConfig>,
}

impl AppState {
    /// Opens a fresh, unsaved layout using the session settings from `config`.
    pub fn new(
        config: EditorConfig,
        repository: Arc<dyn LayoutRepository>,
        catalog_source: Arc<dyn CatalogSource>,
    ) -> Arc<Self> {
        let session = EditLayoutUseCase::new(Default::default(), config.session_settings());
        Arc::new(Self {
            session: Mutex::new(session),
            saver: SaveLayoutUseCase::new(repository),
            save_tracker: Mutex::new(SaveTracker::new()),
            catalog_source,
            config: Mutex::new(config),
        })
    }
}

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// Zone rectangle in percent of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionDto {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for PositionDto {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

impl From<PositionDto> for Rect {
    fn from(p: PositionDto) -> Self {
        Rect::new(p.x, p.y, p.width, p.height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDto {
    pub id: u64,
    pub zone_name: String,
    pub display_id: Option<u64>,
    pub position: PositionDto,
    pub content_type: String,
    pub settings: Value,
    pub z_index: i32,
    pub is_visible: bool,
    pub content_id: Option<i64>,
    pub playlist_id: Option<i64>,
}

impl From<&Zone> for ZoneDto {
    fn from(z: &Zone) -> Self {
        Self {
            id: z.id.0,
            zone_name: z.name.clone(),
            display_id: z.display_id.map(|d| d.0),
            position: z.rect.into(),
            content_type: z.content_type().as_str().to_string(),
            settings: z.settings.to_wire(),
            z_index: z.z_index,
            is_visible: z.is_visible,
            content_id: z.content_id,
            playlist_id: z.playlist_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayDto {
    pub id: u64,
    pub name: String,
    pub orientation: String,
    pub primary: bool,
    pub resolution: String,
    pub position: DisplayOffset,
}

impl From<&Display> for DisplayDto {
    fn from(d: &Display) -> Self {
        Self {
            id: d.id.0,
            name: d.name.clone(),
            orientation: d.orientation.as_str().to_string(),
            primary: d.primary,
            resolution: d.resolution.to_string(),
            position: d.position,
        }
    }
}

/// Everything the canvas needs to redraw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDto {
    pub layout_id: Option<String>,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub layout_type: LayoutType,
    pub displays: Vec<DisplayDto>,
    pub current_display_index: usize,
    /// Zones on the current display, in stacking order.
    pub zones: Vec<ZoneDto>,
    pub selected_zone: Option<u64>,
    pub can_save: bool,
}

impl LayoutDto {
    fn build(doc: &LayoutDocument, layout_id: Option<&LayoutId>) -> Self {
        Self {
            layout_id: layout_id.map(LayoutId::to_string),
            name: doc.name().to_string(),
            description: doc.description().to_string(),
            layout_type: doc.layout_type(),
            displays: doc.displays().iter().map(DisplayDto::from).collect(),
            current_display_index: doc.current_display_index(),
            zones: doc.active_zones().into_iter().map(ZoneDto::from).collect(),
            selected_zone: doc.selected_zone().map(|z| z.0),
            can_save: doc.can_save(),
        }
    }
}

/// Partial zone edit from the properties panel.  Absent fields are unchanged.
///
/// For `displayId`, `contentId` and `playlistId` an explicit `null` clears the
/// field, which is distinct from leaving it out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneUpdateDto {
    pub zone_name: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub display_id: Option<Option<u64>>,
    pub position: Option<PositionDto>,
    pub content_type: Option<String>,
    /// Settings keys to overwrite, in wire (camelCase) form.
    pub settings: Option<Value>,
    pub z_index: Option<i32>,
    pub is_visible: Option<bool>,
    #[serde(deserialize_with = "present_or_null")]
    pub content_id: Option<Option<i64>>,
    #[serde(deserialize_with = "present_or_null")]
    pub playlist_id: Option<Option<i64>>,
}

/// Only called for keys that are present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayUpdateDto {
    pub name: Option<String>,
    pub orientation: Option<String>,
    pub resolution: Option<String>,
    pub position: Option<DisplayOffset>,
}

/// Pointer position in surface pixels plus the current canvas size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerDto {
    pub x: f64,
    pub y: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl PointerDto {
    fn point(&self) -> SurfacePoint {
        SurfacePoint::new(self.x, self.y)
    }

    fn metrics(&self) -> CanvasMetrics {
        CanvasMetrics::new(self.canvas_width, self.canvas_height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerDownDto {
    pub zone_id: u64,
    /// `"se"`, `"sw"`, `"ne"` or `"nw"` for a resize handle; absent for the body.
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(flatten)]
    pub pointer: PointerDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerOutcomeDto {
    /// `ignored`, `armed`, `pending`, `moved`, `clicked` or `released`.
    pub outcome: String,
    pub zone: Option<ZoneDto>,
}

impl From<PointerOutcome> for PointerOutcomeDto {
    fn from(outcome: PointerOutcome) -> Self {
        let (name, zone) = match outcome {
            PointerOutcome::Ignored => ("ignored", None),
            PointerOutcome::Armed => ("armed", None),
            PointerOutcome::Pending => ("pending", None),
            PointerOutcome::Moved(zone) => ("moved", Some(ZoneDto::from(&zone))),
            PointerOutcome::Clicked(_) => ("clicked", None),
            PointerOutcome::Released => ("released", None),
        };
        Self {
            outcome: name.to_string(),
            zone,
        }
    }
}

/// What the surface should currently look like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceStateDto {
    /// `idle`, `armed`, `dragging` or `resizing`.
    pub state: String,
    pub listening: bool,
    pub captured_zone: Option<u64>,
    /// CSS cursor name.
    pub cursor: String,
    pub selection_suppressed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOptionDto {
    pub id: i64,
    pub label: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectableDto {
    pub content: Vec<ContentOptionDto>,
    pub playlists: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatusDto {
    /// `idle`, `saving`, `saved` or `failed`.
    pub state: String,
    pub layout_id: Option<String>,
    pub error: Option<String>,
    pub in_flight: usize,
}

/// Unified response wrapper used by every command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

fn parse_content_type(tag: &str) -> Result<ContentType, String> {
    ContentType::parse(tag).ok_or_else(|| format!("unknown content type: {tag}"))
}

fn parse_handle(name: Option<&str>) -> Result<Option<ResizeHandle>, String> {
    match name {
        None => Ok(None),
        Some(name) => ResizeHandle::parse(name)
            .map(Some)
            .ok_or_else(|| format!("unknown resize handle: {name}")),
    }
}

// ── Layout commands ───────────────────────────────────────────────────────────

/// Returns the document as the canvas should show it.
///
/// # Example (frontend)
/// ```ts
/// const layout = await invoke<LayoutDto>('get_layout');
/// ```
pub async fn get_layout(state: Arc<AppState>) -> CommandResult<LayoutDto> {
    let session = state.session.lock().await;
    CommandResult::ok(LayoutDto::build(session.document(), session.layout_id()))
}

pub async fn set_layout_details(
    state: Arc<AppState>,
    name: String,
    description: String,
) -> CommandResult<LayoutDto> {
    let mut session = state.session.lock().await;
    session.set_details(&name, &description);
    CommandResult::ok(LayoutDto::build(session.document(), session.layout_id()))
}

/// Sets the layout type.  Unrecognised names read as `custom`.
pub async fn set_layout_type(state: Arc<AppState>, layout_type: String) -> CommandResult<LayoutDto> {
    let parsed = LayoutType::parse_or_custom(&layout_type);
    let mut session = state.session.lock().await;
    session.set_layout_type(parsed);
    CommandResult::ok(LayoutDto::build(session.document(), session.layout_id()))
}

/// Returns the `[editor]` section the session was opened with.
pub async fn get_editor_settings(state: Arc<AppState>) -> CommandResult<EditorSection> {
    let config = state.config.lock().await;
    CommandResult::ok(config.editor.clone())
}

// ── Zone commands ─────────────────────────────────────────────────────────────

/// Drops a new zone of `content_type` centred on (`x`, `y`) percent of the
/// current display.
pub async fn add_zone(
    state: Arc<AppState>,
    content_type: String,
    x: f64,
    y: f64,
) -> CommandResult<ZoneDto> {
    let content_type = match parse_content_type(&content_type) {
        Ok(ct) => ct,
        Err(e) => return CommandResult::err(e),
    };
    let mut session = state.session.lock().await;
    let zone = session.drop_zone(content_type, Point::new(x, y));
    CommandResult::ok(ZoneDto::from(&zone))
}

/// Applies a partial edit.  An unknown zone id yields `data: null`; the zone
/// may have been deleted by an earlier command.
pub async fn update_zone(
    state: Arc<AppState>,
    zone_id: u64,
    update: ZoneUpdateDto,
) -> CommandResult<Option<ZoneDto>> {
    let new_type = match update.content_type.as_deref().map(parse_content_type).transpose() {
        Ok(ct) => ct,
        Err(e) => return CommandResult::err(e),
    };

    let mut session = state.session.lock().await;
    let id = ZoneId(zone_id);
    let Some(current_type) = session.document().zone(id).map(Zone::content_type) else {
        debug!("update for unknown zone {zone_id} ignored");
        return CommandResult::ok(None);
    };

    let patch_type = new_type.unwrap_or(current_type);
    let domain_update = ZoneUpdate {
        name: update.zone_name,
        display_id: update.display_id.map(|d| d.map(DisplayId)),
        rect: update.position.map(Rect::from),
        content_type: new_type,
        settings: update
            .settings
            .map(|values| SettingsPatch::from_value(patch_type, values)),
        z_index: update.z_index,
        is_visible: update.is_visible,
        content_id: update.content_id,
        playlist_id: update.playlist_id,
    };
    CommandResult::ok(session.update_zone(id, domain_update).as_ref().map(ZoneDto::from))
}

/// Returns whether a zone was removed.
pub async fn delete_zone(state: Arc<AppState>, zone_id: u64) -> CommandResult<bool> {
    let mut session = state.session.lock().await;
    CommandResult::ok(session.delete_zone(ZoneId(zone_id)))
}

pub async fn select_zone(state: Arc<AppState>, zone_id: Option<u64>) -> CommandResult<Option<u64>> {
    let mut session = state.session.lock().await;
    session.select_zone(zone_id.map(ZoneId));
    CommandResult::ok(session.document().selected_zone().map(|z| z.0))
}

// ── Display commands ──────────────────────────────────────────────────────────

pub async fn add_display(state: Arc<AppState>) -> CommandResult<DisplayDto> {
    let mut session = state.session.lock().await;
    let display = session.add_display();
    CommandResult::ok(DisplayDto::from(&display))
}

/// Removes a display.  Its zones stay in the document but drop out of view.
pub async fn remove_display(state: Arc<AppState>, display_id: u64) -> CommandResult<LayoutDto> {
    let mut session = state.session.lock().await;
    let id = DisplayId(display_id);
    if session.document().display(id).is_none() {
        return CommandResult::err(format!("display {display_id} not found"));
    }
    if !session.remove_display(id) {
        return CommandResult::err("the last display cannot be removed");
    }
    CommandResult::ok(LayoutDto::build(session.document(), session.layout_id()))
}

pub async fn switch_display(state: Arc<AppState>, index: usize) -> CommandResult<LayoutDto> {
    let mut session = state.session.lock().await;
    if !session.switch_display(index) {
        return CommandResult::err(format!("display index {index} out of range"));
    }
    CommandResult::ok(LayoutDto::build(session.document(), session.layout_id()))
}

pub async fn set_primary_display(state: Arc<AppState>, display_id: u64) -> CommandResult<bool> {
    let mut session = state.session.lock().await;
    CommandResult::ok(session.set_primary(DisplayId(display_id)))
}

pub async fn update_display(
    state: Arc<AppState>,
    display_id: u64,
    update: DisplayUpdateDto,
) -> CommandResult<Option<DisplayDto>> {
    let orientation = match update.orientation.as_deref() {
        None => None,
        Some(name) => match Orientation::parse(name) {
            Some(o) => Some(o),
            None => return CommandResult::err(format!("unknown orientation: {name}")),
        },
    };
    let resolution = match update.resolution.as_deref().map(str::parse::<Resolution>).transpose() {
        Ok(r) => r,
        Err(e) => return CommandResult::err(e.to_string()),
    };

    let mut session = state.session.lock().await;
    let updated = session.update_display(
        DisplayId(display_id),
        DisplayUpdate {
            name: update.name,
            orientation,
            resolution,
            position: update.position,
        },
    );
    CommandResult::ok(updated.as_ref().map(DisplayDto::from))
}

// ── Pointer commands ──────────────────────────────────────────────────────────

pub async fn pointer_down(state: Arc<AppState>, event: PointerDownDto) -> CommandResult<PointerOutcomeDto> {
    let handle = match parse_handle(event.handle.as_deref()) {
        Ok(h) => h,
        Err(e) => return CommandResult::err(e),
    };
    let mut session = state.session.lock().await;
    let outcome = session.pointer_down(
        ZoneId(event.zone_id),
        handle,
        event.pointer.point(),
        event.pointer.metrics(),
    );
    CommandResult::ok(outcome.into())
}

pub async fn pointer_move(state: Arc<AppState>, event: PointerDto) -> CommandResult<PointerOutcomeDto> {
    let mut session = state.session.lock().await;
    CommandResult::ok(session.pointer_move(event.point(), event.metrics()).into())
}

pub async fn pointer_up(state: Arc<AppState>) -> CommandResult<PointerOutcomeDto> {
    let mut session = state.session.lock().await;
    CommandResult::ok(session.pointer_up().into())
}

/// The pointer left the window or the surface lost focus.
pub async fn pointer_leave(state: Arc<AppState>) -> CommandResult<PointerOutcomeDto> {
    let mut session = state.session.lock().await;
    CommandResult::ok(session.pointer_leave().into())
}

pub async fn get_surface_state(state: Arc<AppState>) -> CommandResult<SurfaceStateDto> {
    let session = state.session.lock().await;
    let controller = session.controller();
    let host = controller.host();
    let name = match controller.state() {
        InteractionState::Idle => "idle",
        InteractionState::Armed { .. } => "armed",
        InteractionState::Dragging { .. } => "dragging",
        InteractionState::Resizing { .. } => "resizing",
    };
    CommandResult::ok(SurfaceStateDto {
        state: name.to_string(),
        listening: host.is_listening(),
        captured_zone: host.captured_zone().map(|z| z.0),
        cursor: host.cursor().css_name().to_string(),
        selection_suppressed: host.is_selection_suppressed(),
    })
}

// ── Catalog commands ──────────────────────────────────────────────────────────

/// Re-fetches both catalogs.  Failures degrade to empty lists.
pub async fn refresh_catalog(state: Arc<AppState>) -> CommandResult<(usize, usize)> {
    let snapshot = load_catalog(state.catalog_source.as_ref()).await;
    let counts = (snapshot.content().len(), snapshot.playlists().len());
    state.session.lock().await.set_catalog(snapshot);
    CommandResult::ok(counts)
}

pub async fn get_selectable_content(state: Arc<AppState>, zone_id: u64) -> CommandResult<SelectableDto> {
    let session = state.session.lock().await;
    let Some((content, playlists)) = session.selectable_for(ZoneId(zone_id)) else {
        return CommandResult::err(format!("zone {zone_id} not found"));
    };
    CommandResult::ok(SelectableDto {
        content: content
            .into_iter()
            .map(|item| ContentOptionDto {
                id: item.id,
                label: item.label().to_string(),
                content_type: item.content_type.clone(),
            })
            .collect(),
        playlists: playlists.to_vec(),
    })
}

pub async fn assign_content(
    state: Arc<AppState>,
    zone_id: u64,
    content_id: i64,
) -> CommandResult<ZoneDto> {
    let mut session = state.session.lock().await;
    match session.assign_content(ZoneId(zone_id), content_id) {
        Some(zone) => CommandResult::ok(ZoneDto::from(&zone)),
        None => CommandResult::err(format!("content {content_id} cannot be used in zone {zone_id}")),
    }
}

pub async fn assign_playlist(
    state: Arc<AppState>,
    zone_id: u64,
    playlist_id: i64,
) -> CommandResult<ZoneDto> {
    let mut session = state.session.lock().await;
    match session.assign_playlist(ZoneId(zone_id), playlist_id) {
        Some(zone) => CommandResult::ok(ZoneDto::from(&zone)),
        None => CommandResult::err(format!("playlist {playlist_id} cannot be used in zone {zone_id}")),
    }
}

// ── Persistence commands ──────────────────────────────────────────────────────

/// Saves the current document and returns the layout id.
///
/// The session lock is released before the request goes out, so editing can
/// continue while the save is in flight.
pub async fn save_layout(state: Arc<AppState>) -> CommandResult<String> {
    let (record, target) = {
        let session = state.session.lock().await;
        match SaveLayoutUseCase::snapshot(session.document()) {
            Ok(record) => (record, session.layout_id().cloned()),
            Err(e) => return CommandResult::err(e.to_string()),
        }
    };

    let ticket = state.save_tracker.lock().await.begin();
    let result = state.saver.send(target.as_ref(), &record).await;
    state.save_tracker.lock().await.settle(ticket, &result);

    match result {
        Ok(outcome) => {
            if let SaveOutcome::Created(id) = &outcome {
                let mut session = state.session.lock().await;
                // A concurrent save may already have created the layout.
                if session.layout_id().is_none() {
                    session.set_layout_id(id.clone());
                }
            }
            CommandResult::ok(outcome.id().to_string())
        }
        Err(e) => CommandResult::err(e.to_string()),
    }
}

pub async fn get_save_status(state: Arc<AppState>) -> CommandResult<SaveStatusDto> {
    let tracker = state.save_tracker.lock().await;
    let (name, layout_id, error) = match tracker.status() {
        SaveStatus::Idle => ("idle", None, None),
        SaveStatus::Saving => ("saving", None, None),
        SaveStatus::Saved(id) => ("saved", Some(id.to_string()), None),
        SaveStatus::Failed(e) => ("failed", None, Some(e.clone())),
    };
    CommandResult::ok(SaveStatusDto {
        state: name.to_string(),
        layout_id,
        error,
        in_flight: tracker.in_flight(),
    })
}

/// Replaces the open document with the stored layout `layout_id`.
pub async fn load_layout(state: Arc<AppState>, layout_id: String) -> CommandResult<LayoutDto> {
    let id = LayoutId::new(layout_id);
    let document = match state.saver.load(&id).await {
        Ok(doc) => doc,
        Err(e) => return CommandResult::err(e.to_string()),
    };
    let mut session = state.session.lock().await;
    session.replace_document(document, Some(id));
    CommandResult::ok(LayoutDto::build(session.document(), session.layout_id()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
