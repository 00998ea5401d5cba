//! EditLayoutUseCase: one editing session over a layout document.
//!
//! The session owns the [`LayoutDocument`], the pointer
//! [`InteractionController`] and the catalogs fetched when it opened.  UI
//! adapters call into it for every user action; nothing here performs I/O.

use layout_core::{
    CanvasMetrics, ContentType, Display, DisplayId, DisplayUpdate, InteractionController,
    LayoutDocument, LayoutType, Point, PointerHost, PointerOutcome, ResizeHandle, SurfacePoint,
    SurfaceState, Zone, ZoneId, ZoneUpdate, DEFAULT_DRAG_THRESHOLD_PX, DEFAULT_ZONE_SIZE,
};
use tracing::debug;

use crate::application::catalog::{CatalogSnapshot, ContentItem, PlaylistItem};
use crate::application::save_layout::LayoutId;

/// Tunables for an editing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub drag_threshold_px: f64,
    /// Width and height of a newly dropped zone, in percent.
    pub default_zone_size: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            default_zone_size: DEFAULT_ZONE_SIZE,
        }
    }
}

/// An open editing session.
#[derive(Debug)]
pub struct EditLayoutUseCase<H: PointerHost = SurfaceState> {
    document: LayoutDocument,
    controller: InteractionController<H>,
    catalog: CatalogSnapshot,
    layout_id: Option<LayoutId>,
    settings: SessionSettings,
}

impl<H: PointerHost> EditLayoutUseCase<H> {
    /// Opens a session on a fresh, unsaved layout.
    pub fn new(host: H, settings: SessionSettings) -> Self {
        Self::open(LayoutDocument::new(), None, host, settings)
    }

    /// Opens a session on an existing document.
    pub fn open(
        document: LayoutDocument,
        layout_id: Option<LayoutId>,
        host: H,
        settings: SessionSettings,
    ) -> Self {
        Self {
            document,
            controller: InteractionController::with_threshold(host, settings.drag_threshold_px),
            catalog: CatalogSnapshot::default(),
            layout_id,
            settings,
        }
    }

    pub fn document(&self) -> &LayoutDocument {
        &self.document
    }

    pub fn controller(&self) -> &InteractionController<H> {
        &self.controller
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: CatalogSnapshot) {
        self.catalog = catalog;
    }

    /// Backend id once the layout has been saved or loaded.
    pub fn layout_id(&self) -> Option<&LayoutId> {
        self.layout_id.as_ref()
    }

    pub fn set_layout_id(&mut self, id: LayoutId) {
        self.layout_id = Some(id);
    }

    /// Replaces the document, ending any gesture on the old one first.
    pub fn replace_document(&mut self, document: LayoutDocument, layout_id: Option<LayoutId>) {
        self.controller.pointer_leave();
        self.document = document;
        self.layout_id = layout_id;
    }

    // ── Document edits ────────────────────────────────────────────────────────

    pub fn set_details(&mut self, name: &str, description: &str) {
        self.document.set_details(name, description);
    }

    pub fn set_layout_type(&mut self, layout_type: LayoutType) {
        self.document.set_layout_type(layout_type);
    }

    /// Drops a new zone on the current display, centred on `at`.
    pub fn drop_zone(&mut self, content_type: ContentType, at: Point) -> Zone {
        let display = self.document.current_display().id;
        let zone = self.document.add_zone_sized(
            Some(display),
            content_type,
            at,
            self.settings.default_zone_size,
        );
        self.document.select_zone(Some(zone.id));
        zone
    }

    pub fn update_zone(&mut self, id: ZoneId, update: ZoneUpdate) -> Option<Zone> {
        self.document.update_zone(id, update)
    }

    pub fn delete_zone(&mut self, id: ZoneId) -> bool {
        self.document.delete_zone(id)
    }

    pub fn select_zone(&mut self, id: Option<ZoneId>) {
        self.document.select_zone(id);
    }

    /// Binds content item `content_id` to the zone, if the catalog allows it.
    pub fn assign_content(&mut self, zone: ZoneId, content_id: i64) -> Option<Zone> {
        let zone_type = self.document.zone(zone)?.content_type();
        let allowed = self
            .catalog
            .selectable_content(zone_type)
            .iter()
            .any(|item| item.id == content_id);
        if !allowed {
            debug!("content {content_id} is not selectable for {zone}");
            return None;
        }
        self.document.update_zone(
            zone,
            ZoneUpdate {
                content_id: Some(Some(content_id)),
                ..ZoneUpdate::default()
            },
        )
    }

    /// Binds playlist `playlist_id` to a playlist zone.
    pub fn assign_playlist(&mut self, zone: ZoneId, playlist_id: i64) -> Option<Zone> {
        let zone_type = self.document.zone(zone)?.content_type();
        let allowed = self
            .catalog
            .selectable_playlists(zone_type)
            .iter()
            .any(|p| p.id == playlist_id);
        if !allowed {
            debug!("playlist {playlist_id} is not selectable for {zone}");
            return None;
        }
        self.document.update_zone(
            zone,
            ZoneUpdate {
                playlist_id: Some(Some(playlist_id)),
                ..ZoneUpdate::default()
            },
        )
    }

    /// Content and playlists the zone may be bound to.
    pub fn selectable_for(&self, zone: ZoneId) -> Option<(Vec<&ContentItem>, &[PlaylistItem])> {
        let zone_type = self.document.zone(zone)?.content_type();
        Some((
            self.catalog.selectable_content(zone_type),
            self.catalog.selectable_playlists(zone_type),
        ))
    }

    // ── Display edits ─────────────────────────────────────────────────────────

    pub fn add_display(&mut self) -> Display {
        self.document.add_display()
    }

    pub fn remove_display(&mut self, id: DisplayId) -> bool {
        self.document.remove_display(id)
    }

    /// Switches the visible display.  A gesture in progress is ended first.
    pub fn switch_display(&mut self, index: usize) -> bool {
        if index < self.document.displays().len() {
            self.controller.pointer_leave();
        }
        self.document.switch_display(index)
    }

    pub fn set_primary(&mut self, id: DisplayId) -> bool {
        self.document.set_primary(id)
    }

    pub fn update_display(&mut self, id: DisplayId, update: DisplayUpdate) -> Option<Display> {
        self.document.update_display(id, update)
    }

    // ── Pointer events ────────────────────────────────────────────────────────

    pub fn pointer_down(
        &mut self,
        zone: ZoneId,
        handle: Option<ResizeHandle>,
        at: SurfacePoint,
        metrics: CanvasMetrics,
    ) -> PointerOutcome {
        match handle {
            Some(handle) => self
                .controller
                .pointer_down_on_handle(&self.document, zone, handle, at, metrics),
            None => self
                .controller
                .pointer_down_on_zone(&self.document, zone, at, metrics),
        }
    }

    pub fn pointer_move(&mut self, at: SurfacePoint, metrics: CanvasMetrics) -> PointerOutcome {
        self.controller.pointer_move(&mut self.document, at, metrics)
    }

    pub fn pointer_up(&mut self) -> PointerOutcome {
        self.controller.pointer_up(&mut self.document)
    }

    pub fn pointer_leave(&mut self) -> PointerOutcome {
        self.controller.pointer_leave()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use layout_core::Rect;

    const METRICS: CanvasMetrics = CanvasMetrics::new(1000.0, 1000.0);

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(
            vec![
                ContentItem {
                    id: 1,
                    title: Some("Intro".to_string()),
                    filename: "intro.mp4".to_string(),
                    content_type: "video".to_string(),
                },
                ContentItem {
                    id: 2,
                    title: None,
                    filename: "menu.png".to_string(),
                    content_type: "image".to_string(),
                },
            ],
            vec![PlaylistItem { id: 9, name: "Morning".to_string() }],
        )
    }

    fn session() -> EditLayoutUseCase {
        let mut session = EditLayoutUseCase::new(SurfaceState::new(), SessionSettings::default());
        session.set_catalog(catalog());
        session
    }

    #[test]
    fn test_drop_zone_uses_current_display_and_selects() {
        // Arrange
        let mut session = session();
        session.add_display();
        session.switch_display(1);

        // Act
        let zone = session.drop_zone(ContentType::Video, Point::new(50.0, 50.0));

        // Assert
        assert_eq!(zone.display_id, Some(DisplayId(2)));
        assert_eq!(session.document().selected_zone(), Some(zone.id));
    }

    #[test]
    fn test_drop_zone_honours_configured_size() {
        let mut session = EditLayoutUseCase::new(
            SurfaceState::new(),
            SessionSettings { default_zone_size: 30.0, ..SessionSettings::default() },
        );
        let zone = session.drop_zone(ContentType::Text, Point::new(50.0, 50.0));
        assert_eq!(zone.rect, Rect::new(35.0, 35.0, 30.0, 30.0));
    }

    #[test]
    fn test_assign_compatible_content() {
        let mut session = session();
        let zone = session.drop_zone(ContentType::Video, Point::new(50.0, 50.0));

        assert_eq!(session.assign_content(zone.id, 1).unwrap().content_id, Some(1));
        assert!(session.assign_content(zone.id, 2).is_none(), "image is not playable in a video zone");
        assert_eq!(session.document().zone(zone.id).unwrap().content_id, Some(1));
    }

    #[test]
    fn test_assign_playlist_only_to_playlist_zone() {
        let mut session = session();
        let video = session.drop_zone(ContentType::Video, Point::new(20.0, 20.0));
        let playlist = session.drop_zone(ContentType::Playlist, Point::new(70.0, 70.0));

        assert!(session.assign_playlist(video.id, 9).is_none());
        assert_eq!(session.assign_playlist(playlist.id, 9).unwrap().playlist_id, Some(9));
    }

    #[test]
    fn test_selectable_for_unknown_zone_is_none() {
        let session = session();
        assert!(session.selectable_for(ZoneId(5)).is_none());
    }

    #[test]
    fn test_switch_display_ends_gesture() {
        let mut session = session();
        let zone = session.drop_zone(ContentType::Image, Point::new(50.0, 50.0));
        session.add_display();
        session.pointer_down(zone.id, None, SurfacePoint::new(500.0, 500.0), METRICS);
        assert!(session.controller().host().is_listening());

        assert!(session.switch_display(1));

        assert!(session.controller().is_idle());
        assert!(!session.controller().host().is_listening());
    }

    #[test]
    fn test_pointer_drag_through_session() {
        let mut session = session();
        let zone = session.drop_zone(ContentType::Image, Point::new(50.0, 50.0));

        session.pointer_down(zone.id, None, SurfacePoint::new(500.0, 500.0), METRICS);
        session.pointer_move(SurfacePoint::new(600.0, 500.0), METRICS);
        session.pointer_up();

        assert_eq!(session.document().zone(zone.id).unwrap().rect, Rect::new(50.0, 40.0, 20.0, 20.0));
    }

    #[test]
    fn test_pointer_resize_through_session() {
        let mut session = session();
        let zone = session.drop_zone(ContentType::Image, Point::new(50.0, 50.0));

        session.pointer_down(zone.id, Some(ResizeHandle::Se), SurfacePoint::new(600.0, 600.0), METRICS);
        session.pointer_move(SurfacePoint::new(700.0, 650.0), METRICS);
        session.pointer_up();

        assert_eq!(session.document().zone(zone.id).unwrap().rect, Rect::new(40.0, 40.0, 30.0, 25.0));
    }
}
