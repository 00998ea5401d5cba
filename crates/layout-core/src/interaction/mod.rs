//! Pointer interaction state machine.
//!
//! A single pointer-down can mean "select this zone" or "start moving it".
//! The [`InteractionController`] tells the two apart with a pixel threshold:
//!
//! ```text
//! Idle ──down──▶ Armed ──move > threshold──▶ Dragging | Resizing
//!   ▲              │                               │
//!   └──── up / leave (click selects) ◀─────────────┘
//! ```
//!
//! Entering `Armed` acquires an [`InteractionLock`] from the [`PointerHost`];
//! every path back to `Idle` releases it, including pointer-leave and dropping
//! the controller.

pub mod surface;

pub use surface::{CursorStyle, GestureKind, InteractionLock, PointerHost, SurfaceState};

use tracing::debug;

use crate::domain::document::{LayoutDocument, Zone, ZoneUpdate};
use crate::domain::geometry::{compute_drag_position, compute_resize, Point, Rect, ResizeHandle, CANVAS_EXTENT};
use crate::domain::ids::ZoneId;

/// Pointer displacement, in pixels, a gesture must exceed before it starts.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 5.0;

/// A pointer position in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
}

impl SurfacePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`, in pixels.
    pub fn distance_to(self, other: SurfacePoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Pixel size of the surface the canvas is drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMetrics {
    pub width_px: f64,
    pub height_px: f64,
}

impl CanvasMetrics {
    pub const fn new(width_px: f64, height_px: f64) -> Self {
        Self { width_px, height_px }
    }

    /// Converts a surface position into canvas percentages.
    ///
    /// A degenerate surface (zero, negative or non-finite size) maps every
    /// point to the origin instead of producing infinities.
    pub fn to_percent(&self, point: SurfacePoint) -> Point {
        Point::new(
            scale(point.x, self.width_px),
            scale(point.y, self.height_px),
        )
    }
}

fn scale(px: f64, extent_px: f64) -> f64 {
    if extent_px.is_finite() && extent_px > 0.0 {
        px * CANVAS_EXTENT / extent_px
    } else {
        0.0
    }
}

/// Current phase of the pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Pointer is down but has not moved past the threshold yet.
    Armed {
        zone: ZoneId,
        kind: GestureKind,
        start: SurfacePoint,
        /// Pointer position relative to the zone's top-left, in percent.
        grab_offset: Point,
    },
    Dragging {
        zone: ZoneId,
        grab_offset: Point,
    },
    Resizing {
        zone: ZoneId,
        handle: ResizeHandle,
        /// Pointer position of the previous move, in percent.
        last: Point,
    },
}

impl InteractionState {
    /// Zone the gesture targets, if any.
    pub fn zone(&self) -> Option<ZoneId> {
        match *self {
            InteractionState::Idle => None,
            InteractionState::Armed { zone, .. }
            | InteractionState::Dragging { zone, .. }
            | InteractionState::Resizing { zone, .. } => Some(zone),
        }
    }
}

/// What a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing happened (no gesture, unknown zone, or one already active).
    Ignored,
    /// A gesture was armed and the interaction lock acquired.
    Armed,
    /// Armed, but the pointer has not moved far enough yet.
    Pending,
    /// The zone geometry changed.
    Moved(Zone),
    /// Pointer-up before the threshold: the zone was selected.
    Clicked(ZoneId),
    /// The gesture ended and the lock was released.
    Released,
}

/// Drives zone drags and resizes from raw pointer events.
#[derive(Debug)]
pub struct InteractionController<H: PointerHost> {
    state: InteractionState,
    threshold_px: f64,
    host: H,
    lock: Option<InteractionLock>,
}

impl<H: PointerHost> InteractionController<H> {
    pub fn new(host: H) -> Self {
        Self::with_threshold(host, DEFAULT_DRAG_THRESHOLD_PX)
    }

    /// A negative or non-finite threshold falls back to the default.
    pub fn with_threshold(host: H, threshold_px: f64) -> Self {
        let threshold_px = if threshold_px.is_finite() && threshold_px >= 0.0 {
            threshold_px
        } else {
            DEFAULT_DRAG_THRESHOLD_PX
        };
        Self {
            state: InteractionState::Idle,
            threshold_px,
            host,
            lock: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub fn threshold_px(&self) -> f64 {
        self.threshold_px
    }

    /// The lock currently held, if a gesture is armed or active.
    pub fn lock(&self) -> Option<&InteractionLock> {
        self.lock.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Pointer pressed on the body of `zone`: arms a drag.
    pub fn pointer_down_on_zone(
        &mut self,
        doc: &LayoutDocument,
        zone: ZoneId,
        at: SurfacePoint,
        metrics: CanvasMetrics,
    ) -> PointerOutcome {
        self.arm(doc, zone, GestureKind::Drag, at, metrics)
    }

    /// Pointer pressed on one of the resize handles of `zone`: arms a resize.
    pub fn pointer_down_on_handle(
        &mut self,
        doc: &LayoutDocument,
        zone: ZoneId,
        handle: ResizeHandle,
        at: SurfacePoint,
        metrics: CanvasMetrics,
    ) -> PointerOutcome {
        self.arm(doc, zone, GestureKind::Resize(handle), at, metrics)
    }

    /// Pointer moved anywhere on the surface.
    pub fn pointer_move(
        &mut self,
        doc: &mut LayoutDocument,
        at: SurfacePoint,
        metrics: CanvasMetrics,
    ) -> PointerOutcome {
        if !at.is_finite() {
            debug!("pointer-move to non-finite {at:?} ignored");
            return PointerOutcome::Ignored;
        }
        let pointer = metrics.to_percent(at);
        match self.state {
            InteractionState::Idle => PointerOutcome::Ignored,

            InteractionState::Armed { zone, kind, start, grab_offset } => {
                if at.distance_to(start) <= self.threshold_px {
                    return PointerOutcome::Pending;
                }
                doc.select_zone(Some(zone));
                match kind {
                    GestureKind::Drag => {
                        debug!("{zone}: armed -> dragging");
                        self.state = InteractionState::Dragging { zone, grab_offset };
                        self.drag_to(doc, zone, pointer, grab_offset)
                    }
                    GestureKind::Resize(handle) => {
                        debug!("{zone}: armed -> resizing ({})", handle.as_str());
                        let origin = metrics.to_percent(start);
                        self.state = InteractionState::Resizing { zone, handle, last: pointer };
                        self.resize_by(doc, zone, handle, pointer.relative_to(origin))
                    }
                }
            }

            InteractionState::Dragging { zone, grab_offset } => self.drag_to(doc, zone, pointer, grab_offset),

            InteractionState::Resizing { zone, handle, last } => {
                self.state = InteractionState::Resizing { zone, handle, last: pointer };
                self.resize_by(doc, zone, handle, pointer.relative_to(last))
            }
        }
    }

    /// Pointer released.  A release while still armed is a click and selects the zone.
    pub fn pointer_up(&mut self, doc: &mut LayoutDocument) -> PointerOutcome {
        match self.state {
            InteractionState::Idle => PointerOutcome::Ignored,
            InteractionState::Armed { zone, .. } => {
                doc.select_zone(Some(zone));
                self.finish();
                PointerOutcome::Clicked(zone)
            }
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. } => {
                self.finish();
                PointerOutcome::Released
            }
        }
    }

    /// Pointer left the tracked surface.  Ends any gesture without selecting.
    pub fn pointer_leave(&mut self) -> PointerOutcome {
        if self.is_idle() {
            return PointerOutcome::Ignored;
        }
        debug!("pointer left surface, ending gesture");
        self.finish();
        PointerOutcome::Released
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn arm(
        &mut self,
        doc: &LayoutDocument,
        zone: ZoneId,
        kind: GestureKind,
        at: SurfacePoint,
        metrics: CanvasMetrics,
    ) -> PointerOutcome {
        if !self.is_idle() {
            debug!("pointer-down on {zone} ignored, gesture already in progress");
            return PointerOutcome::Ignored;
        }
        if !at.is_finite() {
            debug!("pointer-down on {zone} at non-finite {at:?} ignored");
            return PointerOutcome::Ignored;
        }
        let Some(target) = doc.zone(zone) else {
            debug!("pointer-down on missing {zone} ignored");
            return PointerOutcome::Ignored;
        };

        let grab_offset = metrics.to_percent(at).relative_to(target.rect.origin());
        let lock = InteractionLock::new(zone, kind);
        self.host.acquire(&lock);
        self.lock = Some(lock);
        self.state = InteractionState::Armed { zone, kind, start: at, grab_offset };
        debug!("{zone}: idle -> armed ({kind:?})");
        PointerOutcome::Armed
    }

    fn drag_to(&mut self, doc: &mut LayoutDocument, zone: ZoneId, pointer: Point, grab_offset: Point) -> PointerOutcome {
        let Some(rect) = doc.zone(zone).map(|z| z.rect) else {
            return self.abandon(zone);
        };
        let origin = compute_drag_position(&rect, pointer, grab_offset);
        let moved = Rect::new(origin.x, origin.y, rect.width, rect.height);
        self.apply(doc, zone, moved)
    }

    fn resize_by(&mut self, doc: &mut LayoutDocument, zone: ZoneId, handle: ResizeHandle, delta: Point) -> PointerOutcome {
        let Some(rect) = doc.zone(zone).map(|z| z.rect) else {
            return self.abandon(zone);
        };
        let resized = compute_resize(&rect, handle, delta);
        self.apply(doc, zone, resized)
    }

    fn apply(&mut self, doc: &mut LayoutDocument, zone: ZoneId, rect: Rect) -> PointerOutcome {
        match doc.update_zone(zone, ZoneUpdate::with_rect(rect)) {
            Some(updated) => PointerOutcome::Moved(updated),
            None => self.abandon(zone),
        }
    }

    /// The target zone was deleted mid-gesture.
    fn abandon(&mut self, zone: ZoneId) -> PointerOutcome {
        debug!("{zone} vanished mid-gesture");
        self.finish();
        PointerOutcome::Released
    }

    fn finish(&mut self) {
        self.state = InteractionState::Idle;
        if let Some(lock) = self.lock.take() {
            self.host.release(&lock);
        }
    }
}

impl<H: PointerHost> Drop for InteractionController<H> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            self.host.release(&lock);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::ContentType;
    use std::sync::{Arc, Mutex};

    /// 10 px per percent horizontally, 5 px per percent vertically.
    const METRICS: CanvasMetrics = CanvasMetrics::new(1000.0, 500.0);

    #[derive(Clone, Default)]
    struct RecordingHost {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingHost {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PointerHost for RecordingHost {
        fn acquire(&mut self, lock: &InteractionLock) {
            self.calls.lock().unwrap().push(format!("acquire {}", lock.zone));
        }

        fn release(&mut self, lock: &InteractionLock) {
            self.calls.lock().unwrap().push(format!("release {}", lock.zone));
        }
    }

    /// Document with one 20×20 zone at (40, 40).
    fn setup() -> (LayoutDocument, ZoneId) {
        let mut doc = LayoutDocument::new();
        let zone = doc.add_zone(Some(doc.current_display().id), ContentType::Image, Point::new(50.0, 50.0));
        (doc, zone.id)
    }

    fn px(x: f64, y: f64) -> SurfacePoint {
        SurfacePoint::new(x, y)
    }

    // ── Threshold ─────────────────────────────────────────────────────────────

    #[test]
    fn test_move_of_4px_stays_armed() {
        // Arrange
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());
        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);

        // Act
        let outcome = ctl.pointer_move(&mut doc, px(454.0, 225.0), METRICS);

        // Assert
        assert_eq!(outcome, PointerOutcome::Pending);
        assert!(matches!(ctl.state(), InteractionState::Armed { .. }));
        assert_eq!(doc.zone(id).unwrap().rect, Rect::new(40.0, 40.0, 20.0, 20.0));
    }

    #[test]
    fn test_move_of_exactly_threshold_stays_armed() {
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());
        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);

        // 3-4-5 triangle: displacement is exactly 5 px.
        let outcome = ctl.pointer_move(&mut doc, px(453.0, 229.0), METRICS);

        assert_eq!(outcome, PointerOutcome::Pending);
    }

    #[test]
    fn test_move_of_6px_starts_drag() {
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());
        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);

        let outcome = ctl.pointer_move(&mut doc, px(456.0, 225.0), METRICS);

        assert!(matches!(outcome, PointerOutcome::Moved(_)));
        assert!(matches!(ctl.state(), InteractionState::Dragging { .. }));
        assert_eq!(doc.selected_zone(), Some(id));
    }

    #[test]
    fn test_custom_threshold_is_honoured() {
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::with_threshold(SurfaceState::new(), 20.0);
        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);

        assert_eq!(ctl.pointer_move(&mut doc, px(465.0, 225.0), METRICS), PointerOutcome::Pending);
        assert!(matches!(ctl.pointer_move(&mut doc, px(475.0, 225.0), METRICS), PointerOutcome::Moved(_)));
    }

    // ── Click ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_click_selects_without_moving() {
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());

        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);
        ctl.pointer_move(&mut doc, px(452.0, 226.0), METRICS);
        let outcome = ctl.pointer_up(&mut doc);

        assert_eq!(outcome, PointerOutcome::Clicked(id));
        assert_eq!(doc.selected_zone(), Some(id));
        assert_eq!(doc.zone(id).unwrap().rect, Rect::new(40.0, 40.0, 20.0, 20.0));
        assert!(ctl.is_idle());
        assert!(!ctl.host().is_listening());
    }

    // ── Drag ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_drag_keeps_grab_offset() {
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());

        // Grab 5% in from the zone's top-left corner.
        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);
        let outcome = ctl.pointer_move(&mut doc, px(700.0, 225.0), METRICS);

        let PointerOutcome::Moved(zone) = outcome else {
            panic!("expected Moved, got {outcome:?}");
        };
        assert_eq!(zone.rect, Rect::new(65.0, 40.0, 20.0, 20.0));
    }

    #[test]
    fn test_drag_out_of_bounds_pins_to_edge() {
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());

        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);
        ctl.pointer_move(&mut doc, px(1500.0, -400.0), METRICS);

        assert_eq!(doc.zone(id).unwrap().rect, Rect::new(80.0, 0.0, 20.0, 20.0));
    }

    // ── Resize ────────────────────────────────────────────────────────────────

    #[test]
    fn test_resize_nw_axes_are_independent() {
        // Arrange: zone at (20, 20) sized 10 × 20.
        let (mut doc, id) = setup();
        doc.update_zone(id, ZoneUpdate::with_rect(Rect::new(20.0, 20.0, 10.0, 20.0)));
        let mut ctl = InteractionController::new(SurfaceState::new());
        ctl.pointer_down_on_handle(&doc, id, ResizeHandle::Nw, px(200.0, 100.0), METRICS);

        // Act: +6% horizontally (width would hit 4), +2% vertically.
        ctl.pointer_move(&mut doc, px(260.0, 110.0), METRICS);

        // Assert
        assert_eq!(doc.zone(id).unwrap().rect, Rect::new(20.0, 22.0, 10.0, 18.0));
        assert!(matches!(ctl.state(), InteractionState::Resizing { handle: ResizeHandle::Nw, .. }));
    }

    #[test]
    fn test_resize_se_applies_incremental_moves() {
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());
        ctl.pointer_down_on_handle(&doc, id, ResizeHandle::Se, px(600.0, 300.0), METRICS);

        ctl.pointer_move(&mut doc, px(650.0, 300.0), METRICS);
        ctl.pointer_move(&mut doc, px(700.0, 350.0), METRICS);
        ctl.pointer_up(&mut doc);

        assert_eq!(doc.zone(id).unwrap().rect, Rect::new(40.0, 40.0, 30.0, 30.0));
    }

    // ── Lock lifecycle ────────────────────────────────────────────────────────

    #[test]
    fn test_lock_acquired_on_arm_and_released_on_up() {
        let (mut doc, id) = setup();
        let host = RecordingHost::default();
        let mut ctl = InteractionController::new(host.clone());

        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);
        assert_eq!(ctl.lock().map(|l| l.cursor), Some(CursorStyle::Grabbing));
        ctl.pointer_move(&mut doc, px(600.0, 225.0), METRICS);
        ctl.pointer_up(&mut doc);

        assert_eq!(host.calls(), vec!["acquire zone#1", "release zone#1"]);
        assert!(ctl.lock().is_none());
    }

    #[test]
    fn test_pointer_leave_releases_without_selecting() {
        let (doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());

        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);
        assert!(ctl.host().is_listening());
        let outcome = ctl.pointer_leave();

        assert_eq!(outcome, PointerOutcome::Released);
        assert!(!ctl.host().is_listening());
        assert_eq!(ctl.host().releases(), 1);
        assert_eq!(doc.selected_zone(), None);
        assert_eq!(ctl.pointer_leave(), PointerOutcome::Ignored);
    }

    #[test]
    fn test_drop_while_armed_releases_lock() {
        let (doc, id) = setup();
        let host = RecordingHost::default();
        {
            let mut ctl = InteractionController::new(host.clone());
            ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);
        }
        assert_eq!(host.calls(), vec!["acquire zone#1", "release zone#1"]);
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let (mut doc, first) = setup();
        let second = doc.add_zone(None, ContentType::Text, Point::new(10.0, 10.0)).id;
        let host = RecordingHost::default();
        let mut ctl = InteractionController::new(host.clone());

        ctl.pointer_down_on_zone(&doc, first, px(450.0, 225.0), METRICS);
        let outcome = ctl.pointer_down_on_zone(&doc, second, px(100.0, 50.0), METRICS);

        assert_eq!(outcome, PointerOutcome::Ignored);
        assert_eq!(ctl.state().zone(), Some(first));
        assert_eq!(host.calls().len(), 1);
    }

    #[test]
    fn test_pointer_down_on_missing_zone_is_ignored() {
        let (doc, _) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());
        let outcome = ctl.pointer_down_on_zone(&doc, ZoneId(42), px(0.0, 0.0), METRICS);
        assert_eq!(outcome, PointerOutcome::Ignored);
        assert_eq!(ctl.host().acquisitions(), 0);
    }

    #[test]
    fn test_zone_deleted_mid_drag_ends_gesture() {
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());
        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);
        ctl.pointer_move(&mut doc, px(500.0, 225.0), METRICS);

        doc.delete_zone(id);
        let outcome = ctl.pointer_move(&mut doc, px(550.0, 225.0), METRICS);

        assert_eq!(outcome, PointerOutcome::Released);
        assert!(ctl.is_idle());
        assert!(!ctl.host().is_listening());
        assert!(doc.zones().is_empty());
    }

    #[test]
    fn test_non_finite_move_leaves_gesture_untouched() {
        // Arrange: armed, then dragging.
        let (mut doc, id) = setup();
        let mut ctl = InteractionController::new(SurfaceState::new());
        ctl.pointer_down_on_zone(&doc, id, px(450.0, 225.0), METRICS);
        assert_eq!(ctl.pointer_move(&mut doc, px(f64::NAN, 225.0), METRICS), PointerOutcome::Ignored);
        assert!(matches!(ctl.state(), InteractionState::Armed { .. }));
        ctl.pointer_move(&mut doc, px(500.0, 225.0), METRICS);
        let before = doc.zone(id).unwrap().rect;

        // Act
        let nan = ctl.pointer_move(&mut doc, px(f64::NAN, f64::NAN), METRICS);
        let inf = ctl.pointer_move(&mut doc, px(f64::INFINITY, 0.0), METRICS);

        // Assert
        assert_eq!(nan, PointerOutcome::Ignored);
        assert_eq!(inf, PointerOutcome::Ignored);
        assert!(matches!(ctl.state(), InteractionState::Dragging { .. }));
        assert_eq!(doc.zone(id).unwrap().rect, before);
        assert!(doc.zone(id).unwrap().rect.is_valid());
    }

    #[test]
    fn test_non_finite_pointer_down_is_ignored() {
        let (doc, id) = setup();
        let host = RecordingHost::default();
        let mut ctl = InteractionController::new(host.clone());

        let outcome = ctl.pointer_down_on_zone(&doc, id, px(f64::NAN, 10.0), METRICS);

        assert_eq!(outcome, PointerOutcome::Ignored);
        assert!(ctl.is_idle());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_degenerate_metrics_do_not_produce_infinities() {
        let metrics = CanvasMetrics::new(0.0, f64::NAN);
        assert_eq!(metrics.to_percent(px(300.0, 200.0)), Point::new(0.0, 0.0));
    }
}
