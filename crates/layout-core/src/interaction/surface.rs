//! The interaction lock and the hosts that honour it.
//!
//! While a gesture is armed or active the embedding UI must route every pointer
//! event to the editor (pointer capture), show a gesture cursor, and suppress
//! text selection.  The controller describes that requirement as an
//! [`InteractionLock`] and hands it to a [`PointerHost`] on entry and on exit.
//! It is the controller's job to guarantee that every `acquire` is paired with
//! exactly one `release`.

use crate::domain::geometry::ResizeHandle;
use crate::domain::ids::ZoneId;

/// Gesture a pointer-down started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeHandle),
}

/// Cursor override requested while a gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Grabbing,
    /// Diagonal from top-left to bottom-right (`nw` and `se` handles).
    NwseResize,
    /// Diagonal from top-right to bottom-left (`ne` and `sw` handles).
    NeswResize,
}

impl CursorStyle {
    /// Cursor to show for `gesture`.
    pub fn for_gesture(gesture: GestureKind) -> Self {
        match gesture {
            GestureKind::Drag => CursorStyle::Grabbing,
            GestureKind::Resize(ResizeHandle::Nw | ResizeHandle::Se) => CursorStyle::NwseResize,
            GestureKind::Resize(ResizeHandle::Ne | ResizeHandle::Sw) => CursorStyle::NeswResize,
        }
    }

    /// CSS `cursor` keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            CursorStyle::Default => "default",
            CursorStyle::Grabbing => "grabbing",
            CursorStyle::NwseResize => "nwse-resize",
            CursorStyle::NeswResize => "nesw-resize",
        }
    }
}

/// Side effects held for the duration of one gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionLock {
    pub zone: ZoneId,
    pub gesture: GestureKind,
    pub cursor: CursorStyle,
}

impl InteractionLock {
    pub fn new(zone: ZoneId, gesture: GestureKind) -> Self {
        Self {
            zone,
            gesture,
            cursor: CursorStyle::for_gesture(gesture),
        }
    }
}

/// Implemented by the UI layer embedding the editor canvas.
pub trait PointerHost {
    /// Subscribe to surface-wide pointer events and apply the lock's overrides.
    fn acquire(&mut self, lock: &InteractionLock);

    /// Undo everything `acquire` did.
    fn release(&mut self, lock: &InteractionLock);
}

/// A [`PointerHost`] that records the lock state so a UI can query it.
///
/// Headless front-ends (the command bridge, the CLI, tests) use this instead
/// of a real windowing surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceState {
    listening: bool,
    captured_zone: Option<ZoneId>,
    cursor: CursorStyle,
    selection_suppressed: bool,
    acquisitions: u64,
    releases: u64,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while pointer-move/pointer-up listeners are registered.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn captured_zone(&self) -> Option<ZoneId> {
        self.captured_zone
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn is_selection_suppressed(&self) -> bool {
        self.selection_suppressed
    }

    pub fn acquisitions(&self) -> u64 {
        self.acquisitions
    }

    pub fn releases(&self) -> u64 {
        self.releases
    }
}

impl PointerHost for SurfaceState {
    fn acquire(&mut self, lock: &InteractionLock) {
        self.listening = true;
        self.captured_zone = Some(lock.zone);
        self.cursor = lock.cursor;
        self.selection_suppressed = true;
        self.acquisitions += 1;
    }

    fn release(&mut self, _lock: &InteractionLock) {
        self.listening = false;
        self.captured_zone = None;
        self.cursor = CursorStyle::Default;
        self.selection_suppressed = false;
        self.releases += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_matches_handle_diagonal() {
        assert_eq!(
            CursorStyle::for_gesture(GestureKind::Resize(ResizeHandle::Se)).css_name(),
            "nwse-resize"
        );
        assert_eq!(
            CursorStyle::for_gesture(GestureKind::Resize(ResizeHandle::Sw)).css_name(),
            "nesw-resize"
        );
        assert_eq!(CursorStyle::for_gesture(GestureKind::Drag), CursorStyle::Grabbing);
    }

    #[test]
    fn test_surface_state_acquire_then_release_restores_defaults() {
        // Arrange
        let mut surface = SurfaceState::new();
        let lock = InteractionLock::new(ZoneId(3), GestureKind::Drag);

        // Act
        surface.acquire(&lock);
        let during = surface.clone();
        surface.release(&lock);

        // Assert
        assert!(during.is_listening());
        assert_eq!(during.captured_zone(), Some(ZoneId(3)));
        assert!(during.is_selection_suppressed());
        assert!(!surface.is_listening());
        assert_eq!(surface.cursor(), CursorStyle::Default);
        assert_eq!((surface.acquisitions(), surface.releases()), (1, 1));
    }
}
