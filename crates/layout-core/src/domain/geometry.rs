//! Geometry engine: percentage rectangles and the drag/resize transforms.
//!
//! Every zone lives on a canvas that is 100 units wide and 100 units tall,
//! whatever the physical resolution of the display it ends up on.  A zone at
//! `x = 25, width = 50` always covers the middle half of its screen.
//!
//! All functions in this module are pure: they take a rectangle and a pointer
//! input and return a new rectangle.  They never mutate their arguments, so the
//! same inputs always produce the same output.
//!
//! # Containment rules
//!
//! A valid rectangle satisfies all of:
//!
//! ```text
//! 0 <= x            0 <= y
//! width  >= 5       height >= 5
//! x + width <= 100  y + height <= 100
//! ```
//!
//! [`Rect::clamped`] maps any input (including NaN and infinities) onto the
//! nearest rectangle that satisfies these rules.

use serde::{Deserialize, Serialize};

/// Width and height of the percentage canvas.
pub const CANVAS_EXTENT: f64 = 100.0;

/// Smallest width or height a zone may have.
pub const MIN_ZONE_SIZE: f64 = 5.0;

/// Width and height given to a freshly dropped zone.
pub const DEFAULT_ZONE_SIZE: f64 = 20.0;

/// A point (or a vector) in percentage canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `self - origin`, i.e. this point expressed relative to `origin`.
    pub fn relative_to(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// An axis-aligned rectangle in percentage canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Builds a `width` × `height` rectangle centred on `center`, clamped onto the canvas.
    pub fn centered_at(center: Point, width: f64, height: f64) -> Self {
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height).clamped()
    }

    /// Returns the rightmost X coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Returns the bottommost Y coordinate.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns `true` if `point` lies inside this rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Returns `true` if the rectangle satisfies every containment rule.
    pub fn is_valid(&self) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.x >= 0.0
            && self.y >= 0.0
            && self.width >= MIN_ZONE_SIZE
            && self.height >= MIN_ZONE_SIZE
            && self.right() <= CANVAS_EXTENT
            && self.bottom() <= CANVAS_EXTENT
    }

    /// Returns the nearest rectangle that satisfies every containment rule.
    ///
    /// Size is fixed first (into `[MIN_ZONE_SIZE, CANVAS_EXTENT]`), then the
    /// origin is pinned so the far edges stay on the canvas.  A rectangle at
    /// `{90, 90, 20, 20}` therefore becomes `{80, 80, 20, 20}`.
    pub fn clamped(self) -> Rect {
        let width = bound(self.width, MIN_ZONE_SIZE, CANVAS_EXTENT);
        let height = bound(self.height, MIN_ZONE_SIZE, CANVAS_EXTENT);
        Rect {
            x: bound(self.x, 0.0, CANVAS_EXTENT - width),
            y: bound(self.y, 0.0, CANVAS_EXTENT - height),
            width,
            height,
        }
    }
}

/// One of the four corner grab points used to resize a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Bottom-right corner; anchors the top-left.
    Se,
    /// Bottom-left corner; anchors the top-right.
    Sw,
    /// Top-right corner; anchors the bottom-left.
    Ne,
    /// Top-left corner; anchors the bottom-right.
    Nw,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::Se,
        ResizeHandle::Sw,
        ResizeHandle::Ne,
        ResizeHandle::Nw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::Se => "se",
            ResizeHandle::Sw => "sw",
            ResizeHandle::Ne => "ne",
            ResizeHandle::Nw => "nw",
        }
    }

    /// Parses the short handle name used by UI layers (`"se"`, `"nw"`, ...).
    pub fn parse(name: &str) -> Option<ResizeHandle> {
        ResizeHandle::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// `true` when the handle moves the left edge (the x axis behaves like `nw`).
    fn moves_left_edge(self) -> bool {
        matches!(self, ResizeHandle::Sw | ResizeHandle::Nw)
    }

    /// `true` when the handle moves the top edge (the y axis behaves like `nw`).
    fn moves_top_edge(self) -> bool {
        matches!(self, ResizeHandle::Ne | ResizeHandle::Nw)
    }
}

/// Computes the new top-left corner of a zone being dragged.
///
/// `pointer` is the current pointer position in canvas space and `grab_offset`
/// is where the pointer sat relative to the zone's top-left corner when the
/// drag began.  The offset is captured once per drag so the zone keeps its
/// position under the cursor instead of jumping its corner to the pointer.
///
/// Each axis is clamped independently into `[0, 100 - size]`.
pub fn compute_drag_position(rect: &Rect, pointer: Point, grab_offset: Point) -> Point {
    let rect = rect.clamped();
    Point::new(
        bound(pointer.x - grab_offset.x, 0.0, CANVAS_EXTENT - rect.width),
        bound(pointer.y - grab_offset.y, 0.0, CANVAS_EXTENT - rect.height),
    )
}

/// Applies one pointer move of `delta` (canvas units) to `rect` via `handle`.
///
/// Each handle anchors the opposite corner:
///
/// - An edge on the far side (right or bottom) grows freely and is clamped so
///   it never passes 100 and the size never drops under 5.
/// - An edge on the near side (left or top) moves the origin with the pointer
///   and shrinks the size by the same amount.  The change is applied only if
///   the new size stays `>= 5` **and** the new origin stays within `[0, 95]`;
///   otherwise that axis is left untouched for this move.
///
/// The axes are independent: a rejected horizontal change never blocks a
/// valid vertical one.  The result is always re-clamped, so it is valid even
/// when `rect` was not.
pub fn compute_resize(rect: &Rect, handle: ResizeHandle, delta: Point) -> Rect {
    let rect = rect.clamped();

    let (x, width) = if handle.moves_left_edge() {
        move_near_edge(rect.x, rect.width, delta.x).unwrap_or((rect.x, rect.width))
    } else {
        (rect.x, grow_far_edge(rect.x, rect.width, delta.x))
    };

    let (y, height) = if handle.moves_top_edge() {
        move_near_edge(rect.y, rect.height, delta.y).unwrap_or((rect.y, rect.height))
    } else {
        (rect.y, grow_far_edge(rect.y, rect.height, delta.y))
    };

    Rect::new(x, y, width, height).clamped()
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Grows or shrinks a size whose far edge follows the pointer.
fn grow_far_edge(origin: f64, size: f64, delta: f64) -> f64 {
    bound(size + delta, MIN_ZONE_SIZE, CANVAS_EXTENT - origin)
}

/// Moves the near edge by `delta`, keeping the far edge fixed.
///
/// Returns `None` when the candidate would break the size or origin limits.
fn move_near_edge(origin: f64, size: f64, delta: f64) -> Option<(f64, f64)> {
    if !delta.is_finite() {
        return None;
    }
    let new_origin = origin + delta;
    let new_size = size - delta;
    let origin_ok = (0.0..=CANVAS_EXTENT - MIN_ZONE_SIZE).contains(&new_origin);
    (new_size >= MIN_ZONE_SIZE && origin_ok).then_some((new_origin, new_size))
}

/// Clamps `value` into `[lo, hi]` without panicking.
///
/// Unlike `f64::clamp` this tolerates NaN (mapped to `lo`) and an inverted range
/// (resolved to `hi`).
fn bound(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
