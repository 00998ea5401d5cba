//! # layout-core
//!
//! Layout model for the signage layout editor: percentage-based zone
//! geometry, the pointer interaction state machine, the display/zone document
//! and the per-content-type settings registry.
//!
//! The crate performs no I/O and spawns no tasks.  The editor crate supplies
//! pointer events, catalogs and persistence.
//!
//! - **`domain`** – Geometry engine, identifiers, unit parsing, content
//!   settings, and [`LayoutDocument`], which owns every layout invariant.
//!
//! - **`interaction`** – [`InteractionController`], which turns raw pointer
//!   events into drags, resizes and clicks, and the [`PointerHost`] seam
//!   through which it acquires and releases UI side effects.
//!
//! - **`protocol`** – The JSON record shape the backend stores and the
//!   tolerant codec between records and documents.

pub mod domain;
pub mod interaction;
pub mod protocol;

pub use domain::document::{
    Display, DisplayOffset, DisplayUpdate, LayoutDocument, LayoutError, LayoutType, Orientation,
    Zone, ZoneUpdate,
};
pub use domain::geometry::{
    compute_drag_position, compute_resize, Point, Rect, ResizeHandle, CANVAS_EXTENT,
    DEFAULT_ZONE_SIZE, MIN_ZONE_SIZE,
};
pub use domain::ids::{DisplayId, IdAllocator, ZoneId};
pub use domain::settings::{defaults_for, ContentSettings, ContentType, SettingsPatch};
pub use domain::units::{CssLength, LengthUnit, Resolution, UnitParseError};
pub use interaction::{
    CanvasMetrics, CursorStyle, GestureKind, InteractionController, InteractionLock,
    InteractionState, PointerHost, PointerOutcome, SurfacePoint, SurfaceState,
    DEFAULT_DRAG_THRESHOLD_PX,
};
pub use protocol::{decode_document, encode_document, LayoutRecord, ProtocolError};
