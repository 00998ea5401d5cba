//! Application layer use cases for the layout editor.
//!
//! Use cases orchestrate `layout_core` domain objects and depend only on
//! traits for anything that touches the outside world.
//!
//! - **`edit_layout`** – One editing session: document edits, pointer
//!   gestures and content assignment.
//!
//! - **`catalog`** – The content and playlist catalogs and the rules for which
//!   items a zone may be bound to.
//!
//! - **`save_layout`** – Snapshotting a document and sending it to a
//!   [`save_layout::LayoutRepository`], plus tracking overlapping saves.

pub mod catalog;
pub mod edit_layout;
pub mod save_layout;
