//! Infrastructure layer for the layout editor.
//!
//! Contains the outward-facing adapters: the HTTP backend client, local file
//! storage (configuration and JSON layouts), and the UI command bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `layout_core`, but MUST NOT be imported by the `application` layer.

pub mod http;
pub mod storage;
pub mod ui_bridge;
