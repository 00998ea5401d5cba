//! Domain layer: pure layout logic with no I/O.

pub mod document;
pub mod geometry;
pub mod ids;
pub mod settings;
pub mod units;
