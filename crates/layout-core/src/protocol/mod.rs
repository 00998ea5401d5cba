//! Serialized layout documents: the record shapes and the JSON codec.

pub mod codec;
pub mod records;

pub use codec::{decode_document, encode_document, ProtocolError};
pub use records::{DisplayRecord, LayoutRecord, PositionRecord, ZoneRecord};
