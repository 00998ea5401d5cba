//! Typed identifiers for zones and displays, and the allocator that issues them.
//!
//! Identifiers are plain integers on the wire.  Inside the crate they are
//! wrapped in newtypes so a `ZoneId` can never be passed where a `DisplayId`
//! is expected.
//!
//! The [`IdAllocator`] is owned by the layout document.  It hands out
//! strictly increasing values and is seeded past the largest id already
//! present when a persisted layout is loaded, so ids never collide within an
//! editing session.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Unique identifier of a zone within a layout document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u64);

/// Unique identifier of a display within a layout document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(pub u64);

impl From<u64> for ZoneId {
    fn from(raw: u64) -> Self {
        ZoneId(raw)
    }
}

impl From<u64> for DisplayId {
    fn from(raw: u64) -> Self {
        DisplayId(raw)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display#{}", self.0)
    }
}

/// Monotonic id source for one kind of identifier.
#[derive(Debug, Clone)]
pub struct IdAllocator<T> {
    next: u64,
    _kind: PhantomData<T>,
}

impl<T: From<u64>> IdAllocator<T> {
    /// Creates an allocator whose first id is `1`.
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Creates an allocator whose first id is `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        Self {
            next: last.saturating_add(1),
            _kind: PhantomData,
        }
    }

    /// Issues the next id.
    pub fn next_id(&mut self) -> T {
        let raw = self.next;
        self.next = self.next.saturating_add(1);
        T::from(raw)
    }

    /// Records an externally created id so it is never issued again.
    pub fn observe(&mut self, raw: u64) {
        if raw >= self.next {
            self.next = raw.saturating_add(1);
        }
    }
}

impl<T: From<u64>> Default for IdAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}
