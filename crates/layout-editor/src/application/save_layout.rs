//! SaveLayoutUseCase: sends a document snapshot to the layout repository.
//!
//! Saving is snapshot based: the document is validated and copied into a
//! [`LayoutRecord`] first, then the copy is sent.  The document itself is
//! never held across the network call, so the editor stays interactive while
//! a save is in flight, and a failed save leaves it untouched.
//!
//! Saves may overlap.  No ordering is enforced between them; the
//! [`SaveTracker`] simply reports whichever attempt settled last.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use layout_core::{LayoutDocument, LayoutRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

/// Identifier the backend assigns to a stored layout.
///
/// The API issues numeric ids; they are carried as text so the file
/// repository can use its own (UUID) names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutId(pub String);

impl LayoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised by a [`LayoutRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The request never produced a response (network, DNS, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("backend error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("layout {0} not found")]
    NotFound(LayoutId),

    /// The id cannot be used by this repository (e.g. contains a path separator).
    #[error("invalid layout id {0:?}")]
    InvalidId(String),

    /// A response or stored file did not contain a layout.
    #[error("malformed layout data: {0}")]
    Malformed(String),

    /// Local file-system failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Persistence endpoint for whole layout documents.
///
/// There is no partial update: every write carries the full record.
#[async_trait]
pub trait LayoutRepository: Send + Sync {
    /// Stores a new layout and returns the id the backend assigned.
    async fn create(&self, record: &LayoutRecord) -> Result<LayoutId, RepositoryError>;

    /// Overwrites the layout `id`.
    async fn replace(&self, id: &LayoutId, record: &LayoutRecord) -> Result<(), RepositoryError>;

    async fn fetch(&self, id: &LayoutId) -> Result<LayoutRecord, RepositoryError>;
}

/// Error type for the save use case.
#[derive(Debug, Error)]
pub enum SaveLayoutError {
    #[error("layout name is required before saving")]
    MissingName,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What a successful save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(LayoutId),
    Replaced(LayoutId),
}

impl SaveOutcome {
    pub fn id(&self) -> &LayoutId {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Replaced(id) => id,
        }
    }
}

/// Saves and loads layout documents through a [`LayoutRepository`].
#[derive(Clone)]
pub struct SaveLayoutUseCase {
    repository: Arc<dyn LayoutRepository>,
}

impl SaveLayoutUseCase {
    pub fn new(repository: Arc<dyn LayoutRepository>) -> Self {
        Self { repository }
    }

    /// Validates `doc` and snapshots it for sending.
    ///
    /// # Errors
    ///
    /// Returns [`SaveLayoutError::MissingName`] when the layout has no name.
    pub fn snapshot(doc: &LayoutDocument) -> Result<LayoutRecord, SaveLayoutError> {
        if !doc.can_save() {
            return Err(SaveLayoutError::MissingName);
        }
        Ok(doc.to_record())
    }

    /// Sends a snapshot: creates a new layout when `target` is `None`,
    /// otherwise replaces `target`.  No retry is attempted.
    pub async fn send(
        &self,
        target: Option<&LayoutId>,
        record: &LayoutRecord,
    ) -> Result<SaveOutcome, SaveLayoutError> {
        let result = match target {
            None => self.repository.create(record).await.map(SaveOutcome::Created),
            Some(id) => self
                .repository
                .replace(id, record)
                .await
                .map(|()| SaveOutcome::Replaced(id.clone())),
        };

        match &result {
            Ok(outcome) => info!("layout {:?} saved as {}", record.name, outcome.id()),
            Err(e) => error!("saving layout {:?} failed: {e}", record.name),
        }
        Ok(result?)
    }

    /// Validates, snapshots and sends `doc` in one step.
    pub async fn save(
        &self,
        doc: &LayoutDocument,
        target: Option<&LayoutId>,
    ) -> Result<SaveOutcome, SaveLayoutError> {
        let record = Self::snapshot(doc)?;
        self.send(target, &record).await
    }

    /// Fetches the layout `id` and repairs it into an editable document.
    pub async fn load(&self, id: &LayoutId) -> Result<LayoutDocument, RepositoryError> {
        let record = self.repository.fetch(id).await?;
        info!("loaded layout {id} ({} zones)", record.zones.len());
        Ok(LayoutDocument::from_record(record))
    }
}

// ── Save status tracking ──────────────────────────────────────────────────────

/// User-visible result of the most recently settled save.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved(LayoutId),
    Failed(String),
}

/// Handle for one save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SaveTicket(u64);

/// Tracks overlapping save attempts.
#[derive(Debug, Default)]
pub struct SaveTracker {
    next_ticket: u64,
    in_flight: usize,
    last_settled: Option<SaveTicket>,
    status: SaveStatus,
}

impl SaveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new attempt.  The status shows `Saving` until one settles.
    pub fn begin(&mut self) -> SaveTicket {
        self.next_ticket += 1;
        self.in_flight += 1;
        self.status = SaveStatus::Saving;
        SaveTicket(self.next_ticket)
    }

    /// Records the result of `ticket`.  The latest call wins, whatever order
    /// the attempts were started in.
    pub fn settle(&mut self, ticket: SaveTicket, result: &Result<SaveOutcome, SaveLayoutError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.last_settled = Some(ticket);
        self.status = match result {
            Ok(outcome) => SaveStatus::Saved(outcome.id().clone()),
            Err(e) => SaveStatus::Failed(e.to_string()),
        };
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_settled(&self) -> Option<SaveTicket> {
        self.last_settled
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
