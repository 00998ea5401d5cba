//! Content and playlist catalogs offered when assigning a source to a zone.
//!
//! Both catalogs are read-only lists fetched once when an editing session
//! opens.  A fetch failure is not fatal: the affected list degrades to empty
//! and the editor stays usable, minus content assignment.

use async_trait::async_trait;
use layout_core::ContentType;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Error type for catalog fetches.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Unavailable(String),
    #[error("catalog responded with status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("catalog response could not be parsed: {0}")]
    Malformed(String),
}

/// One uploaded media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: String,
    /// Media kind reported by the backend (`"video"`, `"image"`, `"html"`, ...).
    #[serde(rename = "type", alias = "content_type")]
    pub content_type: String,
}

impl ContentItem {
    /// Title if present and non-blank, otherwise the file name.
    pub fn label(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => &self.filename,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: i64,
    pub name: String,
}

/// Source of the content and playlist catalogs.
///
/// The HTTP client implements this against the backend; tests use recording
/// doubles.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_content(&self) -> Result<Vec<ContentItem>, CatalogError>;
    async fn fetch_playlists(&self) -> Result<Vec<PlaylistItem>, CatalogError>;
}

/// Media kinds that may be assigned to a zone of `zone_type`.
///
/// Zone types not listed here (clock, weather, ...) carry their own content in
/// settings and are offered nothing.
pub fn compatible_types(zone_type: ContentType) -> &'static [&'static str] {
    match zone_type {
        ContentType::Video => &["video"],
        ContentType::Image => &["image"],
        ContentType::Text => &["text", "html"],
        ContentType::Logo => &["image"],
        _ => &[],
    }
}

/// Catalogs as fetched for one editing session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    content: Vec<ContentItem>,
    playlists: Vec<PlaylistItem>,
}

impl CatalogSnapshot {
    pub fn new(content: Vec<ContentItem>, playlists: Vec<PlaylistItem>) -> Self {
        Self { content, playlists }
    }

    pub fn content(&self) -> &[ContentItem] {
        &self.content
    }

    pub fn playlists(&self) -> &[PlaylistItem] {
        &self.playlists
    }

    /// Content items a zone of `zone_type` may show.
    pub fn selectable_content(&self, zone_type: ContentType) -> Vec<&ContentItem> {
        let allowed = compatible_types(zone_type);
        self.content
            .iter()
            .filter(|item| allowed.iter().any(|t| t.eq_ignore_ascii_case(&item.content_type)))
            .collect()
    }

    /// Playlists a zone of `zone_type` may show; only playlist zones get any.
    pub fn selectable_playlists(&self, zone_type: ContentType) -> &[PlaylistItem] {
        if zone_type == ContentType::Playlist {
            &self.playlists
        } else {
            &[]
        }
    }

    pub fn find_content(&self, id: i64) -> Option<&ContentItem> {
        self.content.iter().find(|item| item.id == id)
    }
}

/// Fetches both catalogs concurrently.  A failed list degrades to empty.
pub async fn load_catalog(source: &dyn CatalogSource) -> CatalogSnapshot {
    let (content, playlists) = tokio::join!(source.fetch_content(), source.fetch_playlists());

    let content = content.unwrap_or_else(|e| {
        warn!("content catalog unavailable, continuing without it: {e}");
        Vec::new()
    });
    let playlists = playlists.unwrap_or_else(|e| {
        warn!("playlist catalog unavailable, continuing without it: {e}");
        Vec::new()
    });

    info!(
        "catalog loaded: {} content items, {} playlists",
        content.len(),
        playlists.len()
    );
    CatalogSnapshot::new(content, playlists)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
