// Drive domain logic. No HTTP, no filesystem, no Discord types in here -
// the infra layer implements the port traits at the bottom of this file.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// MIME type Google Drive assigns to folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Name of the entry that supplies a folder's description text.
pub const DESCRIPTION_FILE_NAME: &str = "README.md";

/// Shown when the description file is empty or could not be read.
pub const NO_DESCRIPTION_FALLBACK: &str = "No description set";

/// Errors raised by the Drive workflow.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Drive auth error: {0}")]
    Auth(String),
    #[error("Drive API error: {0}")]
    Api(String),
    #[error("Failed to store downloaded file: {0}")]
    Store(String),
}

/// How a file should be delivered to the chat channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Document,
    Video,
    /// Folders and media types we never re-upload (images, audio, ...).
    Other,
}

impl FileKind {
    /// Classify a Drive MIME type. `video/*` gets the dedicated video
    /// capability; folders and non-shareable media get no reply at all;
    /// everything else goes out as a generic document.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            FileKind::Video
        } else if mime == FOLDER_MIME_TYPE
            || mime.starts_with("image/")
            || mime.starts_with("audio/")
        {
            FileKind::Other
        } else {
            FileKind::Document
        }
    }
}

/// One file or folder record from a Drive listing. Immutable once received.
///
/// The optional metadata is only present when the field selector asked
/// for it.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub trashed: bool,
    pub mime_type: String,
    pub file_extension: Option<String>,
    pub modified_time: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

impl Entry {
    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// Field projection for a listing call, pre-rendered into the `fields`
/// query parameter the Drive v3 API expects.
#[derive(Debug, Clone)]
pub struct FieldSelector {
    fields: String,
}

impl FieldSelector {
    /// Just enough metadata to resolve a listing.
    #[allow(dead_code)]
    pub fn minimal() -> Self {
        Self {
            fields: "files(id,name,trashed,mimeType)".to_string(),
        }
    }

    /// Everything the bot can render, including size and timestamps.
    pub fn full() -> Self {
        Self {
            fields: "files(id,name,trashed,mimeType,fileExtension,modifiedTime,size)".to_string(),
        }
    }

    pub fn custom(fields: impl Into<String>) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    pub fn as_query(&self) -> &str {
        &self.fields
    }
}

/// A resolved folder listing: visible files plus the optional description
/// entry.
#[derive(Debug, Clone)]
pub struct FolderView {
    pub files: Vec<Entry>,
    pub description_id: Option<String>,
}

/// Turn a raw listing into a `FolderView`.
///
/// Trashed entries are dropped so downstream stages never observe them.
/// The description id is the first surviving entry named `README.md` in
/// listing order; a folder without one is normal, not an error.
pub fn resolve_listing(entries: Vec<Entry>) -> FolderView {
    let files: Vec<Entry> = entries.into_iter().filter(|e| !e.trashed).collect();
    let description_id = files
        .iter()
        .find(|e| e.name == DESCRIPTION_FILE_NAME)
        .map(|e| e.id.clone());

    FolderView {
        files,
        description_id,
    }
}

/// Normalize raw description text for display. Whitespace-only content
/// counts as empty and maps to the fixed fallback string.
pub fn normalize_description(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        NO_DESCRIPTION_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Port for the remote Drive API. One listing call issues exactly one
/// query scoped to the given parent folder.
#[async_trait]
pub trait DriveClient: Send + Sync {
    async fn list_children(
        &self,
        folder_id: &str,
        fields: &FieldSelector,
    ) -> Result<Vec<Entry>, DriveError>;

    /// Stream a file's content to `dest`. The caller owns path layout.
    async fn download_to(&self, file_id: &str, dest: &Path) -> Result<(), DriveError>;
}

/// Port for the local download directory.
#[async_trait]
pub trait DownloadStore: Send + Sync {
    /// Where a file with this id (and optional extension) lands on disk.
    fn path_for(&self, file_id: &str, extension: Option<&str>) -> PathBuf;

    async fn read_text(&self, path: &Path) -> Result<String, DriveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, trashed: bool) -> Entry {
        Entry {
            id: id.to_string(),
            name: name.to_string(),
            trashed,
            mime_type: "text/plain".to_string(),
            file_extension: None,
            modified_time: None,
            size: None,
        }
    }

    #[test]
    fn resolve_drops_trashed_entries() {
        let view = resolve_listing(vec![
            entry("1", "a.txt", false),
            entry("2", "b.txt", true),
            entry("3", "c.txt", false),
        ]);

        assert_eq!(view.files.len(), 2);
        assert!(view.files.iter().all(|e| !e.trashed));
    }

    #[test]
    fn resolve_empty_listing() {
        let view = resolve_listing(vec![]);
        assert!(view.files.is_empty());
        assert_eq!(view.description_id, None);
    }

    #[test]
    fn resolve_picks_readme_as_description() {
        let view = resolve_listing(vec![
            entry("1", "README.md", false),
            entry("2", "a", true),
        ]);

        assert_eq!(view.files.len(), 1);
        assert_eq!(view.files[0].id, "1");
        assert_eq!(view.description_id, Some("1".to_string()));
    }

    #[test]
    fn resolve_ignores_trashed_readme() {
        let view = resolve_listing(vec![
            entry("1", "README.md", true),
            entry("2", "notes.txt", false),
        ]);

        assert_eq!(view.description_id, None);
    }

    #[test]
    fn resolve_without_readme_is_not_an_error() {
        let view = resolve_listing(vec![entry("1", "a.txt", false)]);
        assert_eq!(view.description_id, None);
    }

    #[test]
    fn resolve_takes_first_readme_in_listing_order() {
        let view = resolve_listing(vec![
            entry("1", "README.md", false),
            entry("2", "README.md", false),
        ]);

        assert_eq!(view.description_id, Some("1".to_string()));
    }

    #[test]
    fn file_kind_classification() {
        assert_eq!(FileKind::from_mime("video/mp4"), FileKind::Video);
        assert_eq!(FileKind::from_mime("application/pdf"), FileKind::Document);
        assert_eq!(FileKind::from_mime("text/markdown"), FileKind::Document);
        assert_eq!(FileKind::from_mime("image/png"), FileKind::Other);
        assert_eq!(FileKind::from_mime("audio/mpeg"), FileKind::Other);
        assert_eq!(FileKind::from_mime(FOLDER_MIME_TYPE), FileKind::Other);
    }

    #[test]
    fn normalize_empty_description_uses_fallback() {
        assert_eq!(normalize_description(""), NO_DESCRIPTION_FALLBACK);
        assert_eq!(normalize_description("  \n\t "), NO_DESCRIPTION_FALLBACK);
    }

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        assert_eq!(normalize_description("\nWeekly picks\n"), "Weekly picks");
    }
}
