use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::drive::{DownloadStore, DriveError};

/// Download directory on the local disk. Files are named by their Drive
/// id (plus extension when known) so repeated fetches overwrite instead
/// of piling up.
pub struct LocalDownloadStore {
    root: PathBuf,
}

impl LocalDownloadStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create the download directory if it doesn't exist yet.
    pub async fn ensure_root(&self) -> Result<(), DriveError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| DriveError::Store(e.to_string()))
    }
}

#[async_trait]
impl DownloadStore for LocalDownloadStore {
    fn path_for(&self, file_id: &str, extension: Option<&str>) -> PathBuf {
        let name = match extension {
            Some(ext) => format!("{file_id}.{ext}"),
            None => file_id.to_string(),
        };
        self.root.join(name)
    }

    async fn read_text(&self, path: &Path) -> Result<String, DriveError> {
        fs::read_to_string(path)
            .await
            .map_err(|e| DriveError::Store(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_layout_includes_extension_when_known() {
        let store = LocalDownloadStore::new("/downloads");

        assert_eq!(
            store.path_for("abc123", Some("mp4")),
            PathBuf::from("/downloads/abc123.mp4")
        );
        assert_eq!(
            store.path_for("abc123", None),
            PathBuf::from("/downloads/abc123")
        );
    }

    #[tokio::test]
    async fn reads_back_written_text() {
        let dir = TempDir::new().unwrap();
        let store = LocalDownloadStore::new(dir.path());
        let path = store.path_for("readme-1", Some("md"));

        fs::write(&path, "folder notes").await.unwrap();

        let text = store.read_text(&path).await.unwrap();
        assert_eq!(text, "folder notes");
    }

    #[tokio::test]
    async fn missing_file_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let store = LocalDownloadStore::new(dir.path());
        let path = store.path_for("nope", None);

        let err = store.read_text(&path).await.unwrap_err();
        assert!(matches!(err, DriveError::Store(_)));
    }

    #[tokio::test]
    async fn ensure_root_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("downloads");
        let store = LocalDownloadStore::new(&nested);

        store.ensure_root().await.unwrap();
        assert!(nested.is_dir());
    }
}
