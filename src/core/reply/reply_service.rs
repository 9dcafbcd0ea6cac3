// Outbound reply dispatch. The sink trait is the port the chat adapter
// implements; the dispatch rule itself lives here so it can be tested
// without any Discord types.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::core::drive::FileKind;

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("failed to deliver reply: {0}")]
    Send(String),
}

/// Tagged payload handed to the dispatcher. One shape for every call
/// site: the kind decides which capability fires, the path points at the
/// downloaded file.
#[derive(Debug, Clone)]
pub struct ReplyPayload {
    pub kind: FileKind,
    pub path: PathBuf,
}

/// The two outbound reply capabilities of the chat channel.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_document(&self, path: &Path) -> Result<(), ReplyError>;
    async fn send_video(&self, path: &Path) -> Result<(), ReplyError>;
}

/// Invoke the matching capability for the payload, at most once.
///
/// Kinds without a capability are a silent no-op; returns whether a reply
/// actually went out.
pub async fn dispatch_reply(
    sink: &dyn ReplySink,
    payload: &ReplyPayload,
) -> Result<bool, ReplyError> {
    match payload.kind {
        FileKind::Document => {
            sink.send_document(&payload.path).await?;
            Ok(true)
        }
        FileKind::Video => {
            sink.send_video(&payload.path).await?;
            Ok(true)
        }
        FileKind::Other => Ok(false),
    }
}
