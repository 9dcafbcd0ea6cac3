// The three pipeline stages. Each one binds its static configuration
// (client, store, sink, folder id) at construction and performs exactly
// one external operation per request.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::drive::{
    normalize_description, resolve_listing, DownloadStore, DriveClient, FieldSelector,
    NO_DESCRIPTION_FALLBACK,
};
use crate::core::pipeline::{FolderState, PipelineError, RequestContext, Stage};
use crate::core::reply::{dispatch_reply, ReplyPayload, ReplySink};

/// Lists the configured folder and merges the resolved view into the
/// context. A listing failure surfaces as an error value; the runner logs
/// it and the request proceeds with no folder data.
pub struct ListFolderStage {
    client: Arc<dyn DriveClient>,
    folder_id: String,
    fields: FieldSelector,
}

impl ListFolderStage {
    pub fn new(client: Arc<dyn DriveClient>, folder_id: impl Into<String>, fields: FieldSelector) -> Self {
        Self {
            client,
            folder_id: folder_id.into(),
            fields,
        }
    }
}

#[async_trait]
impl Stage for ListFolderStage {
    fn name(&self) -> &'static str {
        "list_folder"
    }

    async fn apply(&self, ctx: RequestContext) -> Result<RequestContext, PipelineError> {
        let entries = self.client.list_children(&self.folder_id, &self.fields).await?;
        let view = resolve_listing(entries);

        tracing::debug!(
            folder_id = %self.folder_id,
            files = view.files.len(),
            has_description = view.description_id.is_some(),
            "Resolved folder listing"
        );

        // Re-listing the same folder must not clobber a description an
        // earlier stage already resolved.
        let description = ctx
            .folder
            .as_ref()
            .filter(|f| f.folder_id == self.folder_id)
            .and_then(|f| f.description.clone());

        Ok(ctx.with_folder(FolderState {
            folder_id: self.folder_id.clone(),
            files: view.files,
            description_id: view.description_id,
            description,
        }))
    }
}

/// Downloads the selected file and replies with it on the chat channel.
/// Without a selection the stage completes immediately - no filesystem,
/// no network.
pub struct SendFileStage {
    client: Arc<dyn DriveClient>,
    store: Arc<dyn DownloadStore>,
    sink: Arc<dyn ReplySink>,
}

impl SendFileStage {
    pub fn new(
        client: Arc<dyn DriveClient>,
        store: Arc<dyn DownloadStore>,
        sink: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            client,
            store,
            sink,
        }
    }
}

#[async_trait]
impl Stage for SendFileStage {
    fn name(&self) -> &'static str {
        "send_file"
    }

    async fn apply(&self, ctx: RequestContext) -> Result<RequestContext, PipelineError> {
        let Some(file) = ctx.current_file.clone() else {
            return Ok(ctx);
        };

        let dest = self.store.path_for(&file.id, file.extension.as_deref());
        self.client.download_to(&file.id, &dest).await?;

        let payload = ReplyPayload {
            kind: file.kind,
            path: dest.clone(),
        };
        let sent = dispatch_reply(self.sink.as_ref(), &payload).await?;
        if !sent {
            tracing::debug!(file_id = %file.id, "No reply capability for file kind, skipping");
        }

        Ok(ctx.with_local_path(dest))
    }
}

/// Fetches the folder's description entry and merges its text into the
/// context. A folder without a description entry is a normal skip; the
/// fallback string only covers content that downloads but cannot be read.
pub struct DescribeFolderStage {
    client: Arc<dyn DriveClient>,
    store: Arc<dyn DownloadStore>,
}

impl DescribeFolderStage {
    pub fn new(client: Arc<dyn DriveClient>, store: Arc<dyn DownloadStore>) -> Self {
        Self { client, store }
    }
}

#[async_trait]
impl Stage for DescribeFolderStage {
    fn name(&self) -> &'static str {
        "describe_folder"
    }

    async fn apply(&self, ctx: RequestContext) -> Result<RequestContext, PipelineError> {
        let Some(description_id) = ctx.folder.as_ref().and_then(|f| f.description_id.clone())
        else {
            return Ok(ctx);
        };

        let dest = self.store.path_for(&description_id, Some("md"));
        self.client.download_to(&description_id, &dest).await?;

        let text = match self.store.read_text(&dest).await {
            Ok(raw) => normalize_description(&raw),
            Err(err) => {
                tracing::warn!(error = %err, path = %dest.display(), "Failed to read description file");
                NO_DESCRIPTION_FALLBACK.to_string()
            }
        };

        Ok(ctx.with_description(text))
    }
}
