// The request pipeline. Every stage is an explicit
// `RequestContext -> Result<RequestContext, _>` step and the runner owns
// the advance-on-error policy, so a failing stage can never stall the
// chain.

pub mod stages;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::drive::{DriveError, Entry, FileKind};
use crate::core::reply::ReplyError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Drive(#[from] DriveError),
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Folder data accumulated by the pipeline for one request.
#[derive(Debug, Clone)]
pub struct FolderState {
    pub folder_id: String,
    pub files: Vec<Entry>,
    pub description_id: Option<String>,
    pub description: Option<String>,
}

/// The file a request has selected for delivery, if any.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub id: String,
    pub kind: FileKind,
    pub extension: Option<String>,
    /// Set once the file has been downloaded.
    pub local_path: Option<PathBuf>,
}

/// Per-request state bag. Owned by one in-flight request; stages never
/// mutate it in place - each `with_*` builder returns an updated value and
/// preserves everything it doesn't touch.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub folder: Option<FolderState>,
    pub current_file: Option<SelectedFile>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(mut self, folder: FolderState) -> Self {
        self.folder = Some(folder);
        self
    }

    pub fn with_current_file(mut self, file: SelectedFile) -> Self {
        self.current_file = Some(file);
        self
    }

    /// Merge a description into the folder state, leaving the listing and
    /// description id untouched. A context without folder data ignores
    /// the merge.
    pub fn with_description(mut self, text: String) -> Self {
        if let Some(folder) = self.folder.as_mut() {
            folder.description = Some(text);
        }
        self
    }

    /// Record where the selected file landed on disk.
    pub fn with_local_path(mut self, path: PathBuf) -> Self {
        if let Some(file) = self.current_file.as_mut() {
            file.local_path = Some(path);
        }
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.folder
            .as_ref()
            .and_then(|f| f.description.as_deref())
    }
}

/// One unit of the request chain. A stage performs a single external
/// operation and returns the updated context, or an error value for the
/// runner to log.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(&self, ctx: RequestContext) -> Result<RequestContext, PipelineError>;
}

/// Runs stages strictly in the configured order, each at most once.
///
/// Stage failures are non-fatal: the error is logged and the chain
/// continues with the previous context, so absence of output is the only
/// signal the end user ever sees.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub async fn run(&self, mut ctx: RequestContext) -> RequestContext {
        for stage in &self.stages {
            match stage.apply(ctx.clone()).await {
                Ok(next) => ctx = next,
                Err(err) => {
                    tracing::warn!(stage = stage.name(), error = %err, "Stage failed, continuing");
                }
            }
        }
        ctx
    }
}
