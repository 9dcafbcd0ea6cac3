use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use crate::core::reply::{ReplyError, ReplySink};

/// Reply sink bound to one Discord channel. Both capabilities upload the
/// local file as an attachment; Discord renders video attachments with an
/// inline player, so no separate embed is needed.
pub struct ChannelReplySink {
    http: Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
}

impl ChannelReplySink {
    pub fn new(http: Arc<serenity::Http>, channel_id: serenity::ChannelId) -> Self {
        Self { http, channel_id }
    }

    async fn upload(&self, path: &Path) -> Result<(), ReplyError> {
        let attachment = serenity::CreateAttachment::path(path)
            .await
            .map_err(|e| ReplyError::Send(e.to_string()))?;

        self.channel_id
            .send_message(&self.http, serenity::CreateMessage::new().add_file(attachment))
            .await
            .map_err(|e| ReplyError::Send(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ReplySink for ChannelReplySink {
    async fn send_document(&self, path: &Path) -> Result<(), ReplyError> {
        tracing::debug!(path = %path.display(), "Sending document reply");
        self.upload(path).await
    }

    async fn send_video(&self, path: &Path) -> Result<(), ReplyError> {
        tracing::debug!(path = %path.display(), "Sending video reply");
        self.upload(path).await
    }
}
