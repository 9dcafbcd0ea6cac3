// Discord commands for browsing the shared Drive folder.
//
// This layer is THIN - it binds configuration into pipeline stages, runs
// the pipeline, and formats the resulting context for the channel.

use std::sync::Arc;

use poise::serenity_prelude as serenity;

use crate::core::drive::{DownloadStore, DriveClient, Entry, FieldSelector, FileKind};
use crate::core::pipeline::stages::{DescribeFolderStage, ListFolderStage, SendFileStage};
use crate::core::pipeline::{Pipeline, RequestContext, SelectedFile};
use crate::discord::reply_sink::ChannelReplySink;
use crate::infra::drive::{DriveApiClient, LocalDownloadStore};

/// Type alias for our bot's context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands.
pub struct Data {
    pub drive: Arc<DriveApiClient>,
    pub downloads: Arc<LocalDownloadStore>,
    pub root_folder_id: String,
}

/// Root `/drive` command. Subcommands do the actual work.
#[poise::command(slash_command, subcommands("browse", "fetch"))]
pub async fn drive(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(
        "Drive folder commands:\n\
        `/drive browse [folder]` - List the shared folder and its description\n\
        `/drive fetch <name> [folder]` - Upload a file from the folder here",
    )
    .await?;
    Ok(())
}

/// List the shared folder's files and description.
#[poise::command(slash_command)]
pub async fn browse(
    ctx: Context<'_>,
    #[description = "Folder id (defaults to the configured folder)"] folder: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let folder_id = folder.unwrap_or_else(|| ctx.data().root_folder_id.clone());
    let client: Arc<dyn DriveClient> = ctx.data().drive.clone();
    let store: Arc<dyn DownloadStore> = ctx.data().downloads.clone();

    let pipeline = Pipeline::new()
        .stage(ListFolderStage::new(
            client.clone(),
            folder_id.clone(),
            FieldSelector::full(),
        ))
        .stage(DescribeFolderStage::new(client, store));

    let result = pipeline.run(RequestContext::new()).await;

    let description = result
        .description()
        .unwrap_or("_(no description)_")
        .to_string();

    let Some(folder) = result.folder else {
        ctx.say("Couldn't list that folder right now. Try again later.")
            .await?;
        return Ok(());
    };

    let mut embed = serenity::CreateEmbed::new()
        .title("Shared Drive folder")
        .description(description)
        .color(serenity::Colour::from_rgb(66, 133, 244))
        .footer(serenity::CreateEmbedFooter::new(folder.folder_id));

    if folder.files.is_empty() {
        embed = embed.field("Files", "This folder is empty.", false);
    }
    // Discord caps embeds at 25 fields.
    for entry in folder.files.iter().take(25) {
        embed = embed.field(&entry.name, entry_summary(entry), true);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Download a file from the folder and upload it to this channel.
#[poise::command(slash_command)]
pub async fn fetch(
    ctx: Context<'_>,
    #[description = "File name as shown by /drive browse"] name: String,
    #[description = "Folder id (defaults to the configured folder)"] folder: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let folder_id = folder.unwrap_or_else(|| ctx.data().root_folder_id.clone());
    let client: Arc<dyn DriveClient> = ctx.data().drive.clone();
    let store: Arc<dyn DownloadStore> = ctx.data().downloads.clone();

    // Fetching only needs enough metadata to pick the file and name the
    // download.
    let listing = Pipeline::new()
        .stage(ListFolderStage::new(
            client.clone(),
            folder_id,
            FieldSelector::custom("files(id,name,trashed,mimeType,fileExtension)"),
        ))
        .run(RequestContext::new())
        .await;

    let Some(entry) = listing
        .folder
        .as_ref()
        .and_then(|f| f.files.iter().find(|e| e.name == name))
        .cloned()
    else {
        ctx.say(format!("No file named `{name}` in that folder."))
            .await?;
        return Ok(());
    };

    let kind = entry.kind();
    if kind == FileKind::Other {
        ctx.say(format!("`{name}` can't be shared here.")).await?;
        return Ok(());
    }

    let sink = Arc::new(ChannelReplySink::new(
        ctx.serenity_context().http.clone(),
        ctx.channel_id(),
    ));

    let result = Pipeline::new()
        .stage(SendFileStage::new(client, store, sink))
        .run(listing.with_current_file(SelectedFile {
            id: entry.id.clone(),
            kind,
            extension: entry.file_extension.clone(),
            local_path: None,
        }))
        .await;

    let delivered = result
        .current_file
        .is_some_and(|f| f.local_path.is_some());
    if delivered {
        ctx.say(format!("Uploaded `{name}`.")).await?;
    } else {
        ctx.say(format!("Couldn't fetch `{name}` from Drive."))
            .await?;
    }

    Ok(())
}

fn entry_summary(entry: &Entry) -> String {
    let kind = if entry.is_folder() {
        "folder"
    } else {
        match entry.kind() {
            FileKind::Document => "document",
            FileKind::Video => "video",
            FileKind::Other => "other",
        }
    };

    let mut summary = match entry.size {
        Some(size) => format!("{kind} - {}", human_size(size)),
        None => kind.to_string(),
    };
    if let Some(modified) = entry.modified_time {
        summary.push_str(&format!(" - <t:{}:d>", modified.timestamp()));
    }
    summary
}

fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    const GIB: u64 = 1024 * MIB;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
