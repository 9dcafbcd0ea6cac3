// This is the entry point of the Drive folder bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (Drive API, local disk)
// - `discord/` = Discord-specific adapters (commands, reply sink)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::sync::Arc;

use poise::serenity_prelude as serenity;

use crate::discord::Data;
use crate::infra::drive::{DriveApiClient, LocalDownloadStore, ServiceAccountAuth};

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    let root_folder_id = std::env::var("DRIVE_ROOT_FOLDER_ID")
        .expect("Missing DRIVE_ROOT_FOLDER_ID environment variable!");

    // Keep transient downloads in a dedicated folder so the repo root stays tidy.
    let download_dir =
        std::env::var("DRIVE_DOWNLOAD_DIR").unwrap_or_else(|_| "data/downloads".to_string());

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let auth = ServiceAccountAuth::from_env()
        .await
        .expect("Failed to load Google service account credentials");
    let drive = Arc::new(DriveApiClient::new(auth).expect("Failed to create Drive API client"));

    let downloads = Arc::new(LocalDownloadStore::new(&download_dir));
    downloads
        .ensure_root()
        .await
        .expect("Failed to create download directory");

    let data = Data {
        drive,
        downloads,
        root_folder_id,
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MESSAGES;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::drive::drive()],
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                println!("🤖 Bot is starting up...");

                // Register slash commands globally (can take up to an hour to propagate).
                // For faster development, use register_in_guild instead.
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                println!("✅ Commands registered!");
                println!("🚀 Bot is ready!");

                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
