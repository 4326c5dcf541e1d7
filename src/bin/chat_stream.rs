//! chat-stream: a two-turn streaming chat, the second turn referencing an uploaded image.
//!
//! Usage:
//!   chat-stream [IMAGE_PATH]
//!
//! IMAGE_PATH falls back to CHAT_IMAGE_PATH, then `media/saxophone.png`. The upload
//! media type is inferred from the file extension.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use genai_toolbridge::types::Part;
use genai_toolbridge::{BridgeConfig, GeminiClientBuilder};

fn separator() -> String {
    "_".repeat(64)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("genai_toolbridge=info,chat_stream=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let image_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CHAT_IMAGE_PATH").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("media").join("saxophone.png"));

    let config = BridgeConfig::from_env().context("loading configuration")?;
    let client = GeminiClientBuilder::from_config(&config)
        .build()
        .context("creating Gemini client")?;
    let mut chat = client.start_chat();

    chat.send_message_stream(
        vec![Part::text(
            "Hello, I'm interested in learning about musical instruments. Can I show you one?",
        )],
        |chunk| println!("{}", chunk.text()),
    )
    .await
    .context("streaming first turn")?;
    println!("{}", separator());

    let image = client
        .upload_file(&image_path, None)
        .await
        .with_context(|| format!("uploading {}", image_path.display()))?;

    chat.send_message_stream(
        vec![
            Part::text("What family of instruments does this instrument belong to?"),
            image.as_part(),
        ],
        |chunk| println!("{}", chunk.text()),
    )
    .await
    .context("streaming second turn")?;
    println!("{}", separator());

    Ok(())
}
