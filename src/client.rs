//! Gemini `generateContent` client.
//!
//! Keep the public surface small and predictable: [`GeminiClient`] for one-shot
//! and streaming calls, [`ChatSession`] for multi-turn chat, and the
//! [`ModelApi`] trait as the seam the tool bridge talks to.

pub mod builder;
pub mod chat;
pub mod core;
pub mod files;
pub mod stream;

pub use builder::GeminiClientBuilder;
pub use chat::ChatSession;
pub use self::core::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use files::UploadedFile;

use async_trait::async_trait;

use crate::types::{GenerateContentRequest, GenerateContentResponse};
use crate::{BoxStream, Result};

/// A model endpoint that answers `generateContent` requests.
///
/// [`GeminiClient`] is the HTTP implementation; tests and alternative backends
/// can supply their own.
#[async_trait]
pub trait ModelApi: Send + Sync {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse>;

    /// Streaming variant. The default yields the whole `generate` response as one chunk.
    async fn generate_stream(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<BoxStream<'static, GenerateContentResponse>> {
        let resp = self.generate(request).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(resp) })))
    }
}
