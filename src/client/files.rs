//! Gemini Files API upload (resumable protocol, single chunk).

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

use crate::client::core::{check_status, GeminiClient, API_VERSION};
use crate::transport::http::read_text;
use crate::types::content::guess_media_type;
use crate::types::Part;
use crate::{Error, ErrorContext, Result};

/// Metadata of a file stored by the Files API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Resource name, e.g. `files/abc-123`.
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub mime_type: String,
    /// Returned as a decimal string by the API.
    #[serde(default)]
    pub size_bytes: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl UploadedFile {
    /// A `fileData` part referencing this upload.
    pub fn as_part(&self) -> Part {
        Part::file_data(self.uri.clone(), self.mime_type.clone())
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

impl GeminiClient {
    /// Upload a local file. `mime_type` falls back to a guess from the extension.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        mime_type: Option<&str>,
    ) -> Result<UploadedFile> {
        let path = path.as_ref();
        let mime_type = match mime_type {
            Some(m) => m.to_string(),
            None => guess_media_type(path).ok_or_else(|| {
                Error::validation_with_context(
                    "cannot infer media type; pass it explicitly",
                    ErrorContext::new()
                        .with_field_path(path.display().to_string())
                        .with_source("upload_file"),
                )
            })?,
        };
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        info!(file = %display_name, %mime_type, size = bytes.len(), "uploading file");

        let start = self
            .transport
            .request(reqwest::Method::POST, &format!("/upload/{}/files", API_VERSION))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type.as_str())
            .json(&json!({ "file": { "display_name": display_name } }));
        let resp = check_status(self.transport.send(start).await?).await?;
        let upload_url = resp
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| Error::ModelRequest {
                status: Some(resp.status().as_u16()),
                message: "upload session response is missing x-goog-upload-url".into(),
            })?;
        debug!(%upload_url, "upload session started");

        let finalize = self
            .transport
            .request(reqwest::Method::POST, &upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header(reqwest::header::CONTENT_LENGTH, bytes.len().to_string())
            .body(bytes);
        let resp = check_status(self.transport.send(finalize).await?).await?;
        let text = read_text(resp).await?;
        let parsed: UploadResponse = serde_json::from_str(&text)?;
        info!(name = %parsed.file.name, uri = %parsed.file.uri, "file uploaded");
        Ok(parsed.file)
    }
}
