use futures::StreamExt;
use tracing::debug;

use crate::client::core::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
use crate::Result;

/// Multi-turn chat on top of [`GeminiClient`].
///
/// Each send transmits the full history followed by the new user turn. History
/// is only extended once the model has answered, so a failed send leaves the
/// session unchanged and can be retried.
#[derive(Debug)]
pub struct ChatSession<'a> {
    client: &'a GeminiClient,
    history: Vec<Content>,
    generation_config: Option<GenerationConfig>,
    system_instruction: Option<String>,
}

impl<'a> ChatSession<'a> {
    pub(crate) fn new(client: &'a GeminiClient) -> Self {
        Self {
            client,
            history: Vec::new(),
            generation_config: None,
            system_instruction: None,
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(text.into());
        self
    }

    /// Seed the session with prior turns.
    pub fn with_history(mut self, history: Vec<Content>) -> Self {
        self.history = history;
        self
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    fn request_for(&self, user: &Content) -> GenerateContentRequest {
        let mut contents = self.history.clone();
        contents.push(user.clone());
        let mut req = GenerateContentRequest::new(contents);
        if let Some(text) = &self.system_instruction {
            req = req.with_system_instruction(text.clone());
        }
        if let Some(cfg) = &self.generation_config {
            req = req.with_generation_config(cfg.clone());
        }
        req
    }

    pub async fn send_message(&mut self, parts: Vec<Part>) -> Result<GenerateContentResponse> {
        let user = Content::user(parts);
        let resp = self.client.generate_content(&self.request_for(&user)).await?;
        let reply = resp
            .candidates
            .first()
            .and_then(|c| c.content.clone())
            .unwrap_or_else(|| Content::model(Vec::new()));
        self.history.push(user);
        self.history.push(Content::model(reply.parts));
        Ok(resp)
    }

    /// Stream the reply, handing every chunk to `on_chunk` as it arrives.
    ///
    /// Returns the aggregated model turn, which is also appended to history.
    pub async fn send_message_stream<F>(&mut self, parts: Vec<Part>, mut on_chunk: F) -> Result<Content>
    where
        F: FnMut(&GenerateContentResponse),
    {
        let user = Content::user(parts);
        let mut stream = self
            .client
            .generate_content_stream(&self.request_for(&user))
            .await?;

        let mut collected: Vec<Part> = Vec::new();
        let mut chunks = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            chunks += 1;
            on_chunk(&chunk);
            if let Some(content) = chunk.candidates.first().and_then(|c| c.content.as_ref()) {
                for part in &content.parts {
                    merge_part(&mut collected, part.clone());
                }
            }
        }
        debug!(chunks, parts = collected.len(), "stream finished");

        let reply = Content::model(collected);
        self.history.push(user);
        self.history.push(reply.clone());
        Ok(reply)
    }
}

/// Adjacent plain text parts collapse into one; everything else is kept as is.
fn merge_part(parts: &mut Vec<Part>, part: Part) {
    let is_plain_text = |p: &Part| {
        p.text.is_some()
            && !p.thought
            && p.inline_data.is_none()
            && p.file_data.is_none()
            && p.function_call.is_none()
            && p.function_response.is_none()
    };
    if is_plain_text(&part) {
        if let Some(last) = parts.last_mut().filter(|l| is_plain_text(&**l)) {
            if let (Some(acc), Some(more)) = (last.text.as_mut(), part.text.as_deref()) {
                acc.push_str(more);
                return;
            }
        }
    }
    parts.push(part);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FunctionCall, FunctionResponse};

    #[test]
    fn test_merge_adjacent_text() {
        let mut parts = Vec::new();
        merge_part(&mut parts, Part::text("Hel"));
        merge_part(&mut parts, Part::text("lo"));
        merge_part(&mut parts, Part::function_call(FunctionCall::new("f", Default::default())));
        merge_part(&mut parts, Part::text("!"));
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].text.as_deref(), Some("Hello"));
        assert_eq!(parts[2].text.as_deref(), Some("!"));
    }

    #[test]
    fn test_function_response_breaks_text_run() {
        let mut parts = Vec::new();
        merge_part(&mut parts, Part::text("before"));
        merge_part(
            &mut parts,
            Part::function_response(FunctionResponse {
                id: Some("call-1".into()),
                name: "f".into(),
                response: serde_json::json!({ "result": 1 }),
            }),
        );
        merge_part(&mut parts, Part::text("after"));
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].function_response.as_ref().unwrap().name, "f");
    }

    #[test]
    fn test_request_includes_history_and_instruction() {
        let client = GeminiClient::builder().api_key("k").build().unwrap();
        let chat = client
            .start_chat()
            .with_system_instruction("be brief")
            .with_history(vec![Content::user_text("hi"), Content::model(vec![Part::text("hello")])]);
        let req = chat.request_for(&Content::user_text("again"));
        assert_eq!(req.contents.len(), 3);
        assert_eq!(req.contents[2].text(), "again");
        assert_eq!(req.system_instruction.unwrap().text(), "be brief");
    }
}
