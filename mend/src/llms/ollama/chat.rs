//! [`TextGenerator`] over Ollama's chat endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::GeneratorError;
use crate::generate::{GenerateRequest, TextGenerator};

use super::client::Ollama;

/// The fields of a non-streaming `/api/chat` reply this client reads.
#[derive(Debug, Deserialize)]
struct ChatReply {
    model: String,
    message: ReplyMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

impl Ollama {
    /// Decode a response body into the generated text.
    fn parse_response(body: &str) -> Result<String, GeneratorError> {
        let parsed: ChatReply = serde_json::from_str(body).map_err(|e| {
            GeneratorError::response_format(
                "an Ollama chat reply",
                format!("{e} in body: {body}"),
            )
            .with_provider("ollama")
        })?;

        debug!(
            model = %parsed.model,
            input_tokens = parsed.prompt_eval_count,
            output_tokens = parsed.eval_count,
            "ollama response"
        );

        Ok(parsed.message.content)
    }
}

#[async_trait]
impl TextGenerator for Ollama {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GeneratorError> {
        let response = self
            .http_client
            .post(self.config.chat_url())
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::parse_error(status.as_u16(), &body));
        }

        Self::parse_response(&body)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}
