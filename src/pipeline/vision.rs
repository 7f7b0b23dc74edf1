//! Vision extraction adapter: one OpenAI-compatible chat completion per
//! document.
//!
//! The model call is the only non-deterministic stage in the pipeline, so it
//! sits behind the narrow [`VisionModel`] trait: image bytes in, raw text
//! out. Everything downstream (parser, scorer) is deterministic and can be
//! exercised against scripted implementations without network access.
//! Production uses [`OpenAiVision`], which also works against any gateway
//! exposing the same chat-completions shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::encode::to_data_uri;
use crate::prompts::SYSTEM_PROMPT;

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
/// Default vision-capable model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Output cap for the extraction reply.
const MAX_TOKENS: u32 = 1000;
/// Low temperature keeps extraction literal rather than creative.
const TEMPERATURE: f32 = 0.2;

/// Errors from the vision provider.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The provider answered with a non-success HTTP status.
    #[error("vision API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The request or its response never made it across the wire intact.
    #[error("vision API request failed: {0}")]
    Transport(String),

    /// A 2xx answer carrying no completion text.
    #[error("vision API returned an empty completion")]
    EmptyResponse,
}

impl VisionError {
    /// Upstream HTTP status, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            VisionError::Api { status, .. } => Some(*status),
            VisionError::Transport(_) | VisionError::EmptyResponse => None,
        }
    }
}

/// Narrow seam to the vision-capable model.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Submit one extraction request for one image.
    ///
    /// Single attempt, no retry loop: an upstream failure is fatal to the
    /// run and surfaces as a `failed` document status.
    async fn extract(
        &self,
        image: &[u8],
        media_type: &str,
        instruction: &str,
    ) -> Result<String, VisionError>;
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiVision {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiVision {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point at a compatible gateway instead of `api.openai.com`.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_request(&self, image: &[u8], media_type: &str, instruction: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: instruction.to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: to_data_uri(image, media_type),
                            },
                        },
                    ]),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    async fn extract(
        &self,
        image: &[u8],
        media_type: &str,
        instruction: &str,
    ) -> Result<String, VisionError> {
        let request = self.build_request(image, media_type, instruction);

        debug!(model = %self.model, image_bytes = image.len(), "Submitting vision extraction request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| VisionError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|err| VisionError::Transport(err.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(VisionError::EmptyResponse)
    }
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

/// A system message carries plain text; the user message carries typed
/// parts so the image can ride along as a data URI.
#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
