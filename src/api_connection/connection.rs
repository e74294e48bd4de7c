use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, warn};

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, FileData, ImageUrl,
    JsonSchemaDefinition, Provider, ResponseFormat,
};
use crate::config::{AppConfig, API_KEY_ENV_VAR};

#[derive(Debug, thiserror::Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("Empty response from AI")]
    EmptyResponse,
    #[error("Reply does not match the expected shape: {0}")]
    UnexpectedShape(&'static str),
    #[error("Failed to read report file: {0}")]
    FileRead(#[from] std::io::Error),
}

/// A document handed to the model alongside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    fn content_part(&self) -> ContentPart {
        if self.mime_type.starts_with("image/") {
            ContentPart::ImageUrl {
                image_url: ImageUrl { url: self.data_url() },
            }
        } else {
            ContentPart::File {
                file: FileData {
                    filename: self.file_name.clone(),
                    file_data: self.data_url(),
                },
            }
        }
    }
}

/// One structured-output call: prompts, an optional document and the JSON
/// schema the reply must follow.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub attachment: Option<Attachment>,
    pub schema: JsonSchemaDefinition,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// The generative-AI collaborator: takes a schema plus payload, returns JSON or fails.
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn request_json(&self, request: StructuredRequest) -> Result<Value, ApiConnectionError>;
}

/// Removes a surrounding Markdown code fence (```json ... ``` or ``` ... ```).
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

impl Provider {
    pub fn openrouter(api_key: &str, config: &AppConfig) -> Self {
        Self::OpenRouter {
            api_key: api_key.to_string(),
            endpoint: config.api_url.clone(),
            model: config.model.clone(),
            site_url: config.site_url.clone(),
            app_name: config.app_name.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// `None` when no credential is configured.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .map(|key| Self::openrouter(key, config))
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenRouter { model, .. } => model,
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::OpenRouter {
                api_key,
                endpoint,
                site_url,
                app_name,
                client,
                ..
            } => {
                if api_key.trim().is_empty() {
                    return Err(ApiConnectionError::MissingApiKey(API_KEY_ENV_VAR.to_string()));
                }

                let response = client
                    .post(endpoint.as_str())
                    .bearer_auth(api_key)
                    .header("HTTP-Referer", site_url.as_str())
                    .header("X-Title", app_name.as_str())
                    .json(&request)
                    .send()
                    .await?;

                if response.status().is_success() {
                    Ok(response.json::<ChatCompletionResponse>().await?)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

#[async_trait]
impl AiProvider for Provider {
    async fn request_json(&self, request: StructuredRequest) -> Result<Value, ApiConnectionError> {
        let user_message = match &request.attachment {
            Some(attachment) => ChatMessage::user_parts(vec![
                attachment.content_part(),
                ContentPart::Text {
                    text: request.user_prompt.clone(),
                },
            ]),
            None => ChatMessage::user(request.user_prompt.clone()),
        };

        let chat_request = ChatCompletionRequest {
            model: self.model().to_string(),
            messages: vec![ChatMessage::system(request.system_prompt.clone()), user_message],
            response_format: Some(ResponseFormat::json_schema(request.schema.clone())),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = self.model(), schema = %request.schema.name, "Sending structured request");
        let response = self.call_chat_completion(chat_request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(strip_code_fences)
            .unwrap_or_default();

        if content.is_empty() {
            warn!(schema = %request.schema.name, "AI response had no content");
            return Err(ApiConnectionError::EmptyResponse);
        }

        serde_json::from_str(content).map_err(|e| {
            debug!(error = %e, "Failed to deserialize AI content:\n{}", content);
            ApiConnectionError::SerializationError(e)
        })
    }
}
