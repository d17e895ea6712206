use async_trait::async_trait;
use reqwest::Client;

use crate::errors::{SkyscoutError, SkyscoutResult};
use crate::types::*;

/// Reply from one model exchange: freeform text, or a request to invoke a
/// declared function.
#[derive(Debug, Clone)]
pub enum ModelReply {
    Text(String),
    FunctionCall(FunctionCall),
}

/// The language-model seam.
///
/// One call per turn: the full transcript goes in, and either a direct
/// reply or a function-call request comes back.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        transcript: &[ChatMessage],
        tool: Option<&FunctionDeclaration>,
    ) -> SkyscoutResult<ModelReply>;
}

/// Client for interacting with the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model_name: String,
}

impl GeminiClient {
    /// Create a new Gemini API client
    pub fn new(api_key: String, model_name: String) -> SkyscoutResult<Self> {
        if api_key.is_empty() {
            return Err(SkyscoutError::ConfigError(
                "API key is required to initialize the Gemini client".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
        })
    }

    /// Get the base API URL
    fn get_base_url(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model_name, self.api_key
        )
    }

    /// Generate content using the Gemini API
    pub async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> SkyscoutResult<GenerateContentResponse> {
        let url = self.get_base_url();

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SkyscoutError::RequestError(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.map_err(|e| {
                SkyscoutError::ResponseError(format!("Failed to read error response: {}", e))
            })?;

            return Err(SkyscoutError::HttpError {
                status_code: status.as_u16(),
                message: format!("API request failed: {}", error_body),
            });
        }

        let response_body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| SkyscoutError::ParsingError(format!("Failed to parse response: {}", e)))?;

        Ok(response_body)
    }

    /// Maps the session transcript onto a Gemini request. The system
    /// message becomes the system instruction; function-result entries are
    /// sent as user-role content since the transcript stores them as plain
    /// text.
    fn build_request(
        &self,
        transcript: &[ChatMessage],
        tool: Option<&FunctionDeclaration>,
    ) -> GenerateContentRequest {
        let mut system_instruction = None;
        let mut contents = Vec::new();

        for message in transcript {
            match message.role {
                Role::System => {
                    system_instruction = Some(Content {
                        parts: vec![Part::text(message.content.clone())],
                        role: Some("system".to_string()),
                    });
                }
                Role::User | Role::Function => {
                    contents.push(Content {
                        parts: vec![Part::text(message.content.clone())],
                        role: Some("user".to_string()),
                    });
                }
                Role::Assistant => {
                    contents.push(Content {
                        parts: vec![Part::text(message.content.clone())],
                        role: Some("model".to_string()),
                    });
                }
            }
        }

        GenerateContentRequest {
            contents,
            system_instruction,
            tools: tool.map(|declaration| {
                vec![Tool {
                    function_declarations: vec![declaration.clone()],
                }]
            }),
            generation_config: Some(GenerationConfig {
                temperature: Some(0.7),
                ..GenerationConfig::default()
            }),
        }
    }

    /// Helper method to extract text from a response
    pub fn extract_text_from_response(
        &self,
        response: &GenerateContentResponse,
    ) -> SkyscoutResult<String> {
        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| SkyscoutError::ResponseError("No candidates in response".to_string()))?;

        let content = candidate
            .content
            .as_ref()
            .ok_or_else(|| SkyscoutError::ResponseError("No content in candidate".to_string()))?;

        let part = content
            .parts
            .first()
            .ok_or_else(|| SkyscoutError::ResponseError("No parts in content".to_string()))?;

        let text = part
            .text
            .as_ref()
            .ok_or_else(|| SkyscoutError::ResponseError("No text in part".to_string()))?;

        Ok(text.clone())
    }

    /// Helper method to extract the first function call from a response
    pub fn extract_function_call_from_response(
        &self,
        response: &GenerateContentResponse,
    ) -> Option<FunctionCall> {
        response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| {
                content
                    .parts
                    .iter()
                    .find_map(|part| part.function_call.clone())
            })
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(
        &self,
        transcript: &[ChatMessage],
        tool: Option<&FunctionDeclaration>,
    ) -> SkyscoutResult<ModelReply> {
        let request = self.build_request(transcript, tool);
        let response = self.generate_content(request).await?;

        if let Some(call) = self.extract_function_call_from_response(&response) {
            return Ok(ModelReply::FunctionCall(call));
        }

        let text = self.extract_text_from_response(&response)?;
        Ok(ModelReply::Text(text))
    }
}
