//! Gemini HTTP client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::backend::traits::{GeneratedScene, GenerationBackend};
use crate::codec::EncodedImage;
use crate::config::GenerationConfig;
use crate::error::{AppError, Result};

/// Instructional preamble wrapped around every user prompt
const PROMPT_PREAMBLE: &str = "Create a realistic product placement image.";
const PROMPT_SUFFIX: &str = "Make sure the products look naturally integrated \
into the environment with proper lighting, shadows, and perspective.";

/// Gemini-backed image generation client
pub struct GeminiBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    contents: ApiContent,
    #[serde(rename = "generationConfig")]
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiInlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct ApiGenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<String>,
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
}

impl GeminiBackend {
    /// Create a new Gemini backend from configuration
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
        })
    }

    fn request_body(&self, images: &[EncodedImage], prompt: &str) -> ApiRequest {
        let mut parts: Vec<ApiPart> = images
            .iter()
            .map(|image| ApiPart {
                inline_data: Some(ApiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
                text: None,
            })
            .collect();

        parts.push(ApiPart {
            inline_data: None,
            text: Some(format!("{} {}. {}", PROMPT_PREAMBLE, prompt, PROMPT_SUFFIX)),
        });

        ApiRequest {
            contents: ApiContent { parts },
            generation_config: ApiGenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: self.top_k,
            },
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        images: &[EncodedImage],
        prompt: &str,
    ) -> Result<Option<GeneratedScene>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );

        debug!(model = %self.model, images = images.len(), "Sending generate request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(images, prompt))
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "Generation request failed");
                AppError::Generation
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(model = %self.model, status = %status, body = %body, "Generation service returned an error");
            return Err(AppError::Generation);
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            error!(model = %self.model, error = %e, "Failed to parse generation response");
            AppError::Generation
        })?;

        // First inline image part wins; parts are scanned in service order.
        let scene = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| {
                content
                    .parts
                    .into_iter()
                    .find_map(|part| part.inline_data)
            })
            .map(|inline| GeneratedScene {
                data: inline.data,
                mime_type: inline.mime_type,
            });

        if scene.is_none() {
            debug!(model = %self.model, "Generation response carried no inline image");
        }

        Ok(scene)
    }
}
