//! Google Gemini LLM service adapter
//!
//! Implements the AnalysisGatewayPort for Google's Gemini `generateContent`
//! API. Each call is a single non-streaming request with no retries.

use crate::domain::models::{ChatMessage, MeetingMetadata};
use crate::domain::PromptTemplates;
use crate::error::{AppError, Result};
use crate::ports::llm::{AnalysisGatewayPort, LlmConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini gateway implementation
pub struct GoogleService {
    client: Client,
    api_key: String,
    config: LlmConfig,
    base_url: String,
}

/// A model entry returned by the models listing
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleModel {
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(rename = "inputTokenLimit")]
    pub input_token_limit: Option<u32>,
    #[serde(rename = "supportedGenerationMethods", default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleModelsResponse {
    #[serde(default)]
    models: Vec<GoogleModel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, empty if the model returned none
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GoogleService {
    /// Create a new Google Gemini service with the given API key
    pub fn new(api_key: String, config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            config,
            base_url: GOOGLE_API_BASE.to_string(),
        })
    }

    /// Fetch models that support generateContent
    pub async fn list_models(&self) -> Result<Vec<GoogleModel>> {
        log::info!("Fetching available models from Google");

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .query(&[("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to fetch models: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "Failed to fetch models: {}",
                error_text
            )));
        }

        let models_response: GoogleModelsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse models response: {}", e)))?;

        let gemini_models: Vec<GoogleModel> = models_response
            .models
            .into_iter()
            .filter(|m| {
                m.name.contains("gemini")
                    && m
                        .supported_generation_methods
                        .iter()
                        .any(|method| method == "generateContent")
            })
            .collect();

        log::info!("Found {} Google Gemini models", gemini_models.len());
        Ok(gemini_models)
    }

    fn model_path(&self) -> String {
        if self.config.model.starts_with("models/") {
            self.config.model.clone()
        } else {
            format!("models/{}", self.config.model)
        }
    }

    fn build_request(&self, system: &str, prompt: String, temperature: f32) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }

    /// Send one generateContent request and return the reply text
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        let model_path = self.model_path();
        log::info!("Calling Google generateContent with model: {}", model_path);

        let response = self
            .client
            .post(format!("{}/{}:generateContent", self.base_url, model_path))
            .query(&[("key", &self.api_key)])
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("GenerateContent request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "GenerateContent failed ({}): {}",
                status, error_text
            )));
        }

        let content_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse content response: {}", e)))?;

        let content = content_response.text();
        if content.is_empty() {
            log::warn!("Google returned no text");
        } else {
            log::info!(
                "Google completion successful, generated {} characters",
                content.len()
            );
        }

        Ok(content)
    }
}

#[async_trait]
impl AnalysisGatewayPort for GoogleService {
    async fn correct_transcript(
        &self,
        transcript: &str,
        metadata: &MeetingMetadata,
    ) -> Result<String> {
        let request = self.build_request(
            PromptTemplates::correction_system(),
            PromptTemplates::render_correction(transcript, metadata),
            self.config.correction_temperature,
        );
        self.generate(&request).await
    }

    async fn analyze_transcript(
        &self,
        transcript: &str,
        module_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String> {
        let request = self.build_request(
            PromptTemplates::analysis_system(),
            PromptTemplates::render_analysis(transcript, module_prompt, history),
            self.config.analysis_temperature,
        );
        self.generate(&request).await
    }

    fn provider_name(&self) -> &str {
        "google"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
