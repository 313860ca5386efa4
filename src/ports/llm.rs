/// LLM gateway port trait
///
/// Defines the interface to the remote generative model that corrects
/// transcripts and produces insight analyses.
/// Implementation: Google Gemini
use crate::domain::models::{ChatMessage, MeetingMetadata};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for LLM requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name (e.g., "gemini-3-flash-preview")
    pub model: String,

    /// Temperature for transcript correction
    pub correction_temperature: f32,

    /// Temperature for insight analysis
    pub analysis_temperature: f32,

    /// Maximum tokens in response
    pub max_tokens: Option<u32>,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            correction_temperature: 0.2, // Low: stay close to the source text
            analysis_temperature: 0.7,
            max_tokens: None,
            request_timeout_secs: 120,
        }
    }
}

/// Port trait for the analysis gateway
#[async_trait]
pub trait AnalysisGatewayPort: Send + Sync {
    /// Correct a raw transcript using the meeting metadata as context
    ///
    /// Returns an empty string when the provider produces no text.
    async fn correct_transcript(&self, transcript: &str, metadata: &MeetingMetadata)
        -> Result<String>;

    /// Interpret a corrected transcript under a module prompt
    ///
    /// `history` is the thread so far; empty for the initial analysis.
    async fn analyze_transcript(
        &self,
        transcript: &str,
        module_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Check if the service is configured (has API key)
    fn is_configured(&self) -> bool;
}
