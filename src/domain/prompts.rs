//! Prompt templates for transcript correction and insight generation
//!
//! Templates use `{placeholder}` markers that are filled by [`PromptTemplates`]
//! helpers before a request is sent.

use crate::domain::models::{ChatMessage, ChatRole, MeetingMetadata};

/// Marker used in place of the conversation when a thread is empty
pub const NO_HISTORY_MARKER: &str =
    "No conversation history yet. Produce the initial interpretation.";

/// Default prompt templates
pub struct PromptTemplates;

impl PromptTemplates {
    /// System instruction for the correction call
    pub fn correction_system() -> &'static str {
        "You are a professional transcript corrector. Correct the recording transcript according to the correction rules."
    }

    /// System instruction for the analysis call
    pub fn analysis_system() -> &'static str {
        "You are a meeting interpretation expert, skilled at extracting atmosphere, power dynamics and subtext from transcripts. Your responses should be insightful and elegantly formatted."
    }

    /// Template for transcript correction
    pub fn correction() -> &'static str {
        r#"Perform transcript correction.

[Meeting context]
Subject: {subject}
Keywords: {keywords}
Speakers: {speakers}
Terminology: {terminology}
Length: {length}

[Raw transcript]
{transcript}"#
    }

    /// Template for module analysis and follow-up turns
    pub fn analysis() -> &'static str {
        r#"The corrected meeting transcript follows:
---
{transcript}
---

[Module task]
{module_prompt}

[Conversation so far]
{history}

[Current task]
Using the transcript and the conversation context, give an in-depth interpretation or response.

Output requirements:
1. Use structured Markdown (H1, H2, bullet points).
2. Keep the insight sharp and professional.
3. Back up answers to the user's questions or follow-up requests with concrete evidence."#
    }

    /// Fills the correction template with metadata and the raw transcript
    pub fn render_correction(transcript: &str, metadata: &MeetingMetadata) -> String {
        fill(
            Self::correction(),
            &[
                ("subject", metadata.subject.as_str()),
                ("keywords", metadata.keywords.as_str()),
                ("speakers", metadata.speakers.as_str()),
                ("terminology", metadata.terminology.as_str()),
                ("length", metadata.length.as_str()),
                ("transcript", transcript),
            ],
        )
    }

    /// Fills the analysis template
    pub fn render_analysis(transcript: &str, module_prompt: &str, history: &[ChatMessage]) -> String {
        fill(
            Self::analysis(),
            &[
                ("transcript", transcript),
                ("module_prompt", module_prompt),
                ("history", Self::flatten_history(history).as_str()),
            ],
        )
    }

    /// Renders prior turns as `User: ...` / `Assistant: ...` blocks
    pub fn flatten_history(history: &[ChatMessage]) -> String {
        if history.is_empty() {
            return NO_HISTORY_MARKER.to_string();
        }

        history
            .iter()
            .map(|m| {
                let speaker = match m.role {
                    ChatRole::User => "User",
                    ChatRole::Model => "Assistant",
                };
                format!("{}: {}", speaker, m.text)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Substitutes `{name}` markers in one pass over the template
///
/// Inserted values are never scanned again, so text that itself contains a
/// marker is embedded verbatim. Unknown markers are left as they are.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let marker = &rest[start..];
        let value = marker.find('}').and_then(|end| {
            values
                .iter()
                .find(|(name, _)| *name == &marker[1..end])
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &marker[end + 1..];
            }
            None => {
                out.push('{');
                rest = &marker[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
