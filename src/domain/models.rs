/// Domain models for Meeting Insight
///
/// These models represent core business entities and are platform-agnostic.
/// Field names are serialized in camelCase so persisted collections keep the
/// same JSON shape across versions.
use crate::domain::modules::InsightModule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder title given to freshly created records
pub const DEFAULT_RECORD_TITLE: &str = "Untitled meeting analysis";

/// Who authored a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Model => write!(f, "model"),
        }
    }
}

/// One turn of an insight thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: i64, // Unix milliseconds
}

impl ChatMessage {
    /// Creates a user message stamped with the current time
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Creates a model message stamped with the current time
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Context describing the meeting, fed to the correction prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeetingMetadata {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub speakers: String,
    #[serde(default)]
    pub terminology: String,
    #[serde(default)]
    pub length: String,
}

/// Names one of the editable metadata fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Subject,
    Keywords,
    Speakers,
    Terminology,
    Length,
}

impl MetadataField {
    pub const ALL: [MetadataField; 5] = [
        MetadataField::Subject,
        MetadataField::Keywords,
        MetadataField::Speakers,
        MetadataField::Terminology,
        MetadataField::Length,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetadataField::Subject => "Subject",
            MetadataField::Keywords => "Keywords",
            MetadataField::Speakers => "Speakers",
            MetadataField::Terminology => "Terminology",
            MetadataField::Length => "Length",
        }
    }
}

impl MeetingMetadata {
    /// Replaces the value of a single field
    pub fn set(&mut self, field: MetadataField, value: String) {
        match field {
            MetadataField::Subject => self.subject = value,
            MetadataField::Keywords => self.keywords = value,
            MetadataField::Speakers => self.speakers = value,
            MetadataField::Terminology => self.terminology = value,
            MetadataField::Length => self.length = value,
        }
    }

    pub fn get(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::Subject => &self.subject,
            MetadataField::Keywords => &self.keywords,
            MetadataField::Speakers => &self.speakers,
            MetadataField::Terminology => &self.terminology,
            MetadataField::Length => &self.length,
        }
    }
}

/// Represents one transcript-analysis session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    pub id: String,
    pub title: String,
    pub created_at: i64, // Unix milliseconds
    #[serde(default)]
    pub raw_transcript: String,
    #[serde(default)]
    pub metadata: MeetingMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_log: Option<String>,
    /// First-call result per module
    #[serde(default)]
    pub insights: BTreeMap<InsightModule, String>,
    /// Full conversation per module, oldest first
    #[serde(default)]
    pub insights_history: BTreeMap<InsightModule, Vec<ChatMessage>>,
}

impl MeetingRecord {
    /// Creates a new, empty record with a fresh id
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_RECORD_TITLE.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            raw_transcript: String::new(),
            metadata: MeetingMetadata::default(),
            corrected_transcript: None,
            correction_log: None,
            insights: BTreeMap::new(),
            insights_history: BTreeMap::new(),
        }
    }

    /// The corrected transcript, if correction succeeded and produced text
    pub fn corrected(&self) -> Option<&str> {
        self.corrected_transcript
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    pub fn thread(&self, module: InsightModule) -> &[ChatMessage] {
        self.insights_history
            .get(&module)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Text of the most recent model reply in a module's thread
    pub fn latest_reply(&self, module: InsightModule) -> Option<&str> {
        self.thread(module)
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Model)
            .map(|m| m.text.as_str())
    }
}

impl Default for MeetingRecord {
    fn default() -> Self {
        Self::new()
    }
}
