//! Insight module registry
//!
//! The five fixed interpretation lenses, in display order. Each module carries
//! a static descriptor with its name, icon reference and instruction prompt.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// A fixed interpretation lens
///
/// Serialized as the single-letter ids used as keys in persisted records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InsightModule {
    #[serde(rename = "A")]
    Atmosphere,
    #[serde(rename = "B")]
    Persona,
    #[serde(rename = "C")]
    Subtext,
    #[serde(rename = "D")]
    PowerStructure,
    #[serde(rename = "E")]
    Summary,
}

/// Static description of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub prompt: &'static str,
}

const ATMOSPHERE: ModuleDescriptor = ModuleDescriptor {
    id: "A",
    name: "Atmosphere & Tension",
    icon: "activity",
    prompt: r#"Map the emotional climate of the meeting.
- Describe the overall mood and how it shifts from opening to close.
- Locate moments of tension, friction or relief and quote the lines that mark them.
- Note who raises or defuses tension, and how.
- Finish with a short timeline table: | Phase | Mood | Evidence |."#,
};

const PERSONA: ModuleDescriptor = ModuleDescriptor {
    id: "B",
    name: "Persona Modeling",
    icon: "users",
    prompt: r#"Build a profile of each speaker.
- For every participant, infer communication style, priorities and likely concerns.
- Identify what each person wants from this meeting and what they avoid saying.
- Support every claim with a quote or a concrete behaviour from the transcript.
- Summarise the profiles in a table: | Speaker | Style | Goal | Watch for |."#,
};

const SUBTEXT: ModuleDescriptor = ModuleDescriptor {
    id: "C",
    name: "Subtext & QBQ",
    icon: "message-square",
    prompt: r#"Read between the lines.
- List statements whose literal meaning differs from their intent and explain the gap.
- Surface unasked questions, hedges and deflections.
- Reframe the key complaints as question-behind-the-question (QBQ) prompts that focus on what the participants themselves can do.
- Point out commitments that sound firm but are conditional."#,
};

const POWER_STRUCTURE: ModuleDescriptor = ModuleDescriptor {
    id: "D",
    name: "Power Structure",
    icon: "network",
    prompt: r#"Analyse influence and decision rights.
- Who sets the agenda, who interrupts, who gets deferred to?
- Distinguish formal authority from actual influence as shown in the transcript.
- Identify alliances, gatekeepers and sidelined voices.
- Explain how decisions were actually reached and who carries the risk."#,
};

const SUMMARY: ModuleDescriptor = ModuleDescriptor {
    id: "E",
    name: "Summary & Conclusions",
    icon: "file-text",
    prompt: r#"Produce an executive summary.
- State the purpose of the meeting and the main topics in order.
- List decisions made, with owners.
- List action items as a table: | Action | Owner | Due |.
- Close with open questions and recommended next steps."#,
};

impl InsightModule {
    /// All modules in display order
    pub const ALL: [InsightModule; 5] = [
        InsightModule::Atmosphere,
        InsightModule::Persona,
        InsightModule::Subtext,
        InsightModule::PowerStructure,
        InsightModule::Summary,
    ];

    pub fn descriptor(&self) -> &'static ModuleDescriptor {
        match self {
            InsightModule::Atmosphere => &ATMOSPHERE,
            InsightModule::Persona => &PERSONA,
            InsightModule::Subtext => &SUBTEXT,
            InsightModule::PowerStructure => &POWER_STRUCTURE,
            InsightModule::Summary => &SUMMARY,
        }
    }

    pub fn id(&self) -> &'static str {
        self.descriptor().id
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    pub fn prompt(&self) -> &'static str {
        self.descriptor().prompt
    }
}

impl std::fmt::Display for InsightModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for InsightModule {
    type Err = AppError;

    /// Accepts the letter id (case-insensitive) or a short keyword
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "a" | "atmosphere" | "tension" => Ok(InsightModule::Atmosphere),
            "b" | "persona" | "personas" => Ok(InsightModule::Persona),
            "c" | "subtext" | "qbq" => Ok(InsightModule::Subtext),
            "d" | "power" | "power-structure" => Ok(InsightModule::PowerStructure),
            "e" | "summary" => Ok(InsightModule::Summary),
            other => Err(AppError::InvalidInput(format!("Unknown module: {}", other))),
        }
    }
}
