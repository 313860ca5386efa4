//! Workflow stages of a record
//!
//! The cursor is session state. It is never persisted; re-entering a record
//! derives it from whether the record already has a corrected transcript.

use crate::domain::models::MeetingRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Stage {
    #[default]
    Input,
    Corrected,
    Interpreting,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Input, Stage::Corrected, Stage::Interpreting];

    /// Stage for its 1-based number
    pub fn from_number(number: u8) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.number() == number)
    }

    pub fn number(&self) -> u8 {
        match self {
            Stage::Input => 1,
            Stage::Corrected => 2,
            Stage::Interpreting => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Input => "Input",
            Stage::Corrected => "Correction",
            Stage::Interpreting => "Interpretation",
        }
    }

    /// Stage to show when a record becomes active
    pub fn on_select(record: &MeetingRecord) -> Stage {
        if record.corrected().is_some() {
            Stage::Interpreting
        } else {
            Stage::Input
        }
    }

    /// Stages past Input need a corrected transcript
    pub fn is_reachable(&self, record: &MeetingRecord) -> bool {
        *self == Stage::Input || record.corrected().is_some()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}
