//! Application state and its transition function
//!
//! All session state (the record collection, selection, stage cursor,
//! in-flight request and chat input buffers) lives in [`AppState`]. It is only
//! changed through [`reduce`], a pure function from a snapshot and an
//! [`Action`] to the next snapshot. Actions whose preconditions do not hold
//! leave the state unchanged.

use crate::domain::models::{ChatMessage, MeetingRecord, MetadataField};
use crate::domain::modules::InsightModule;
use crate::domain::stage::Stage;
use std::collections::BTreeMap;

/// The one request allowed in flight at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    Correction {
        record_id: String,
    },
    Analysis {
        record_id: String,
        module: InsightModule,
    },
}

impl PendingRequest {
    /// Human-readable progress text for the outstanding request
    pub fn progress_label(&self) -> String {
        match self {
            PendingRequest::Correction { .. } => "Rebuilding the transcript context...".to_string(),
            PendingRequest::Analysis { module, .. } => {
                format!("Interpreting module \"{}\"...", module.name())
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Newest first
    pub records: Vec<MeetingRecord>,
    pub active_record_id: Option<String>,
    pub stage: Stage,
    pub pending: Option<PendingRequest>,
    /// Unsent follow-up text per module
    pub chat_inputs: BTreeMap<InsightModule, String>,
}

impl AppState {
    pub fn record(&self, id: &str) -> Option<&MeetingRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn active_record(&self) -> Option<&MeetingRecord> {
        self.active_record_id
            .as_deref()
            .and_then(|id| self.record(id))
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether an analysis for `module` is the request in flight
    pub fn is_analyzing(&self, module: InsightModule) -> bool {
        matches!(
            &self.pending,
            Some(PendingRequest::Analysis { module: m, .. }) if *m == module
        )
    }

    pub fn chat_input(&self, module: InsightModule) -> &str {
        self.chat_inputs
            .get(&module)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn record_mut(&mut self, id: &str) -> Option<&mut MeetingRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    fn active_record_mut(&mut self) -> Option<&mut MeetingRecord> {
        let id = self.active_record_id.clone()?;
        self.record_mut(&id)
    }
}

/// A state transition request
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the collection with persisted records
    RecordsLoaded(Vec<MeetingRecord>),
    /// Prepend a new record, select it and return to Input
    RecordCreated(MeetingRecord),
    RecordSelected(String),
    RecordRenamed { id: String, title: String },
    RecordDeleted(String),
    MetadataChanged { field: MetadataField, value: String },
    TranscriptChanged(String),
    StageChanged(Stage),
    ChatInputChanged { module: InsightModule, text: String },
    RequestStarted(PendingRequest),
    RequestFinished,
    CorrectionSucceeded { record_id: String, text: String },
    /// First analysis of a module; replaces the module's thread
    AnalysisSeeded {
        record_id: String,
        module: InsightModule,
        message: ChatMessage,
    },
    /// Follow-up question; also clears the module's input buffer
    UserMessageAppended {
        record_id: String,
        module: InsightModule,
        message: ChatMessage,
    },
    ReplyAppended {
        record_id: String,
        module: InsightModule,
        message: ChatMessage,
    },
}

/// Computes the state that follows `action`
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();

    match action {
        Action::RecordsLoaded(records) => {
            next.records = records;
            next.active_record_id = None;
            next.stage = Stage::Input;
        }
        Action::RecordCreated(record) => {
            next.active_record_id = Some(record.id.clone());
            next.records.insert(0, record);
            next.stage = Stage::Input;
        }
        Action::RecordSelected(id) => {
            if let Some(record) = state.record(&id) {
                next.stage = Stage::on_select(record);
                next.active_record_id = Some(id);
            }
        }
        Action::RecordRenamed { id, title } => {
            let title = title.trim();
            if !title.is_empty() {
                if let Some(record) = next.record_mut(&id) {
                    record.title = title.to_string();
                }
            }
        }
        Action::RecordDeleted(id) => {
            next.records.retain(|r| r.id != id);
            if state.active_record_id.as_deref() == Some(id.as_str()) {
                match next.records.first() {
                    Some(first) => {
                        next.stage = Stage::on_select(first);
                        next.active_record_id = Some(first.id.clone());
                    }
                    None => {
                        next.stage = Stage::Input;
                        next.active_record_id = None;
                    }
                }
            }
        }
        Action::MetadataChanged { field, value } => {
            if let Some(record) = next.active_record_mut() {
                record.metadata.set(field, value);
            }
        }
        Action::TranscriptChanged(value) => {
            if let Some(record) = next.active_record_mut() {
                record.raw_transcript = value;
            }
        }
        Action::StageChanged(stage) => {
            if state.active_record().is_some_and(|r| stage.is_reachable(r)) {
                next.stage = stage;
            }
        }
        Action::ChatInputChanged { module, text } => {
            next.chat_inputs.insert(module, text);
        }
        Action::RequestStarted(request) => {
            if state.pending.is_none() {
                next.pending = Some(request);
            }
        }
        Action::RequestFinished => {
            next.pending = None;
        }
        Action::CorrectionSucceeded { record_id, text } => {
            if let Some(record) = next.record_mut(&record_id) {
                record.corrected_transcript = Some(text);
                if state.active_record_id.as_deref() == Some(record_id.as_str()) {
                    next.stage = Stage::Corrected;
                }
            }
        }
        Action::AnalysisSeeded {
            record_id,
            module,
            message,
        } => {
            if let Some(record) = next.record_mut(&record_id) {
                record.insights.insert(module, message.text.clone());
                record.insights_history.insert(module, vec![message]);
                if state.active_record_id.as_deref() == Some(record_id.as_str()) {
                    next.stage = Stage::Interpreting;
                }
            }
        }
        Action::UserMessageAppended {
            record_id,
            module,
            message,
        } => {
            if let Some(thread) = next
                .record_mut(&record_id)
                .and_then(|r| r.insights_history.get_mut(&module))
            {
                thread.push(message);
                next.chat_inputs.remove(&module);
            }
        }
        Action::ReplyAppended {
            record_id,
            module,
            message,
        } => {
            if let Some(record) = next.record_mut(&record_id) {
                record
                    .insights_history
                    .entry(module)
                    .or_default()
                    .push(message);
            }
        }
    }

    next
}
