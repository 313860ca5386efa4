//! Meeting record commands
//!
//! Each command drives the controller and returns the text to print.

use crate::controller::InsightController;
use crate::domain::markdown;
use crate::domain::models::{ChatRole, MeetingRecord, MetadataField};
use crate::domain::modules::InsightModule;
use crate::domain::stage::Stage;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Field edits requested for one record
#[derive(Debug, Default, Clone)]
pub struct EditRequest {
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub speakers: Option<String>,
    pub terminology: Option<String>,
    pub length: Option<String>,
    pub transcript: Option<String>,
}

impl EditRequest {
    fn metadata(&self) -> Vec<(MetadataField, &str)> {
        [
            (MetadataField::Subject, &self.subject),
            (MetadataField::Keywords, &self.keywords),
            (MetadataField::Speakers, &self.speakers),
            (MetadataField::Terminology, &self.terminology),
            (MetadataField::Length, &self.length),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata().is_empty() && self.transcript.is_none()
    }
}

/// Resolve a full id or a unique id prefix
pub fn resolve_id(state: &AppState, id: &str) -> Result<String> {
    if state.record(id).is_some() {
        return Ok(id.to_string());
    }

    let matches: Vec<&MeetingRecord> = state
        .records
        .iter()
        .filter(|r| !id.is_empty() && r.id.starts_with(id))
        .collect();
    match matches.as_slice() {
        [record] => Ok(record.id.clone()),
        [] => Err(AppError::NotFound(format!("No record matches {}", id))),
        _ => Err(AppError::InvalidInput(format!(
            "Id prefix {} matches {} records",
            id,
            matches.len()
        ))),
    }
}

/// Resolve `id` and make it the active record
pub fn select(controller: &InsightController, id: &str) -> Result<String> {
    let id = resolve_id(&controller.snapshot(), id)?;
    if !controller.select_record(&id) {
        return Err(AppError::NotFound(format!("No record matches {}", id)));
    }
    Ok(id)
}

fn format_time(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// One line per record, newest first
pub fn list_records(state: &AppState) -> String {
    if state.records.is_empty() {
        return "No meeting records yet. Create one with `new`.".to_string();
    }

    state
        .records
        .iter()
        .map(|r| {
            let modules: String = InsightModule::ALL
                .iter()
                .map(|m| {
                    if r.insights_history.contains_key(m) {
                        m.id()
                    } else {
                        "."
                    }
                })
                .collect();
            let status = if r.corrected().is_some() {
                "corrected"
            } else {
                "draft"
            };
            format!(
                "{}  {}  {:<9}  [{}]  {}",
                short_id(&r.id),
                format_time(r.created_at),
                status,
                modules,
                r.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn create_record(controller: &InsightController, title: Option<&str>) -> String {
    let id = controller.create_record();
    if let Some(title) = title {
        controller.rename_record(&id, title);
    }
    format!("Created record {}", id)
}

pub fn rename_record(controller: &InsightController, id: &str, title: &str) -> Result<String> {
    let id = resolve_id(&controller.snapshot(), id)?;
    controller.rename_record(&id, title);

    let state = controller.snapshot();
    let current = state
        .record(&id)
        .map(|r| r.title.as_str())
        .unwrap_or_default();
    Ok(format!("Title: {}", current))
}

pub fn delete_record(controller: &InsightController, id: &str) -> Result<String> {
    let id = resolve_id(&controller.snapshot(), id)?;
    if controller.delete_record(&id) {
        Ok(format!("Deleted record {}", id))
    } else {
        Ok("Record kept".to_string())
    }
}

pub fn edit_record(controller: &InsightController, id: &str, request: &EditRequest) -> Result<String> {
    if request.is_empty() {
        return Err(AppError::InvalidInput("Nothing to change".to_string()));
    }

    let id = select(controller, id)?;
    for (field, value) in request.metadata() {
        controller.update_metadata(field, value);
    }
    if let Some(transcript) = &request.transcript {
        controller.update_transcript(transcript);
    }
    Ok(format!("Updated record {}", id))
}

/// Record overview, one module thread, or the latest reply verbatim
pub fn show_record(
    controller: &InsightController,
    id: &str,
    module: Option<InsightModule>,
    raw: bool,
    ansi: bool,
) -> Result<String> {
    let id = select(controller, id)?;
    let state = controller.snapshot();
    let record = state
        .record(&id)
        .ok_or_else(|| AppError::NotFound(format!("No record matches {}", id)))?;

    match module {
        Some(module) if raw => record
            .latest_reply(module)
            .map(str::to_string)
            .ok_or_else(|| AppError::NotFound(format!("Module {} has not been run", module.id()))),
        Some(module) => Ok(render_thread(record, module, ansi)),
        None => Ok(render_overview(&state, record)),
    }
}

fn render_overview(state: &AppState, record: &MeetingRecord) -> String {
    let mut out = vec![
        format!("Title:       {}", record.title),
        format!("Id:          {}", record.id),
        format!("Created:     {}", format_time(record.created_at)),
        format!("Stage:       {}", state.stage),
    ];
    out.extend(MetadataField::ALL.iter().map(|field| {
        format!(
            "{:<13}{}",
            format!("{}:", field.label()),
            record.metadata.get(*field)
        )
    }));

    for module in InsightModule::ALL {
        let turns = record.thread(module).len();
        let status = if turns == 0 {
            "not run".to_string()
        } else {
            format!("{} messages", turns)
        };
        out.push(format!("  [{}] {:<24} {}", module.id(), module.name(), status));
    }

    out.push(String::new());
    match record.corrected() {
        Some(text) => {
            out.push("--- Corrected transcript ---".to_string());
            out.push(text.to_string());
        }
        None => {
            out.push("--- Raw transcript ---".to_string());
            out.push(record.raw_transcript.clone());
        }
    }
    out.join("\n")
}

/// Show the stage cursor of a record, optionally moving it first
pub fn stage_record(controller: &InsightController, id: &str, target: Option<Stage>) -> Result<String> {
    let id = select(controller, id)?;
    if let Some(stage) = target {
        if !controller.set_stage(stage) {
            return Err(AppError::InvalidInput(format!(
                "Stage {} needs a corrected transcript; run `correct` first",
                stage
            )));
        }
    }

    let state = controller.snapshot();
    let record = state
        .record(&id)
        .ok_or_else(|| AppError::NotFound(format!("No record matches {}", id)))?;
    Ok(Stage::ALL
        .iter()
        .map(|stage| {
            let cursor = if *stage == state.stage { ">" } else { " " };
            if stage.is_reachable(record) {
                format!("{} {}", cursor, stage)
            } else {
                format!("{} {} (locked)", cursor, stage)
            }
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Renders a module thread with model replies formatted as Markdown
pub fn render_thread(record: &MeetingRecord, module: InsightModule, ansi: bool) -> String {
    let thread = record.thread(module);
    if thread.is_empty() {
        return format!("Module \"{}\" has not been run for this record.", module.name());
    }

    let mut out = vec![format!("== {} ==", module.name())];
    for message in thread {
        let speaker = match message.role {
            ChatRole::User => "You",
            ChatRole::Model => "Assistant",
        };
        out.push(format!("-- {} ({}) --", speaker, format_time(message.timestamp)));
        match message.role {
            ChatRole::User => out.push(message.text.clone()),
            ChatRole::Model => out.push(markdown::render_terminal(
                &markdown::parse(&message.text),
                ansi,
            )),
        }
        out.push(String::new());
    }
    out.join("\n")
}
