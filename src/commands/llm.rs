//! Gateway-backed insight commands
//!
//! Provides:
//! - Transcript correction
//! - Module analysis and follow-up questions
//! - Module and model listings
//! - Markdown rendering of saved replies

use crate::adapters::services::llm::GoogleService;
use crate::commands::meeting::select;
use crate::controller::{InsightController, RequestOutcome};
use crate::domain::markdown;
use crate::domain::modules::InsightModule;
use crate::error::{AppError, Result};

fn outcome_to_result(outcome: RequestOutcome, what: &str) -> Result<()> {
    match outcome {
        RequestOutcome::Completed => Ok(()),
        RequestOutcome::Failed => Err(AppError::RequestFailed(what.to_string())),
        RequestOutcome::Refused => Err(AppError::InvalidInput(format!("{} was not started", what))),
    }
}

/// Correct a record's raw transcript and return the corrected text
pub async fn correct_record(controller: &InsightController, id: &str) -> Result<String> {
    let id = select(controller, id)?;
    let has_transcript = controller
        .snapshot()
        .record(&id)
        .is_some_and(|r| !r.raw_transcript.is_empty());
    if !has_transcript {
        return Err(AppError::InvalidInput(
            "Record has no transcript; add one with `edit --transcript-file`".to_string(),
        ));
    }

    outcome_to_result(controller.correct().await, "Correction")?;

    let state = controller.snapshot();
    Ok(state
        .record(&id)
        .and_then(|r| r.corrected())
        .unwrap_or_default()
        .to_string())
}

fn require_corrected(controller: &InsightController, id: &str) -> Result<()> {
    let corrected = controller
        .snapshot()
        .record(id)
        .is_some_and(|r| r.corrected().is_some());
    if corrected {
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "Record has no corrected transcript; run `correct` first".to_string(),
        ))
    }
}

fn latest_reply(controller: &InsightController, id: &str, module: InsightModule, ansi: bool) -> String {
    let state = controller.snapshot();
    let reply = state
        .record(id)
        .and_then(|r| r.latest_reply(module))
        .unwrap_or_default();
    markdown::render_terminal(&markdown::parse(reply), ansi)
}

/// Run a module on a record, replacing any earlier thread
pub async fn analyze_record(
    controller: &InsightController,
    id: &str,
    module: InsightModule,
    ansi: bool,
) -> Result<String> {
    let id = select(controller, id)?;
    require_corrected(controller, &id)?;

    outcome_to_result(controller.activate(module).await, "Analysis")?;
    Ok(latest_reply(controller, &id, module, ansi))
}

/// Ask a follow-up question in a module thread
pub async fn chat(
    controller: &InsightController,
    id: &str,
    module: InsightModule,
    message: &str,
    ansi: bool,
) -> Result<String> {
    if message.trim().is_empty() {
        return Err(AppError::InvalidInput("Message is empty".to_string()));
    }

    let id = select(controller, id)?;
    require_corrected(controller, &id)?;
    let started = controller
        .snapshot()
        .record(&id)
        .is_some_and(|r| !r.thread(module).is_empty());
    if !started {
        return Err(AppError::InvalidInput(format!(
            "Module {} has not been run; run `analyze` first",
            module.id()
        )));
    }

    controller.set_chat_input(module, message);
    outcome_to_result(controller.send_chat(module).await, "Follow-up")?;
    Ok(latest_reply(controller, &id, module, ansi))
}

/// The five modules with their ids
pub fn list_modules() -> String {
    InsightModule::ALL
        .iter()
        .map(|m| {
            let d = m.descriptor();
            format!("{}  {}  {}", d.id, d.icon, d.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_markdown(text: &str, ansi: bool) -> String {
    markdown::render_terminal(&markdown::parse(text), ansi)
}

/// Fetch the Gemini models usable for generateContent
pub async fn fetch_models(service: &GoogleService) -> Result<String> {
    let models = service.list_models().await?;
    if models.is_empty() {
        return Ok("No Gemini models available".to_string());
    }

    Ok(models
        .iter()
        .map(|m| {
            let name = m.name.trim_start_matches("models/");
            match m.input_token_limit {
                Some(limit) => format!("{:<40} {} ({} input tokens)", name, m.display_name, limit),
                None => format!("{:<40} {}", name, m.display_name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n"))
}
