//! Insight controller
//!
//! Owns the [`AppState`] and wires it to the outside world: every collection
//! change is written to the blob store, gateway calls run outside the state
//! lock, and failures are reported through the notifier port. Only one
//! gateway request may be in flight at a time; anything issued while busy is
//! refused.

use crate::domain::models::{ChatMessage, MeetingRecord, MetadataField};
use crate::domain::modules::InsightModule;
use crate::domain::stage::Stage;
use crate::error::Result;
use crate::ports::dialog::{ConfirmPort, NotifierPort};
use crate::ports::llm::AnalysisGatewayPort;
use crate::ports::storage::BlobStorePort;
use crate::state::{reduce, Action, AppState, PendingRequest};
use std::sync::{Arc, Mutex};

/// Well-known key the record collection is stored under
pub const STORAGE_KEY: &str = "meeting_insights_history";

const CORRECTION_FAILED: &str = "Correction failed.";
const ANALYSIS_FAILED: &str = "Analysis failed.";
const FOLLOW_UP_FAILED: &str = "Follow-up analysis failed.";

/// How a gateway-backed request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Completed,
    /// The call was made and failed; the user has been notified
    Failed,
    /// Preconditions did not hold or another request was in flight
    Refused,
}

/// Parses a persisted collection, back-filling fields older versions lacked
pub fn decode_records(blob: &str) -> Result<Vec<MeetingRecord>> {
    Ok(serde_json::from_str(blob)?)
}

pub struct InsightController {
    state: Mutex<AppState>,
    storage: Arc<dyn BlobStorePort>,
    gateway: Arc<dyn AnalysisGatewayPort>,
    confirm: Arc<dyn ConfirmPort>,
    notifier: Arc<dyn NotifierPort>,
    storage_key: String,
}

impl InsightController {
    pub fn new(
        storage: Arc<dyn BlobStorePort>,
        gateway: Arc<dyn AnalysisGatewayPort>,
        confirm: Arc<dyn ConfirmPort>,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            state: Mutex::new(AppState::default()),
            storage,
            gateway,
            confirm,
            notifier,
            storage_key: STORAGE_KEY.to_string(),
        }
    }

    /// Use a different blob key (builder pattern)
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Load the persisted collection, starting empty if it is absent or unreadable
    pub fn load(&self) {
        let records = match self.storage.get(&self.storage_key) {
            Ok(Some(blob)) => decode_records(&blob).unwrap_or_else(|e| {
                log::error!("Failed to parse saved records: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Failed to read saved records: {}", e);
                Vec::new()
            }
        };

        log::info!("Loaded {} meeting records", records.len());
        let mut state = self.state.lock().unwrap();
        *state = reduce(&state, Action::RecordsLoaded(records));
    }

    /// A copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.state.lock().unwrap().clone()
    }

    /// Apply one action, persisting the collection if it changed
    pub fn dispatch(&self, action: Action) -> AppState {
        let mut state = self.state.lock().unwrap();
        self.apply(&mut state, action);
        state.clone()
    }

    fn apply(&self, state: &mut AppState, action: Action) {
        if let Action::RequestStarted(pending) = &action {
            log::info!("{}", pending.progress_label());
        }
        let next = reduce(state, action);
        if next.records != state.records {
            self.persist(&next.records);
        }
        *state = next;
    }

    fn persist(&self, records: &[MeetingRecord]) {
        let blob = match serde_json::to_string(records) {
            Ok(blob) => blob,
            Err(e) => {
                log::error!("Failed to serialize records: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.storage_key, &blob) {
            log::error!("Failed to save records: {}", e);
        }
    }

    // Record store

    /// Create an empty record, select it, and return its id
    pub fn create_record(&self) -> String {
        let record = MeetingRecord::new();
        let id = record.id.clone();
        self.dispatch(Action::RecordCreated(record));
        log::info!("Created meeting record {}", id);
        id
    }

    /// Make a record active; returns false for unknown ids
    pub fn select_record(&self, id: &str) -> bool {
        let state = self.dispatch(Action::RecordSelected(id.to_string()));
        state.active_record_id.as_deref() == Some(id)
    }

    pub fn rename_record(&self, id: &str, title: &str) {
        self.dispatch(Action::RecordRenamed {
            id: id.to_string(),
            title: title.to_string(),
        });
    }

    /// Delete a record after the user confirms; returns whether it was removed
    pub fn delete_record(&self, id: &str) -> bool {
        let title = match self.snapshot().record(id) {
            Some(record) => record.title.clone(),
            None => return false,
        };

        if !self
            .confirm
            .confirm(&format!("Delete \"{}\"? This cannot be undone.", title))
        {
            log::debug!("Deletion of {} cancelled", id);
            return false;
        }

        self.dispatch(Action::RecordDeleted(id.to_string()));
        log::info!("Deleted meeting record {}", id);
        true
    }

    pub fn update_metadata(&self, field: MetadataField, value: &str) {
        self.dispatch(Action::MetadataChanged {
            field,
            value: value.to_string(),
        });
    }

    pub fn update_transcript(&self, value: &str) {
        self.dispatch(Action::TranscriptChanged(value.to_string()));
    }

    /// Move the stage cursor; returns false if the stage is not reachable
    pub fn set_stage(&self, stage: Stage) -> bool {
        self.dispatch(Action::StageChanged(stage)).stage == stage
    }

    pub fn set_chat_input(&self, module: InsightModule, text: &str) {
        self.dispatch(Action::ChatInputChanged {
            module,
            text: text.to_string(),
        });
    }

    // Insight sessions

    /// Correct the active record's raw transcript
    pub async fn correct(&self) -> RequestOutcome {
        let job = {
            let mut state = self.state.lock().unwrap();
            let job = state
                .active_record()
                .filter(|r| !r.raw_transcript.is_empty())
                .map(|r| (r.id.clone(), r.raw_transcript.clone(), r.metadata.clone()));
            match job {
                Some(job) if !state.is_busy() => {
                    self.apply(
                        &mut state,
                        Action::RequestStarted(PendingRequest::Correction {
                            record_id: job.0.clone(),
                        }),
                    );
                    Some(job)
                }
                _ => None,
            }
        };
        let Some((record_id, transcript, metadata)) = job else {
            log::debug!("Correction refused");
            return RequestOutcome::Refused;
        };

        log::info!(
            "Correcting transcript of record {} via {}",
            record_id,
            self.gateway.provider_name()
        );
        let result = self.gateway.correct_transcript(&transcript, &metadata).await;

        let outcome = {
            let mut state = self.state.lock().unwrap();
            let outcome = match result {
                Ok(text) => {
                    self.apply(&mut state, Action::CorrectionSucceeded { record_id, text });
                    RequestOutcome::Completed
                }
                Err(e) => {
                    log::error!("Transcript correction failed: {}", e);
                    RequestOutcome::Failed
                }
            };
            self.apply(&mut state, Action::RequestFinished);
            outcome
        };

        if outcome == RequestOutcome::Failed {
            self.notifier.notify_error(CORRECTION_FAILED);
        }
        outcome
    }

    /// Run the initial analysis of `module` on the active record
    pub async fn activate(&self, module: InsightModule) -> RequestOutcome {
        let Some((record_id, transcript, _)) = self.begin_analysis(module, None) else {
            log::debug!("Activation of {} refused", module.id());
            return RequestOutcome::Refused;
        };

        log::info!("Analyzing record {} with module {}", record_id, module.id());
        let result = self
            .gateway
            .analyze_transcript(&transcript, module.prompt(), &[])
            .await;

        let outcome = {
            let mut state = self.state.lock().unwrap();
            let outcome = match result {
                Ok(text) => {
                    self.apply(
                        &mut state,
                        Action::AnalysisSeeded {
                            record_id,
                            module,
                            message: ChatMessage::model(text),
                        },
                    );
                    RequestOutcome::Completed
                }
                Err(e) => {
                    log::error!("Analysis with module {} failed: {}", module.id(), e);
                    RequestOutcome::Failed
                }
            };
            self.apply(&mut state, Action::RequestFinished);
            outcome
        };

        if outcome == RequestOutcome::Failed {
            self.notifier.notify_error(ANALYSIS_FAILED);
        }
        outcome
    }

    /// Ask a follow-up question in a module's thread
    ///
    /// The question is appended before the call and stays in the thread even
    /// if the call fails.
    pub async fn converse(&self, module: InsightModule, user_text: &str) -> RequestOutcome {
        if user_text.trim().is_empty() {
            return RequestOutcome::Refused;
        }

        let Some((record_id, transcript, history)) = self.begin_analysis(module, Some(user_text))
        else {
            log::debug!("Follow-up on {} refused", module.id());
            return RequestOutcome::Refused;
        };

        log::info!(
            "Follow-up on record {} module {} ({} messages)",
            record_id,
            module.id(),
            history.len()
        );
        let result = self
            .gateway
            .analyze_transcript(&transcript, module.prompt(), &history)
            .await;

        let outcome = {
            let mut state = self.state.lock().unwrap();
            let outcome = match result {
                Ok(text) => {
                    self.apply(
                        &mut state,
                        Action::ReplyAppended {
                            record_id,
                            module,
                            message: ChatMessage::model(text),
                        },
                    );
                    RequestOutcome::Completed
                }
                Err(e) => {
                    log::error!("Follow-up with module {} failed: {}", module.id(), e);
                    RequestOutcome::Failed
                }
            };
            self.apply(&mut state, Action::RequestFinished);
            outcome
        };

        if outcome == RequestOutcome::Failed {
            self.notifier.notify_error(FOLLOW_UP_FAILED);
        }
        outcome
    }

    /// Send the module's pending input buffer as a follow-up
    pub async fn send_chat(&self, module: InsightModule) -> RequestOutcome {
        let text = self.snapshot().chat_input(module).to_string();
        self.converse(module, &text).await
    }

    /// Checks preconditions and marks an analysis in flight
    ///
    /// With `question` set, the user message is appended first. Returns the
    /// record id, corrected transcript and the history to send.
    fn begin_analysis(
        &self,
        module: InsightModule,
        question: Option<&str>,
    ) -> Option<(String, String, Vec<ChatMessage>)> {
        let mut state = self.state.lock().unwrap();
        if state.is_busy() {
            return None;
        }
        let record = state.active_record()?;
        let transcript = record.corrected()?.to_string();
        let record_id = record.id.clone();
        let mut history = Vec::new();

        if let Some(text) = question {
            // Follow-ups only continue a thread seeded by activation
            if record.thread(module).is_empty() {
                return None;
            }
            let message = ChatMessage::user(text);
            history = record.thread(module).to_vec();
            history.push(message.clone());
            self.apply(
                &mut state,
                Action::UserMessageAppended {
                    record_id: record_id.clone(),
                    module,
                    message,
                },
            );
        }

        self.apply(
            &mut state,
            Action::RequestStarted(PendingRequest::Analysis {
                record_id: record_id.clone(),
                module,
            }),
        );
        Some((record_id, transcript, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::dialog::{MockConfirmPort, MockNotifierPort};
    use crate::ports::mocks::{GatewayCall, MockGateway, MockStorage};
    use crate::domain::models::ChatRole;
    use tokio::sync::Notify;

    fn silent_notifier() -> MockNotifierPort {
        let mut notifier = MockNotifierPort::new();
        notifier.expect_notify_error().never();
        notifier
    }

    fn notifier_expecting(message: &'static str) -> MockNotifierPort {
        let mut notifier = MockNotifierPort::new();
        notifier
            .expect_notify_error()
            .withf(move |m| m.to_string() == message)
            .times(1)
            .return_const(());
        notifier
    }

    fn confirming(answer: bool) -> MockConfirmPort {
        let mut confirm = MockConfirmPort::new();
        confirm.expect_confirm().times(1).return_const(answer);
        confirm
    }

    fn build(
        storage: &MockStorage,
        gateway: &MockGateway,
        confirm: MockConfirmPort,
        notifier: MockNotifierPort,
    ) -> InsightController {
        let controller = InsightController::new(
            Arc::new(storage.clone()),
            Arc::new(gateway.clone()),
            Arc::new(confirm),
            Arc::new(notifier),
        );
        controller.load();
        controller
    }

    /// Controller with one selected record that already has a corrected transcript
    fn with_corrected_record(
        gateway: &MockGateway,
        notifier: MockNotifierPort,
    ) -> (InsightController, String) {
        let mut record = MeetingRecord::new();
        record.corrected_transcript = Some("Ann: we ship Friday.".to_string());
        let id = record.id.clone();
        let blob = serde_json::to_string(&vec![record]).unwrap();
        let storage = MockStorage::with_blob(STORAGE_KEY, &blob);

        let controller = build(&storage, gateway, MockConfirmPort::new(), notifier);
        assert!(controller.select_record(&id));
        (controller, id)
    }

    #[tokio::test]
    async fn test_activate_without_record_is_noop() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        let controller = build(&storage, &gateway, MockConfirmPort::new(), silent_notifier());

        assert_eq!(
            controller.activate(InsightModule::Summary).await,
            RequestOutcome::Refused
        );
        assert!(gateway.calls().is_empty());
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_activate_without_correction_is_noop() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        let controller = build(&storage, &gateway, MockConfirmPort::new(), silent_notifier());
        controller.create_record();
        let before = controller.snapshot();
        let writes = storage.write_count();

        for module in InsightModule::ALL {
            assert_eq!(controller.activate(module).await, RequestOutcome::Refused);
        }
        assert!(gateway.calls().is_empty());
        assert_eq!(controller.snapshot(), before);
        assert_eq!(storage.write_count(), writes);
    }

    #[tokio::test]
    async fn test_correct_success_advances_stage() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        gateway.push_reply("Ann: We ship on Friday.");
        let controller = build(&storage, &gateway, MockConfirmPort::new(), silent_notifier());

        let id = controller.create_record();
        controller.update_metadata(MetadataField::Speakers, "Ann");
        controller.update_transcript("ann we ship friday");

        assert_eq!(controller.correct().await, RequestOutcome::Completed);

        let state = controller.snapshot();
        assert_eq!(state.stage, Stage::Corrected);
        assert!(!state.is_busy());
        assert_eq!(
            state.record(&id).unwrap().corrected_transcript.as_deref(),
            Some("Ann: We ship on Friday.")
        );
        match &gateway.calls()[0] {
            GatewayCall::Correct { transcript, metadata } => {
                assert_eq!(transcript, "ann we ship friday");
                assert_eq!(metadata.speakers, "Ann");
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_correct_requires_transcript() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        let controller = build(&storage, &gateway, MockConfirmPort::new(), silent_notifier());
        controller.create_record();

        assert_eq!(controller.correct().await, RequestOutcome::Refused);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_correct_failure_notifies_and_keeps_state() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        gateway.push_failure("503");
        let controller = build(
            &storage,
            &gateway,
            MockConfirmPort::new(),
            notifier_expecting(CORRECTION_FAILED),
        );
        controller.create_record();
        controller.update_transcript("raw");
        let before = controller.snapshot();

        assert_eq!(controller.correct().await, RequestOutcome::Failed);
        assert_eq!(controller.snapshot(), before);
    }

    #[tokio::test]
    async fn test_activate_seeds_thread() {
        let gateway = MockGateway::new();
        gateway.push_reply("# Mood\nCalm");
        let (controller, id) = with_corrected_record(&gateway, silent_notifier());

        assert_eq!(
            controller.activate(InsightModule::Atmosphere).await,
            RequestOutcome::Completed
        );

        let state = controller.snapshot();
        let record = state.record(&id).unwrap();
        let thread = record.thread(InsightModule::Atmosphere);
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].role, ChatRole::Model);
        assert_eq!(record.insights[&InsightModule::Atmosphere], "# Mood\nCalm");
        assert_eq!(state.stage, Stage::Interpreting);

        match &gateway.calls()[0] {
            GatewayCall::Analyze {
                transcript,
                module_prompt,
                history,
            } => {
                assert_eq!(transcript, "Ann: we ship Friday.");
                assert_eq!(module_prompt, InsightModule::Atmosphere.prompt());
                assert!(history.is_empty());
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_activate_failure_leaves_state() {
        let gateway = MockGateway::new();
        gateway.push_failure("quota");
        let (controller, _) = with_corrected_record(&gateway, notifier_expecting(ANALYSIS_FAILED));
        let before = controller.snapshot();

        assert_eq!(
            controller.activate(InsightModule::Persona).await,
            RequestOutcome::Failed
        );
        assert_eq!(controller.snapshot(), before);
    }

    #[tokio::test]
    async fn test_converse_appends_both_turns() {
        let gateway = MockGateway::new();
        gateway.push_reply("initial");
        gateway.push_reply("answer");
        let (controller, id) = with_corrected_record(&gateway, silent_notifier());
        let module = InsightModule::Subtext;

        controller.activate(module).await;
        controller.set_chat_input(module, "What was left unsaid?");
        assert_eq!(controller.send_chat(module).await, RequestOutcome::Completed);

        let state = controller.snapshot();
        let roles: Vec<ChatRole> = state
            .record(&id)
            .unwrap()
            .thread(module)
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(roles, vec![ChatRole::Model, ChatRole::User, ChatRole::Model]);
        assert_eq!(state.chat_input(module), "");

        match &gateway.calls()[1] {
            GatewayCall::Analyze { history, .. } => {
                assert_eq!(history.len(), 2);
                assert_eq!(history[1].text, "What was left unsaid?");
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_follow_up_keeps_user_message() {
        let gateway = MockGateway::new();
        gateway.push_reply("initial");
        gateway.push_failure("timeout");
        let (controller, id) =
            with_corrected_record(&gateway, notifier_expecting(FOLLOW_UP_FAILED));
        let module = InsightModule::Summary;

        controller.activate(module).await;
        assert_eq!(
            controller.converse(module, "Any risks?").await,
            RequestOutcome::Failed
        );

        let state = controller.snapshot();
        let thread = state.record(&id).unwrap().thread(module);
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[1].role, ChatRole::User);
        assert_eq!(thread[1].text, "Any risks?");
        assert!(!state.is_busy());
    }

    #[tokio::test]
    async fn test_blank_follow_up_is_refused() {
        let gateway = MockGateway::new();
        let (controller, _) = with_corrected_record(&gateway, silent_notifier());
        let before = controller.snapshot();

        assert_eq!(
            controller.converse(InsightModule::Summary, "  \n").await,
            RequestOutcome::Refused
        );
        assert_eq!(controller.snapshot(), before);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_follow_up_before_activation_is_refused() {
        let gateway = MockGateway::new();
        gateway.push_reply("unused");
        let (controller, id) = with_corrected_record(&gateway, silent_notifier());
        controller.set_chat_input(InsightModule::Summary, "hi");

        assert_eq!(
            controller.send_chat(InsightModule::Summary).await,
            RequestOutcome::Refused
        );
        assert!(gateway.calls().is_empty());

        let state = controller.snapshot();
        assert!(state.record(&id).unwrap().thread(InsightModule::Summary).is_empty());
        assert_eq!(state.chat_input(InsightModule::Summary), "hi");
        assert!(!state.is_busy());
    }

    #[tokio::test]
    async fn test_set_stage_respects_reachability() {
        let gateway = MockGateway::new();
        gateway.push_reply("Ann: we ship Friday.");
        let storage = MockStorage::new();
        let controller = build(&storage, &gateway, MockConfirmPort::new(), silent_notifier());
        let id = controller.create_record();

        assert!(!controller.set_stage(Stage::Interpreting));
        assert_eq!(controller.snapshot().stage, Stage::Input);

        controller.update_transcript("ann we ship friday");
        assert_eq!(controller.correct().await, RequestOutcome::Completed);
        assert!(controller.set_stage(Stage::Input));
        assert!(controller.set_stage(Stage::Interpreting));

        let state = controller.snapshot();
        assert_eq!(state.stage, Stage::Interpreting);
        assert_eq!(state.active_record_id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_requests_while_busy_are_refused() {
        let gate = Arc::new(Notify::new());
        let gateway = MockGateway::new().gated(gate.clone());
        gateway.push_reply("summary");
        let (controller, id) = with_corrected_record(&gateway, silent_notifier());
        let controller = Arc::new(controller);

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.activate(InsightModule::Summary).await }
        });
        while !controller.snapshot().is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(controller.snapshot().is_analyzing(InsightModule::Summary));

        assert_eq!(
            controller.activate(InsightModule::Atmosphere).await,
            RequestOutcome::Refused
        );
        assert_eq!(
            controller.converse(InsightModule::Summary, "more").await,
            RequestOutcome::Refused
        );
        assert_eq!(controller.correct().await, RequestOutcome::Refused);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), RequestOutcome::Completed);

        assert_eq!(gateway.calls().len(), 1);
        let state = controller.snapshot();
        let record = state.record(&id).unwrap();
        assert_eq!(record.thread(InsightModule::Summary).len(), 1);
        assert!(record.thread(InsightModule::Atmosphere).is_empty());
    }

    #[tokio::test]
    async fn test_result_lands_on_originating_record() {
        let gate = Arc::new(Notify::new());
        let gateway = MockGateway::new().gated(gate.clone());
        gateway.push_reply("power map");
        let (controller, id) = with_corrected_record(&gateway, silent_notifier());
        let controller = Arc::new(controller);

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.activate(InsightModule::PowerStructure).await }
        });
        while !controller.snapshot().is_busy() {
            tokio::task::yield_now().await;
        }

        let other = controller.create_record();
        gate.notify_one();
        assert_eq!(pending.await.unwrap(), RequestOutcome::Completed);

        let state = controller.snapshot();
        assert_eq!(state.active_record_id.as_deref(), Some(other.as_str()));
        assert_eq!(state.stage, Stage::Input);
        assert_eq!(
            state.record(&id).unwrap().latest_reply(InsightModule::PowerStructure),
            Some("power map")
        );
        assert!(state.record(&other).unwrap().insights_history.is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        let controller = build(&storage, &gateway, confirming(false), silent_notifier());
        let id = controller.create_record();

        assert!(!controller.delete_record(&id));
        assert_eq!(controller.snapshot().records.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_only_record_clears_selection() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        let controller = build(&storage, &gateway, confirming(true), silent_notifier());
        let id = controller.create_record();

        assert!(controller.delete_record(&id));
        let state = controller.snapshot();
        assert!(state.records.is_empty());
        assert!(state.active_record_id.is_none());
        assert_eq!(storage.blob(STORAGE_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_delete_other_record_keeps_selection() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        let controller = build(&storage, &gateway, confirming(true), silent_notifier());
        let older = controller.create_record();
        let newer = controller.create_record();

        assert!(controller.delete_record(&older));
        assert_eq!(
            controller.snapshot().active_record_id.as_deref(),
            Some(newer.as_str())
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_record_does_not_prompt() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        let controller = build(&storage, &gateway, MockConfirmPort::new(), silent_notifier());
        assert!(!controller.delete_record("missing"));
    }

    #[tokio::test]
    async fn test_blank_rename_is_ignored() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        let controller = build(&storage, &gateway, MockConfirmPort::new(), silent_notifier());
        let id = controller.create_record();
        let writes = storage.write_count();

        controller.rename_record(&id, "   ");
        assert_eq!(
            controller.snapshot().record(&id).unwrap().title,
            crate::domain::models::DEFAULT_RECORD_TITLE
        );
        assert_eq!(storage.write_count(), writes);
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let storage = MockStorage::new();
        let gateway = MockGateway::new();
        gateway.push_reply("corrected");
        let controller = build(&storage, &gateway, MockConfirmPort::new(), silent_notifier());

        for n in 0..3 {
            let id = controller.create_record();
            controller.rename_record(&id, &format!("Meeting {}", n));
            controller.update_transcript(&format!("transcript {}", n));
        }
        controller.update_metadata(MetadataField::Terminology, "OKR");
        assert_eq!(controller.correct().await, RequestOutcome::Completed);

        let reloaded = build(&storage, &MockGateway::new(), MockConfirmPort::new(), silent_notifier());
        assert_eq!(reloaded.snapshot().records, controller.snapshot().records);
        assert_eq!(reloaded.snapshot().records.len(), 3);
        assert!(reloaded.snapshot().active_record_id.is_none());
    }

    #[tokio::test]
    async fn test_legacy_blob_gets_empty_history() {
        let blob = r#"[{
            "id": "1700000000000",
            "title": "Legacy",
            "createdAt": 1700000000000,
            "rawTranscript": "raw",
            "metadata": {"subject": "", "keywords": "", "speakers": "", "terminology": "", "length": ""},
            "insights": {}
        }]"#;
        let storage = MockStorage::with_blob(STORAGE_KEY, blob);
        let controller = build(&storage, &MockGateway::new(), MockConfirmPort::new(), silent_notifier());

        let state = controller.snapshot();
        assert_eq!(state.records.len(), 1);
        assert!(state.records[0].insights_history.is_empty());
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_blob_starts_empty() {
        let storage = MockStorage::with_blob(STORAGE_KEY, "{not json");
        let controller = build(&storage, &MockGateway::new(), MockConfirmPort::new(), silent_notifier());
        assert!(controller.snapshot().records.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_block_edits() {
        let storage = MockStorage::new();
        storage.set_fail_writes(true);
        let controller = build(&storage, &MockGateway::new(), MockConfirmPort::new(), silent_notifier());

        let id = controller.create_record();
        controller.update_transcript("still here");
        assert_eq!(
            controller.snapshot().record(&id).unwrap().raw_transcript,
            "still here"
        );
        assert!(storage.blob(STORAGE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let storage = MockStorage::new();
        let controller = InsightController::new(
            Arc::new(storage.clone()),
            Arc::new(MockGateway::new()),
            Arc::new(MockConfirmPort::new()),
            Arc::new(silent_notifier()),
        )
        .with_storage_key("other");
        controller.create_record();

        assert!(storage.blob("other").is_some());
        assert!(storage.blob(STORAGE_KEY).is_none());
    }
}
