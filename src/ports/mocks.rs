//! Mock implementations for testing

use crate::domain::models::{ChatMessage, MeetingMetadata};
use crate::error::{AppError, Result};
use crate::ports::llm::AnalysisGatewayPort;
use crate::ports::storage::BlobStorePort;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Mock blob store (in-memory)
#[derive(Clone, Default)]
pub struct MockStorage {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<Mutex<usize>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `value` under `key`
    pub fn with_blob(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        storage
    }

    pub fn blob(&self, key: &str) -> Option<String> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

impl BlobStorePort for MockStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

/// A request received by [`MockGateway`]
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Correct {
        transcript: String,
        metadata: MeetingMetadata,
    },
    Analyze {
        transcript: String,
        module_prompt: String,
        history: Vec<ChatMessage>,
    },
}

/// Mock gateway answering from a script of queued results
///
/// When gated, every call waits for one `notify_one` on the gate before
/// answering, which keeps a request in flight for as long as a test needs.
#[derive(Clone, Default)]
pub struct MockGateway {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    gate: Option<Arc<Notify>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn push_reply(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(AppError::Llm(message.to_string())));
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, call: GatewayCall) -> Result<String> {
        self.calls.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Llm("no scripted response".to_string())))
    }
}

#[async_trait]
impl AnalysisGatewayPort for MockGateway {
    async fn correct_transcript(
        &self,
        transcript: &str,
        metadata: &MeetingMetadata,
    ) -> Result<String> {
        self.answer(GatewayCall::Correct {
            transcript: transcript.to_string(),
            metadata: metadata.clone(),
        })
        .await
    }

    async fn analyze_transcript(
        &self,
        transcript: &str,
        module_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String> {
        self.answer(GatewayCall::Analyze {
            transcript: transcript.to_string(),
            module_prompt: module_prompt.to_string(),
            history: history.to_vec(),
        })
        .await
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        true
    }
}
