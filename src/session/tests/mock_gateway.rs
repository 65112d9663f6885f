use crate::ai::gateway::ModelGateway;
use crate::llm::error::GatewayError;
use crate::llm::provider::{GenerateRequest, ModelBackend};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

// ── Scripted backend double ─────────────────────────────────

#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Fail,
}

/// Backend that plays back a fixed script and records every request.
/// An exhausted script fails like an empty response.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<GenerateRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Step::Reply(r.to_string())).collect())
    }

    pub fn failing() -> Arc<Self> {
        Self::new(vec![Step::Fail])
    }

    /// Every call blocks until a permit is added to the returned semaphore.
    pub fn gated(replies: &[&str]) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let backend = Arc::new(Self {
            script: Mutex::new(replies.iter().map(|r| Step::Reply(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
            gate: Some(gate.clone()),
        });
        (backend, gate)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(raw)) => Ok(raw),
            Some(Step::Fail) => Err(GatewayError::status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                "scripted failure",
            )),
            None => Err(GatewayError::EmptyResponse),
        }
    }

    fn id(&self) -> &str {
        "scripted"
    }
}

pub fn gateway_for(backend: Arc<ScriptedBackend>) -> Arc<ModelGateway> {
    Arc::new(ModelGateway::new(backend))
}

pub fn reply(text: &str, emotion: &str) -> String {
    serde_json::json!({ "text": text, "emotion": emotion }).to_string()
}
