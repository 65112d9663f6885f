//! Chat service: the cloneable async handle presentation code drives.
//!
//! Wraps the session controller in a mutex that is never held across the
//! model call: `submit` takes a pending turn out, awaits the gateway on a
//! spawned task, then puts the reply back.

use crate::ai::gateway::ModelGateway;
use crate::config::ChatConfig;
use crate::llm::service::build_backend;
use crate::session::clock::{Clock, ScheduledEvent, SystemClock};
use crate::session::controller::{SessionController, SessionView};
use crate::session::events::SessionEvent;
use crate::session::language::Language;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct ChatService {
    controller: Arc<Mutex<SessionController>>,
    gateway: Arc<ModelGateway>,
}

impl ChatService {
    pub fn new(controller: SessionController) -> Self {
        let gateway = controller.gateway();
        Self {
            controller: Arc::new(Mutex::new(controller)),
            gateway,
        }
    }

    /// Build the backend named in `config.llm` and a session on the system clock.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &ChatConfig, clock: Arc<dyn Clock>) -> Self {
        let gateway = Arc::new(ModelGateway::new(build_backend(&config.llm)));
        tracing::info!(provider = gateway.backend_id(), "chat service ready");
        Self::new(SessionController::new(gateway, clock, config.timeline))
    }

    pub async fn start(&self, language: Language) -> bool {
        self.controller.lock().await.start(language)
    }

    /// Send one user message. Resolves once the reply (or fallback) is in
    /// the store; returns false if the submission was rejected.
    pub async fn submit(&self, text: &str) -> bool {
        let pending = self.controller.lock().await.begin_submit(text);
        let Some(mut pending) = pending else {
            return false;
        };

        let gateway = self.gateway.clone();
        let controller = self.controller.clone();
        // Spawned so that dropping the caller's future cannot strand the
        // session in the awaiting state.
        let handle = tokio::spawn(async move {
            let response = pending.resolve(&gateway).await;
            controller.lock().await.complete_submit(pending, response)
        });

        match handle.await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(error = %e, "reply task failed");
                false
            }
        }
    }

    pub async fn toggle_language(&self) -> Language {
        self.controller.lock().await.toggle_language()
    }

    pub async fn restart(&self) -> bool {
        self.controller.lock().await.restart()
    }

    pub async fn tick(&self) -> Vec<ScheduledEvent> {
        self.controller.lock().await.tick()
    }

    pub async fn cutscene_playback_ended(&self) -> bool {
        self.controller.lock().await.cutscene_playback_ended()
    }

    pub async fn finish_cutscene(&self) -> bool {
        self.controller.lock().await.finish_cutscene()
    }

    pub async fn snapshot(&self) -> SessionView {
        self.controller.lock().await.snapshot()
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.controller.lock().await.subscribe()
    }

    /// Drive timers from a tokio interval until the handle is aborted.
    pub fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                service.tick().await;
            }
        })
    }
}
