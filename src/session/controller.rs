//! Session controller: start-up sequencing, submission, typing indicator,
//! death cutscene and restart.
//!
//! State machine over `NotStarted → Intro → Active`. Timed transitions are
//! queued on the scheduler and applied by `tick`. A submission is split in
//! two halves (`begin_submit` / `complete_submit`) so the gateway call can
//! run without the controller being borrowed; while it is outstanding every
//! other submission is rejected.

use crate::ai::emotion::Emotion;
use crate::ai::gateway::{ModelGateway, RalseiResponse};
use crate::ai::history::TurnHistory;
use crate::ai::mood::{self, CutsceneState, MoodController, Palette, SessionPhase};
use crate::config::TimelineConfig;
use crate::session::clock::{Clock, ScheduledEvent, Scheduler, SystemClock};
use crate::session::conversation::{ChatMessage, ConversationStore, Role};
use crate::session::events::SessionEvent;
use crate::session::language::{Language, LocaleCopy};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    /// Intro flash running; `greeting` is the language chosen at start.
    Intro { greeting: Language },
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    Intro,
    Active,
}

/// A submission waiting on the model. Carries the session's history out of
/// the controller for the duration of the call.
#[derive(Debug)]
pub struct PendingTurn {
    session_id: Uuid,
    text: String,
    language: Language,
    history: TurnHistory,
}

impl PendingTurn {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Run the gateway call. Never fails: errors come back as the fallback reply.
    pub async fn resolve(&mut self, gateway: &ModelGateway) -> RalseiResponse {
        gateway
            .send(&mut self.history, &self.text, self.language)
            .await
    }
}

/// Hands an unfinished turn back to the controller when `submit` is dropped.
struct SubmitGuard<'a> {
    controller: &'a mut SessionController,
    pending: Option<PendingTurn>,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.controller.abandon_submit(pending);
        }
    }
}

/// Read-only view handed to presentation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub language: Language,
    pub copy: LocaleCopy,
    pub messages: Vec<ChatMessage>,
    pub current_emotion: Emotion,
    pub emotion_asset: &'static str,
    pub is_typing: bool,
    pub is_intro: bool,
    pub is_dying: bool,
    pub cutscene: CutsceneState,
    pub phase: SessionPhase,
    pub palette: Palette,
}

pub struct SessionController {
    session_id: Uuid,
    state: SessionState,
    language: Language,
    store: ConversationStore,
    mood: MoodController,
    history: TurnHistory,
    awaiting: bool,
    scheduler: Scheduler,
    clock: Arc<dyn Clock>,
    timeline: TimelineConfig,
    gateway: Arc<ModelGateway>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(gateway: Arc<ModelGateway>, clock: Arc<dyn Clock>, timeline: TimelineConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let language = Language::default();
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::NotStarted,
            language,
            store: ConversationStore::new(),
            mood: MoodController::new(),
            history: TurnHistory::seeded(language),
            awaiting: false,
            scheduler: Scheduler::new(),
            clock,
            timeline,
            gateway,
            events,
        }
    }

    pub fn with_system_clock(gateway: Arc<ModelGateway>, timeline: TimelineConfig) -> Self {
        Self::new(gateway, Arc::new(SystemClock), timeline)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn gateway(&self) -> Arc<ModelGateway> {
        self.gateway.clone()
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn append(&mut self, role: Role, text: &str) {
        let message = self.store.append(role, text, self.clock.wall()).clone();
        self.emit(SessionEvent::MessageAppended { message });
    }

    fn set_typing(&mut self, typing: bool) {
        self.awaiting = typing;
        self.emit(SessionEvent::TypingChanged { typing });
    }

    // ── Start-up ───────────────────────────────────────────

    /// Leave the landing screen. Only valid before the session has started.
    pub fn start(&mut self, language: Language) -> bool {
        if self.state != SessionState::NotStarted {
            tracing::debug!(session_id = %self.session_id, "start ignored, session already running");
            return false;
        }
        if language != self.language {
            self.language = language;
            self.emit(SessionEvent::LanguageChanged { language });
        }
        self.history.reset(language);
        self.state = SessionState::Intro { greeting: language };
        self.scheduler.schedule(
            self.clock.now() + self.timeline.intro(),
            ScheduledEvent::IntroElapsed,
        );
        tracing::info!(session_id = %self.session_id, %language, "session starting");
        self.emit(SessionEvent::IntroStarted { language });
        true
    }

    /// Apply every timer that is due. Returns what fired.
    pub fn tick(&mut self) -> Vec<ScheduledEvent> {
        let fired = self.scheduler.take_due(self.clock.now());
        for event in &fired {
            match event {
                ScheduledEvent::IntroElapsed => self.finish_intro(),
                ScheduledEvent::CutsceneFadeElapsed => {
                    if self.mood.finish_cutscene() {
                        self.emit(SessionEvent::CutsceneFinished);
                    }
                }
            }
        }
        fired
    }

    fn finish_intro(&mut self) {
        let SessionState::Intro { greeting } = self.state else {
            return;
        };
        self.append(Role::Model, greeting.initial_message());
        self.state = SessionState::Active;
        tracing::info!(session_id = %self.session_id, "intro finished, session active");
        self.emit(SessionEvent::IntroFinished);
    }

    /// Flip the locale. Existing messages and the running history are left
    /// alone; the next model call uses the new language.
    pub fn toggle_language(&mut self) -> Language {
        self.language = self.language.toggle();
        if self.state == SessionState::NotStarted {
            self.history.reset(self.language);
        }
        self.emit(SessionEvent::LanguageChanged {
            language: self.language,
        });
        self.language
    }

    // ── Submission ─────────────────────────────────────────

    /// First half of a submission: validate, append the user message and
    /// mark the session as awaiting. `None` means the submission was
    /// rejected and nothing changed.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingTurn> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.state != SessionState::Active {
            tracing::debug!(session_id = %self.session_id, "submit ignored, session not active");
            return None;
        }
        if self.awaiting {
            tracing::debug!(session_id = %self.session_id, "submit rejected, reply pending");
            return None;
        }

        self.append(Role::User, text);
        self.set_typing(true);
        Some(PendingTurn {
            session_id: self.session_id,
            text: text.to_string(),
            language: self.language,
            history: std::mem::take(&mut self.history),
        })
    }

    /// Second half: store the reply and update mood in one step.
    pub fn complete_submit(&mut self, pending: PendingTurn, response: RalseiResponse) -> bool {
        if pending.session_id != self.session_id || !self.awaiting {
            tracing::warn!(session_id = %self.session_id, "dropping reply for a stale submission");
            return false;
        }
        self.history = pending.history;

        let message = self
            .store
            .append(Role::Model, response.text.as_str(), self.clock.wall())
            .clone();
        let transition = self.mood.observe(response.emotion);
        self.awaiting = false;

        self.emit(SessionEvent::TypingChanged { typing: false });
        self.emit(SessionEvent::MessageAppended { message });
        if transition.changed() {
            tracing::debug!(
                session_id = %self.session_id,
                from = %transition.previous,
                to = %transition.current,
                "emotion changed"
            );
            self.emit(SessionEvent::EmotionChanged {
                previous: transition.previous,
                current: transition.current,
            });
        }
        if transition.cutscene_started {
            tracing::info!(session_id = %self.session_id, "death cutscene started");
            self.scheduler.cancel(ScheduledEvent::CutsceneFadeElapsed);
            self.emit(SessionEvent::CutsceneStarted);
        }
        true
    }

    /// Give a pending turn back without a reply. The history (including the
    /// user turn) is restored and the session accepts input again.
    pub fn abandon_submit(&mut self, pending: PendingTurn) -> bool {
        if pending.session_id != self.session_id || !self.awaiting {
            return false;
        }
        self.history = pending.history;
        self.set_typing(false);
        tracing::warn!(session_id = %self.session_id, "submission abandoned before the reply arrived");
        true
    }

    /// Full submission for a single owner. Returns false if rejected.
    ///
    /// Dropping the returned future mid-call abandons the turn instead of
    /// leaving the session awaiting.
    pub async fn submit(&mut self, text: &str) -> bool {
        let Some(pending) = self.begin_submit(text) else {
            return false;
        };
        let gateway = self.gateway.clone();
        let mut guard = SubmitGuard {
            controller: self,
            pending: Some(pending),
        };
        let response = match guard.pending.as_mut() {
            Some(pending) => pending.resolve(&gateway).await,
            None => return false,
        };
        match guard.pending.take() {
            Some(pending) => guard.controller.complete_submit(pending, response),
            None => false,
        }
    }

    // ── Cutscene ───────────────────────────────────────────

    /// The cutscene video ended: fade the overlay out over the configured time.
    pub fn cutscene_playback_ended(&mut self) -> bool {
        if !self.mood.begin_fade() {
            return false;
        }
        self.scheduler.schedule(
            self.clock.now() + self.timeline.cutscene_fade(),
            ScheduledEvent::CutsceneFadeElapsed,
        );
        self.emit(SessionEvent::CutsceneFading);
        true
    }

    /// Clear the overlay immediately.
    pub fn finish_cutscene(&mut self) -> bool {
        self.scheduler.cancel(ScheduledEvent::CutsceneFadeElapsed);
        if self.mood.finish_cutscene() {
            self.emit(SessionEvent::CutsceneFinished);
            true
        } else {
            false
        }
    }

    // ── Restart ────────────────────────────────────────────

    /// End the session and return to the landing state. Refused while a
    /// reply is pending.
    pub fn restart(&mut self) -> bool {
        if self.awaiting {
            tracing::debug!(session_id = %self.session_id, "restart refused, reply pending");
            return false;
        }
        let previous = self.session_id;
        self.session_id = Uuid::new_v4();
        self.state = SessionState::NotStarted;
        self.store = ConversationStore::new();
        self.mood.reset();
        self.history.reset(self.language);
        self.scheduler.clear();
        tracing::info!(%previous, session_id = %self.session_id, "session reset");
        self.emit(SessionEvent::SessionReset);
        true
    }

    // ── Accessors ──────────────────────────────────────────

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::NotStarted => SessionStatus::NotStarted,
            SessionState::Intro { .. } => SessionStatus::Intro,
            SessionState::Active => SessionStatus::Active,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.store.all()
    }

    pub fn current_emotion(&self) -> Emotion {
        self.mood.current()
    }

    pub fn is_typing(&self) -> bool {
        self.awaiting
    }

    pub fn is_intro(&self) -> bool {
        matches!(self.state, SessionState::Intro { .. })
    }

    pub fn is_dying(&self) -> bool {
        self.mood.is_dying()
    }

    pub fn cutscene(&self) -> CutsceneState {
        self.mood.cutscene()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_dark_mood(&self) -> bool {
        self.mood.current().is_dark_mood()
    }

    pub fn phase(&self) -> SessionPhase {
        mood::phase(self.is_intro(), self.mood.current())
    }

    pub fn palette(&self) -> Palette {
        mood::palette(self.is_intro(), self.mood.current())
    }

    /// Deadline of the next timer, for drivers that sleep until it.
    pub fn next_deadline(&self) -> Option<std::time::Instant> {
        self.scheduler.next_deadline()
    }

    pub(crate) fn history(&self) -> &TurnHistory {
        &self.history
    }

    pub fn snapshot(&self) -> SessionView {
        let emotion = self.mood.current();
        SessionView {
            session_id: self.session_id,
            status: self.status(),
            language: self.language,
            copy: self.language.copy(),
            messages: self.store.all().to_vec(),
            current_emotion: emotion,
            emotion_asset: emotion.asset(),
            is_typing: self.awaiting,
            is_intro: self.is_intro(),
            is_dying: self.mood.is_dying(),
            cutscene: self.mood.cutscene(),
            phase: self.phase(),
            palette: self.palette(),
        }
    }
}
