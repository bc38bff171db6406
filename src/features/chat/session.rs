//! # Chat Session
//!
//! Explicit session object owning one persona, its instruction, the resolved
//! model and the transcript. Front-ends hold it by `&mut` and drive it through
//! [`ChatSession::begin_turn`] / [`ChatSession::finish_turn`], or through
//! [`ChatSession::send`] when they can simply await the provider.
//!
//! ```text
//!            begin_turn(input)               finish_turn(outcome)
//!   Idle ─────────────────────▶ AwaitingReply ────────────────────▶ Idle
//!    ▲  appends {user, input}                 Ok  → appends {assistant, text}
//!    │                                        Err → transcript untouched
//!    └──────────── reset(): transcript cleared, back to Idle
//! ```

use log::{debug, info, warn};
use uuid::Uuid;

use super::{Transcript, Turn};
use crate::core::SoulError;
use crate::features::personas::{build_instruction, PersonaConfig};
use crate::providers::{GenerationRequest, TextGenerator};

/// Number of recent turns sent with each request
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    persona: PersonaConfig,
    instruction: String,
    model: String,
    history_window: usize,
    transcript: Transcript,
    state: SessionState,
}

impl ChatSession {
    pub fn new(persona: PersonaConfig, model: impl Into<String>) -> Self {
        let instruction = build_instruction(&persona);
        ChatSession {
            id: Uuid::new_v4(),
            persona,
            instruction,
            model: model.into(),
            history_window: DEFAULT_HISTORY_WINDOW,
            transcript: Transcript::new(),
            state: SessionState::Idle,
        }
    }

    /// Window of at least one turn, so the new user turn is always sent
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns.max(1);
        self
    }

    /// Replace the default instruction, e.g. with a `PromptBuilder` result
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.state == SessionState::AwaitingReply
    }

    /// Last stored turn, the line the archive saves
    pub fn last_message(&self) -> Option<&Turn> {
        self.transcript.last()
    }

    /// Idle → AwaitingReply. Appends the user turn and returns the request to
    /// send. Blank input or a pending reply is rejected without touching the
    /// transcript.
    pub fn begin_turn(&mut self, input: &str) -> Result<GenerationRequest, SoulError> {
        if self.is_awaiting_reply() {
            return Err(SoulError::generation(format!(
                "{} is still replying",
                self.persona.effective_name()
            )));
        }
        let content = input.trim();
        if content.is_empty() {
            return Err(SoulError::generation("message is empty"));
        }

        self.transcript.push(Turn::user(content));
        self.state = SessionState::AwaitingReply;

        Ok(GenerationRequest {
            model: self.model.clone(),
            system_instruction: self.instruction.clone(),
            turns: self.transcript.window(self.history_window).to_vec(),
        })
    }

    /// AwaitingReply → Idle. A successful, non-empty reply is appended; any
    /// failure is handed back for display. Never retries.
    pub fn finish_turn(&mut self, outcome: Result<String, SoulError>) -> Result<&Turn, SoulError> {
        if !self.is_awaiting_reply() {
            return Err(SoulError::generation("no reply is pending"));
        }
        self.state = SessionState::Idle;

        let text = outcome?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SoulError::generation("the model returned an empty reply"));
        }
        Ok(self.transcript.push(Turn::assistant(text)))
    }

    /// One full exchange: append the user turn, call the provider, store the reply
    pub async fn send<G>(&mut self, generator: &G, input: &str) -> Result<&Turn, SoulError>
    where
        G: TextGenerator + ?Sized,
    {
        let request_id = Uuid::new_v4();
        let request = self.begin_turn(input)?;
        debug!(
            "[{request_id}] Session {} | Model: {} | Sending {} turns",
            self.id,
            request.model,
            request.turns.len()
        );

        let outcome = generator.generate(&request).await;
        match &outcome {
            Ok(text) => info!("[{request_id}] Reply received | Length: {}", text.len()),
            Err(e) => warn!("[{request_id}] Generation failed: {e}"),
        }
        self.finish_turn(outcome)
    }

    /// Clear the transcript wholesale. A pending reply is abandoned.
    pub fn reset(&mut self) {
        debug!("Session {} reset | Dropping {} turns", self.id, self.transcript.len());
        self.transcript.clear();
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::features::chat::Role;
    use crate::features::personas::Relationship;
    use crate::providers::testing::ScriptedGenerator;

    fn ayah_session() -> ChatSession {
        let persona = PersonaConfig::new("Ayah", Relationship::Parent).with_traits(["wise", "caring"]);
        ChatSession::new(persona, "gemini-2.5-flash")
    }

    #[tokio::test]
    async fn test_successful_exchange_appends_two_turns() {
        let generator = ScriptedGenerator::new().reply("I'm always with you, child.");
        let mut session = ayah_session();
        let before = session.transcript().len();

        let reply = session.send(&generator, "I miss you").await.unwrap();
        assert_eq!(reply.content(), "I'm always with you, child.");

        let turns = session.transcript().turns();
        assert_eq!(turns.len(), before + 2);
        assert_eq!(turns[turns.len() - 2].role(), Role::User);
        assert_eq!(turns[turns.len() - 2].content(), "I miss you");
        assert_eq!(turns[turns.len() - 1].role(), Role::Assistant);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_failed_exchange_keeps_only_user_turn() {
        let generator = ScriptedGenerator::new()
            .reply("first")
            .fail(SoulError::generation("quota exhausted"));
        let mut session = ayah_session();
        session.send(&generator, "hello").await.unwrap();
        let before = session.transcript().len();

        let err = session.send(&generator, "are you there?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
        assert_eq!(session.transcript().len(), before + 1);
        assert_eq!(session.last_message().unwrap().content(), "are you there?");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(generator.request_count(), 2, "failures are not retried");
    }

    #[tokio::test]
    async fn test_empty_reply_counts_as_failure() {
        let generator = ScriptedGenerator::new().reply("   ");
        let mut session = ayah_session();
        assert!(session.send(&generator, "hi").await.is_err());
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_request_window_ends_in_new_user_turn() {
        let generator = ScriptedGenerator::new();
        let mut session = ayah_session();
        for i in 0..4 {
            session.send(&generator, &format!("message {i}")).await.unwrap();
        }
        session.send(&generator, "I miss you").await.unwrap();

        let request = generator.last_request().unwrap();
        assert_eq!(request.turns.len(), DEFAULT_HISTORY_WINDOW);
        assert_eq!(request.system_instruction, session.instruction());
        assert!(request.system_instruction.contains("\"Ayah\""));
        assert!(request.system_instruction.contains("wise, caring"));
        let last = request.turns.last().unwrap();
        assert_eq!(last.role(), Role::User);
        assert_eq!(last.content(), "I miss you");
        assert_eq!(request.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_short_history_sends_everything() {
        let generator = ScriptedGenerator::new();
        let mut session = ayah_session();
        session.send(&generator, "I miss you").await.unwrap();
        let request = generator.last_request().unwrap();
        assert_eq!(request.turns, vec![Turn::user("I miss you")]);
    }

    #[test]
    fn test_begin_turn_rejects_blank_and_pending() {
        let mut session = ayah_session();
        assert!(session.begin_turn("   ").is_err());
        assert!(session.transcript().is_empty());

        session.begin_turn("first").unwrap();
        assert!(session.is_awaiting_reply());
        let err = session.begin_turn("second").unwrap_err();
        assert!(err.detail().contains("still replying"));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_finish_turn_without_pending_reply() {
        let mut session = ayah_session();
        assert!(session.finish_turn(Ok("stray".to_string())).is_err());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_split_turn_matches_send() {
        let mut session = ayah_session();
        let request = session.begin_turn("I miss you").unwrap();
        assert_eq!(request.turns.len(), 1);
        let reply = session.finish_turn(Ok(" Sabar ya nak. ".to_string())).unwrap();
        assert_eq!(reply.content(), "Sabar ya nak.");
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_clears_any_length() {
        let generator = ScriptedGenerator::new();
        let mut session = ayah_session();
        for i in 0..3 {
            session.send(&generator, &format!("m{i}")).await.unwrap();
        }
        session.begin_turn("pending").unwrap();
        session.reset();
        assert_eq!(session.transcript().len(), 0);
        assert_eq!(session.state(), SessionState::Idle);

        session.reset();
        assert_eq!(session.transcript().len(), 0);
    }

    #[test]
    fn test_history_window_minimum() {
        let session = ayah_session().with_history_window(0);
        assert_eq!(session.history_window(), 1);
    }
}
