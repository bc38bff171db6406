//! # TUI Application Core
//!
//! Main application state and screen navigation. The app owns the chat
//! session; provider calls run elsewhere and come back as events.

use uuid::Uuid;

use crate::core::{Config, SoulError};
use crate::features::chat::ChatSession;
use crate::features::personas::choices::{
    cycle_relationship, relationship_index, RELATIONSHIP_CHOICES,
};
use crate::features::personas::{PersonaConfig, Relationship};
use crate::providers::GenerationRequest;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Ticks a status notification stays on screen
const STATUS_TICKS: u8 = 16;

/// Available screens in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Persona,
    Help,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Chat => "Chat",
            Screen::Persona => "Persona",
            Screen::Help => "Help",
        }
    }

    pub fn key(&self) -> char {
        match self {
            Screen::Chat => '1',
            Screen::Persona => '2',
            Screen::Help => '?',
        }
    }

    pub fn all() -> &'static [Screen] {
        &[Screen::Chat, Screen::Persona, Screen::Help]
    }
}

/// Input mode for text entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaField {
    Name,
    Relationship,
    Traits,
    SpeechSample,
}

impl PersonaField {
    pub fn all() -> &'static [PersonaField] {
        &[
            PersonaField::Name,
            PersonaField::Relationship,
            PersonaField::Traits,
            PersonaField::SpeechSample,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonaField::Name => "Name",
            PersonaField::Relationship => "Relationship",
            PersonaField::Traits => "Traits (comma separated)",
            PersonaField::SpeechSample => "Speech sample",
        }
    }

    fn position(&self) -> usize {
        Self::all().iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> PersonaField {
        Self::all()[(self.position() + 1) % Self::all().len()]
    }

    pub fn prev(&self) -> PersonaField {
        let len = Self::all().len();
        Self::all()[(self.position() + len - 1) % len]
    }
}

/// Editable copy of the persona; applied as a whole
#[derive(Debug, Clone)]
pub struct PersonaForm {
    pub selected: PersonaField,
    pub name: String,
    pub relationship: Relationship,
    pub traits: String,
    pub speech_sample: String,
}

impl PersonaForm {
    pub fn from_persona(persona: &PersonaConfig) -> Self {
        PersonaForm {
            selected: PersonaField::Name,
            name: persona.display_name().to_string(),
            relationship: persona.relationship().clone(),
            traits: persona.traits().join(", "),
            speech_sample: persona.speech_sample().to_string(),
        }
    }

    pub fn to_persona(&self) -> PersonaConfig {
        PersonaConfig::new(self.name.clone(), self.relationship.clone())
            .with_trait_list(&self.traits)
            .with_speech_sample(self.speech_sample.clone())
    }

    pub fn value(&self, field: PersonaField) -> String {
        match field {
            PersonaField::Name => self.name.clone(),
            PersonaField::Relationship => self.relationship.label().to_string(),
            PersonaField::Traits => self.traits.clone(),
            PersonaField::SpeechSample => self.speech_sample.clone(),
        }
    }

    /// Text buffer of the selected field; relationship is not free text
    fn text_mut(&mut self) -> Option<&mut String> {
        match self.selected {
            PersonaField::Name => Some(&mut self.name),
            PersonaField::Traits => Some(&mut self.traits),
            PersonaField::SpeechSample => Some(&mut self.speech_sample),
            PersonaField::Relationship => None,
        }
    }

    pub fn is_text_field(&self) -> bool {
        self.selected != PersonaField::Relationship
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    pub fn cycle_relationship(&mut self, step: isize) {
        self.relationship = match relationship_index(&self.relationship) {
            Some(index) => cycle_relationship(index, step).1,
            None => Relationship::parse(RELATIONSHIP_CHOICES[0].1),
        };
    }
}

/// Main application state
pub struct App {
    /// Current screen
    pub current_screen: Screen,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Chat input line
    pub input_buffer: String,
    /// Live session
    pub session: ChatSession,
    /// Provider name shown in the status bar
    pub provider_label: String,
    /// Persona edits not yet applied
    pub persona_form: PersonaForm,
    /// Id of the reply the app is waiting for
    pub pending_reply: Option<Uuid>,
    /// Archive call in flight
    pub saving: bool,
    /// Error message to display
    pub error_message: Option<String>,
    /// Status message to display
    pub status_message: Option<String>,
    status_ticks: u8,
    spinner_frame: usize,
}

impl App {
    pub fn new(session: ChatSession, provider_label: impl Into<String>) -> Self {
        let persona_form = PersonaForm::from_persona(session.persona());
        App {
            current_screen: Screen::Chat,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            session,
            provider_label: provider_label.into(),
            persona_form,
            pending_reply: None,
            saving: false,
            error_message: None,
            status_message: None,
            status_ticks: 0,
            spinner_frame: 0,
        }
    }

    /// Switch to a different screen
    pub fn switch_screen(&mut self, screen: Screen) {
        self.current_screen = screen;
        self.input_mode = InputMode::Normal;
        if screen == Screen::Persona {
            self.persona_form = PersonaForm::from_persona(self.session.persona());
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending_reply.is_some()
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    /// Advance the spinner and age the transient status message
    pub fn tick(&mut self) {
        if self.is_busy() || self.saving {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
        if self.status_ticks > 0 {
            self.status_ticks -= 1;
            if self.status_ticks == 0 {
                self.status_message = None;
            }
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_ticks = STATUS_TICKS;
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Take the input line and start a turn. Returns the tagged request to
    /// hand to the provider, or `None` if the turn was rejected.
    pub fn submit_message(&mut self) -> Option<(Uuid, GenerationRequest)> {
        let input = std::mem::take(&mut self.input_buffer);
        match self.session.begin_turn(&input) {
            Ok(request) => {
                let id = Uuid::new_v4();
                self.pending_reply = Some(id);
                self.clear_error();
                Some((id, request))
            }
            Err(e) => {
                // keep what was typed so it can be retried
                self.input_buffer = input;
                self.error_message = Some(e.to_string());
                None
            }
        }
    }

    /// Apply a provider outcome. Replies for abandoned requests are dropped.
    pub fn handle_reply(&mut self, request_id: Uuid, outcome: Result<String, SoulError>) {
        if self.pending_reply != Some(request_id) {
            return;
        }
        self.pending_reply = None;
        if let Err(e) = self.session.finish_turn(outcome) {
            self.error_message = Some(e.to_string());
        }
    }

    pub fn handle_saved(&mut self, saved: bool) {
        self.saving = false;
        if saved {
            self.set_status("Last message saved to the archive");
        } else {
            self.set_status("Could not save to the archive (see log)");
        }
    }

    /// Snapshot for the archive task, unless there is nothing to save
    pub fn begin_save(&mut self) -> Option<ChatSession> {
        if self.saving {
            return None;
        }
        if self.session.last_message().is_none() {
            self.set_status("Nothing to save yet");
            return None;
        }
        self.saving = true;
        Some(self.session.clone())
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.pending_reply = None;
        self.clear_error();
        self.set_status("Conversation cleared");
    }

    /// Replace the session with one for the edited persona
    pub fn apply_persona(&mut self, config: &Config) {
        let persona = self.persona_form.to_persona();
        let model = self.session.model().to_string();
        self.session = config.new_session(persona, model);
        self.pending_reply = None;
        self.clear_error();
        self.set_status(format!(
            "Now talking with {}",
            self.session.persona().effective_name()
        ));
        self.switch_screen(Screen::Chat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Provider;

    fn app() -> App {
        App::new(ChatSession::new(PersonaConfig::default(), "test-model"), "gemini")
    }

    #[test]
    fn test_submit_and_reply() {
        let mut app = app();
        app.input_buffer = "I miss you".to_string();
        let (id, request) = app.submit_message().unwrap();
        assert!(app.is_busy());
        assert!(app.input_buffer.is_empty());
        assert_eq!(request.turns.len(), 1);

        app.handle_reply(id, Ok("I'm proud of you.".to_string()));
        assert!(!app.is_busy());
        assert_eq!(app.session.transcript().len(), 2);
    }

    #[test]
    fn test_generation_error_keeps_user_turn() {
        let mut app = app();
        app.input_buffer = "hello".to_string();
        let (id, _) = app.submit_message().unwrap();
        app.handle_reply(id, Err(SoulError::generation("quota exceeded")));
        assert_eq!(app.session.transcript().len(), 1);
        assert!(app.error_message.as_deref().unwrap().contains("quota exceeded"));
    }

    #[test]
    fn test_blank_input_rejected() {
        let mut app = app();
        app.input_buffer = "   ".to_string();
        assert!(app.submit_message().is_none());
        assert!(app.error_message.is_some());
        assert!(app.session.transcript().is_empty());
    }

    #[test]
    fn test_reply_after_reset_is_dropped() {
        let mut app = app();
        app.input_buffer = "hello".to_string();
        let (id, _) = app.submit_message().unwrap();
        app.reset();
        app.handle_reply(id, Ok("late".to_string()));
        assert!(app.session.transcript().is_empty());
        assert!(app.error_message.is_none());
    }

    #[test]
    fn test_status_expires() {
        let mut app = app();
        app.set_status("saved");
        for _ in 0..STATUS_TICKS {
            assert!(app.status_message.is_some());
            app.tick();
        }
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_save_needs_a_message() {
        let mut app = app();
        assert!(app.begin_save().is_none());
        app.input_buffer = "hi".to_string();
        app.submit_message().unwrap();
        assert!(app.begin_save().is_some());
        assert!(app.begin_save().is_none());
        app.handle_saved(true);
        assert!(!app.saving);
    }

    #[test]
    fn test_persona_form_round_trip_and_cycle() {
        let mut form = PersonaForm::from_persona(&PersonaConfig::default());
        assert_eq!(form.value(PersonaField::Traits), "wise, caring");

        // Parent is not one of the form choices, so cycling starts at the first
        form.cycle_relationship(1);
        assert_eq!(form.relationship, Relationship::Father);
        form.cycle_relationship(-1);
        assert_eq!(form.relationship, Relationship::Sibling);

        form.selected = PersonaField::Name;
        form.backspace();
        form.push_char('u');
        let persona = form.to_persona();
        assert_eq!(persona.display_name(), "Ayau");
        assert_eq!(persona.relationship(), &Relationship::Sibling);
    }

    #[test]
    fn test_apply_persona_starts_new_session() {
        let config = Config::for_tests(Provider::Gemini, Some("key"));
        let mut app = app();
        app.input_buffer = "hello".to_string();
        app.submit_message().unwrap();
        let old_id = app.session.id();

        app.switch_screen(Screen::Persona);
        app.persona_form.name = "Ibu".to_string();
        app.apply_persona(&config);

        assert_ne!(app.session.id(), old_id);
        assert!(app.session.transcript().is_empty());
        assert_eq!(app.session.model(), "test-model");
        assert_eq!(app.current_screen, Screen::Chat);
        assert!(!app.is_busy());
    }

    #[test]
    fn test_field_navigation_wraps() {
        assert_eq!(PersonaField::SpeechSample.next(), PersonaField::Name);
        assert_eq!(PersonaField::Name.prev(), PersonaField::SpeechSample);
    }
}
