//! # TUI Event Handling
//!
//! Keyboard input, tick events, and results of background provider and
//! archive calls, all funnelled through one channel.

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::SoulError;
use crate::tui::Screen;

/// TUI events
#[derive(Debug)]
pub enum Event {
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick for periodic updates
    Tick,
    /// Provider finished a request
    Reply {
        request_id: Uuid,
        outcome: Result<String, SoulError>,
    },
    /// Archive call finished
    Saved(bool),
}

/// Event handler that combines keyboard, tick, and background events
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a new event handler. The sender is for background tasks.
    pub fn new(tick_rate: Duration) -> (Self, mpsc::UnboundedSender<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let key_tx = tx.clone();
        std::thread::spawn(move || loop {
            if event::poll(tick_rate).unwrap_or(false) {
                let forwarded = match event::read() {
                    Ok(CrosstermEvent::Key(key)) => key_tx.send(Event::Key(key)),
                    Ok(CrosstermEvent::Resize(w, h)) => key_tx.send(Event::Resize(w, h)),
                    _ => Ok(()),
                };
                if forwarded.is_err() {
                    break;
                }
            } else if key_tx.send(Event::Tick).is_err() {
                break;
            }
        });

        (EventHandler { rx }, tx)
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key action result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    SwitchScreen(Screen),
    Up,
    Down,
    Left,
    Right,
    /// Enter in normal mode
    Select,
    Back,
    StartInput,
    SubmitInput,
    CancelInput,
    Char(char),
    Backspace,
    Reset,
    Save,
    /// Apply the persona form
    Apply,
}

/// Map a key event to an action
pub fn map_key_event(key: KeyEvent, in_edit_mode: bool) -> KeyAction {
    if in_edit_mode {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
            (KeyCode::Esc, _) => KeyAction::CancelInput,
            (KeyCode::Enter, _) => KeyAction::SubmitInput,
            (KeyCode::Backspace, _) => KeyAction::Backspace,
            (KeyCode::Char(c), _) => KeyAction::Char(c),
            _ => KeyAction::None,
        }
    } else {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,

            (KeyCode::Char('1'), KeyModifiers::NONE) => KeyAction::SwitchScreen(Screen::Chat),
            (KeyCode::Char('2'), KeyModifiers::NONE) => KeyAction::SwitchScreen(Screen::Persona),
            (KeyCode::Char('?'), _) => KeyAction::SwitchScreen(Screen::Help),

            (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Up,
            (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Down,
            (KeyCode::Left, _) | (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::Left,
            (KeyCode::Right, _) | (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::Right,
            (KeyCode::Enter, _) => KeyAction::Select,
            (KeyCode::Esc, _) => KeyAction::Back,

            (KeyCode::Char('i'), KeyModifiers::NONE) => KeyAction::StartInput,
            (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Reset,
            (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::Save,
            (KeyCode::Char('a'), KeyModifiers::NONE) => KeyAction::Apply,

            _ => KeyAction::None,
        }
    }
}
