//! # SOUL TUI
//!
//! Terminal chat client for talking with a persona.
//!
//! Usage: `cargo run --features tui --bin soul-tui`

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use soul::core::Config;
use soul::features::archive::MemoryArchive;
use soul::features::models::resolve_session_model;
use soul::providers::{build_generator, TextGenerator};
use soul::tui::event::{map_key_event, KeyAction};
use soul::tui::{App, Event, EventHandler, InputMode, Screen};

/// TUI refresh rate
const TICK_RATE: Duration = Duration::from_millis(120);

/// Long-lived handles the key handlers need
struct Services {
    config: Config,
    generator: Arc<dyn TextGenerator>,
    archive: Arc<MemoryArchive>,
    event_tx: UnboundedSender<Event>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging goes to stderr; keep it quiet so it does not tear the screen
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env()?;

    // Environment writes happen before the runtime spawns any threads
    config.export_provider_env();

    tokio::runtime::Runtime::new()?.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    info!("Starting SOUL TUI with provider {}", config.provider);

    // Missing credentials are fatal before the terminal is taken over
    let generator = build_generator(&config)?;
    let model =
        resolve_session_model(generator.as_ref(), config.model_override.as_deref()).await?;
    let session = config.new_session(config.persona.clone(), model);
    let archive = Arc::new(MemoryArchive::from_config(&config));

    let mut app = App::new(session, config.provider.to_string());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (mut events, event_tx) = EventHandler::new(TICK_RATE);
    let services = Services {
        config,
        generator,
        archive,
        event_tx,
    };

    let result = run_app(&mut terminal, &mut app, &mut events, &services).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!("Application error: {}", e);
        return Err(e);
    }

    info!("SOUL TUI shutdown complete");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    services: &Services,
) -> Result<()> {
    loop {
        terminal.draw(|frame| soul::tui::ui::render(frame, app))?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    let action = map_key_event(key, app.input_mode == InputMode::Editing);
                    handle_action(app, action, services);
                }
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {
                    // Terminal will redraw automatically
                }
                Event::Reply { request_id, outcome } => app.handle_reply(request_id, outcome),
                Event::Saved(saved) => app.handle_saved(saved),
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_action(app: &mut App, action: KeyAction, services: &Services) {
    match action {
        KeyAction::Quit => app.should_quit = true,
        KeyAction::SwitchScreen(screen) => app.switch_screen(screen),
        _ => match app.current_screen {
            Screen::Chat => handle_chat_action(app, action, services),
            Screen::Persona => handle_persona_action(app, action, services),
            Screen::Help => {
                if action == KeyAction::Back {
                    app.switch_screen(Screen::Chat);
                }
            }
        },
    }
}

fn handle_chat_action(app: &mut App, action: KeyAction, services: &Services) {
    match action {
        KeyAction::StartInput | KeyAction::Select => {
            app.input_mode = InputMode::Editing;
            app.clear_error();
        }
        KeyAction::CancelInput => app.input_mode = InputMode::Normal,
        KeyAction::Char(c) => app.input_buffer.push(c),
        KeyAction::Backspace => {
            app.input_buffer.pop();
        }
        KeyAction::SubmitInput => {
            if let Some((request_id, request)) = app.submit_message() {
                let generator = Arc::clone(&services.generator);
                let tx = services.event_tx.clone();
                tokio::spawn(async move {
                    let outcome = generator.generate(&request).await;
                    if tx.send(Event::Reply { request_id, outcome }).is_err() {
                        warn!("[{request_id}] Reply arrived after the UI closed");
                    }
                });
            }
        }
        KeyAction::Reset => app.reset(),
        KeyAction::Save => {
            if let Some(snapshot) = app.begin_save() {
                let archive = Arc::clone(&services.archive);
                let tx = services.event_tx.clone();
                tokio::spawn(async move {
                    let saved = archive.save_last_message(&snapshot).await;
                    let _ = tx.send(Event::Saved(saved));
                });
            }
        }
        _ => {}
    }
}

fn handle_persona_action(app: &mut App, action: KeyAction, services: &Services) {
    let form = &mut app.persona_form;
    match action {
        KeyAction::Up => form.selected = form.selected.prev(),
        KeyAction::Down => form.selected = form.selected.next(),
        KeyAction::Left => form.cycle_relationship(-1),
        KeyAction::Right => form.cycle_relationship(1),
        KeyAction::Select | KeyAction::StartInput => {
            if form.is_text_field() {
                app.input_mode = InputMode::Editing;
            } else {
                form.cycle_relationship(1);
            }
        }
        KeyAction::Char(c) => form.push_char(c),
        KeyAction::Backspace => form.backspace(),
        KeyAction::SubmitInput | KeyAction::CancelInput => app.input_mode = InputMode::Normal,
        KeyAction::Apply => app.apply_persona(&services.config),
        KeyAction::Back => app.switch_screen(Screen::Chat),
        _ => {}
    }
}
