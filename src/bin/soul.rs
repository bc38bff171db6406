//! # SOUL
//!
//! Line-based chat with a persona. Commands: `/reset`, `/save`, `/quit`.
//!
//! Usage: `cargo run --bin soul` (add `--features form` for the interactive
//! persona form)

use anyhow::Result;
use log::{error, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use soul::core::Config;
use soul::features::archive::MemoryArchive;
use soul::features::chat::ChatSession;
use soul::features::models::resolve_session_model;
use soul::features::personas::PersonaConfig;
use soul::providers::{build_generator, TextGenerator};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    // Environment writes happen before the runtime spawns any threads
    config.export_provider_env();

    tokio::runtime::Runtime::new()?.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    info!("Starting SOUL with provider {}", config.provider);

    let generator = match build_generator(&config) {
        Ok(generator) => generator,
        Err(e) => {
            error!("Cannot start a session: {e}");
            return Err(e.into());
        }
    };

    let persona = choose_persona(&config)?;
    let model =
        resolve_session_model(generator.as_ref(), config.model_override.as_deref()).await?;
    let mut session = config.new_session(persona, model);
    let archive = MemoryArchive::from_config(&config);

    let name = session.persona().effective_name().to_string();
    println!(
        "Talking with {name} (a digital memory) on {}. /reset, /save, /quit.",
        session.model()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset();
                println!("(conversation cleared)");
            }
            "/save" => {
                if archive.save_last_message(&session).await {
                    println!("(last message saved)");
                } else {
                    println!("(could not save the last message, see the log)");
                }
            }
            input => chat_once(&mut session, generator.as_ref(), input, &name).await,
        }
    }

    info!("Session {} ended with {} turns", session.id(), session.transcript().len());
    Ok(())
}

async fn chat_once(session: &mut ChatSession, generator: &dyn TextGenerator, input: &str, name: &str) {
    match session.send(generator, input).await {
        Ok(turn) => println!("{name}> {}\n", turn.content()),
        Err(e) if !e.is_recoverable() => {
            println!("(authentication failed: {}; check your API key)", e.detail())
        }
        Err(e) => println!("(no reply: {})", e.detail()),
    }
}

#[cfg(not(feature = "form"))]
fn choose_persona(config: &Config) -> Result<PersonaConfig> {
    Ok(config.persona.clone())
}

#[cfg(feature = "form")]
fn choose_persona(config: &Config) -> Result<PersonaConfig> {
    use dialoguer::{Input, MultiSelect, Select};
    use soul::features::personas::choices::{
        relationship_index, DEFAULT_TRAIT_CHOICES, RELATIONSHIP_CHOICES, TRAIT_CHOICES,
    };
    use soul::features::personas::Relationship;

    let defaults = &config.persona;

    let name: String = Input::new()
        .with_prompt("Their name")
        .default(defaults.display_name().to_string())
        .interact_text()?;

    let labels: Vec<&str> = RELATIONSHIP_CHOICES.iter().map(|(label, _)| *label).collect();
    let picked = Select::new()
        .with_prompt("They were your")
        .items(&labels)
        .default(relationship_index(defaults.relationship()).unwrap_or(0))
        .interact()?;

    let preselected: Vec<bool> = TRAIT_CHOICES
        .iter()
        .map(|t| DEFAULT_TRAIT_CHOICES.contains(t))
        .collect();
    let traits = MultiSelect::new()
        .with_prompt("Their personality (space to toggle)")
        .items(TRAIT_CHOICES)
        .defaults(&preselected)
        .interact()?;

    let sample: String = Input::new()
        .with_prompt("Something they used to say")
        .default(defaults.speech_sample().to_string())
        .allow_empty(true)
        .interact_text()?;

    Ok(PersonaConfig::new(name, Relationship::parse(RELATIONSHIP_CHOICES[picked].1))
        .with_traits(traits.into_iter().map(|i| TRAIT_CHOICES[i]))
        .with_speech_sample(sample))
}
