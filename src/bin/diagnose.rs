//! Deployment diagnostics
//!
//! `models` lists what the API key can see and pings each candidate until one
//! answers. `storage` walks the spreadsheet archive setup step by step.
//! With no argument both run.
//!
//! Usage: cargo run --bin soul-diagnose -- [models|storage]

use anyhow::{bail, Result};
use log::info;

use soul::core::Config;
use soul::features::diagnostics::{check_storage, diagnose_models, StorageReport};
use soul::providers::build_generator;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env()?;
    config.export_provider_env();

    let which = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let ok = tokio::runtime::Runtime::new()?.block_on(run(&config, &which))?;

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(config: &Config, which: &str) -> Result<bool> {
    let ok = match which {
        "models" => run_models(config).await,
        "storage" => run_storage(config).await,
        "all" => {
            let models = run_models(config).await;
            println!();
            let storage = run_storage(config).await;
            models && storage
        }
        other => bail!("unknown check '{other}' (expected models, storage, or nothing)"),
    };
    Ok(ok)
}

async fn run_models(config: &Config) -> bool {
    println!("--- Model check ({}) ---", config.provider);

    let generator = match build_generator(config) {
        Ok(generator) => generator,
        Err(e) => {
            println!("✗ {e}");
            return false;
        }
    };

    let diagnosis = match diagnose_models(generator.as_ref()).await {
        Ok(diagnosis) => diagnosis,
        Err(e) => {
            println!("✗ Could not list models: {e}");
            return false;
        }
    };

    println!(
        "Key can see {} models, {} of them can generate text",
        diagnosis.listed.len(),
        diagnosis.generation_capable()
    );

    for attempt in &diagnosis.probe.attempts {
        match &attempt.outcome {
            Ok(reply) => println!("✓ {} answered: {}", attempt.model, reply.trim()),
            Err(e) => println!("✗ {}: {e}", attempt.model),
        }
    }

    match diagnosis.probe.working_model() {
        Some(model) => {
            println!("Use SOUL_MODEL={model}");
            true
        }
        None => {
            println!("No model answered. Check billing and API restrictions for this key.");
            false
        }
    }
}

async fn run_storage(config: &Config) -> bool {
    println!("--- Storage check ('{}') ---", config.sheet_name);
    let report = check_storage(config).await;
    print_storage_report(&report);
    info!("Storage check passed: {}", report.passed());
    report.passed()
}

fn print_storage_report(report: &StorageReport) {
    for outcome in &report.steps {
        match &outcome.result {
            Ok(detail) => println!("✓ {}: {detail}", outcome.step),
            Err(e) => println!("✗ {}: {e}", outcome.step),
        }
    }
    if let Some(step) = report.failed_step() {
        println!("Stopped at '{step}'.");
    } else if report.passed() {
        println!("Test row written. Check the spreadsheet.");
    }
}
