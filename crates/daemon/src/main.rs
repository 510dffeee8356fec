//! SwipeDeck - line-oriented driver
//!
//! Reads one intent per line from stdin (SWIPE_LEFT, SWIPE_RIGHT, UNDO,
//! RESET_FILTERS, CURRENT) and writes one JSON record per line to stdout.

mod file_provider;
mod hook;
mod settings;

use anyhow::Result;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use file_provider::FileJobProvider;
use hook::LoggingSwipeHook;
use settings::Settings;
use swipedeck_core::application::{shutdown_channel, IntentOutcome, RefreshScheduler, SwipeDeckEngine};
use swipedeck_core::domain::DeckIntent;
use swipedeck_core::port::SystemTimeProvider;
use swipedeck_infra_sqlite::{create_pool, run_migrations, SqliteKvStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (stderr, so stdout stays machine-readable)
    let log_format = std::env::var("SWIPEDECK_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("swipedeck=info"))?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    info!("SwipeDeck v{} starting...", VERSION);

    // 2. Load configuration
    let settings = Settings::from_env();
    settings
        .deck
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid deck configuration: {}", e))?;
    info!(db_path = %settings.db_path, user_id = ?settings.user_id, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&settings.db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteKvStore::new(pool.clone(), time_provider.clone()));
    let provider = Arc::new(FileJobProvider::new(settings.jobs_file.clone()));
    let refresh_every = settings.deck.background_refresh_interval;

    let engine = SwipeDeckEngine::new(
        settings.user_id.clone(),
        store,
        provider,
        Arc::new(LoggingSwipeHook),
        time_provider,
        settings.deck,
    );

    // 5. Initial load, then background refresh
    engine.start();
    engine.settle().await;

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let scheduler = RefreshScheduler::new(engine.refill().clone(), refresh_every);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    info!(queued = engine.queue_len(), "Deck ready. Reading intents from stdin");
    print_current(&engine);

    // 6. Intent loop until EOF or Ctrl+C
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => handle_line(&engine, &line),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    // 7. Graceful shutdown: stop refreshing, flush pending writes
    shutdown_tx.shutdown();
    let _ = scheduler_handle.await;
    engine.settle().await;
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}

fn handle_line(engine: &SwipeDeckEngine, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if line.eq_ignore_ascii_case("CURRENT") {
        print_current(engine);
        return;
    }

    let intent = match DeckIntent::from_str(line) {
        Ok(intent) => intent,
        Err(e) => {
            warn!(input = line, error = %e, "Ignoring input");
            println!("{}", json!({ "error": e.to_string() }));
            return;
        }
    };

    let record = match engine.dispatch(intent) {
        IntentOutcome::Swiped(event) => json!({
            "intent": intent,
            "outcome": "swiped",
            "event": event,
        }),
        IntentOutcome::Undone(event) => json!({
            "intent": intent,
            "outcome": "undone",
            "event": event,
        }),
        IntentOutcome::Reset => json!({ "intent": intent, "outcome": "reset" }),
        IntentOutcome::Ignored => json!({ "intent": intent, "outcome": "ignored" }),
    };
    println!("{}", record);
    print_current(engine);
}

fn print_current(engine: &SwipeDeckEngine) {
    println!(
        "{}",
        json!({
            "current": engine.current(),
            "next": engine.peek_next(),
            "queued": engine.queue_len(),
            "undo_depth": engine.history_len(),
        })
    );
}
