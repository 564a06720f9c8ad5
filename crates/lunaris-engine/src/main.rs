//! Sweep worker binary for the Lunaris game engine.
//!
//! This is the main entry point that wires the game service to
//! `PostgreSQL` and NATS and then runs the completion sweep on a fixed
//! interval until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `lunaris-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and run migrations
//! 4. Connect to NATS for event publishing (falls back to log-only)
//! 5. Run the sweep loop until Ctrl-C

mod error;
mod nats_sink;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lunaris_core::{EventSink, Game, GameConfig, GameStore, SystemClock, TracingSink};
use lunaris_core::config::LoggingConfig;
use lunaris_db::{PgStore, PostgresConfig, PostgresPool};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::nats_sink::NatsSink;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "lunaris-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step fails. Errors inside a
/// sweep are logged and the loop continues.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        universe_speed = config.universe.speed,
        galaxies = config.universe.galaxies,
        systems = config.universe.systems,
        positions = config.universe.positions,
        sweep_interval_ms = config.sweep.interval_ms,
        "lunaris-engine starting"
    );

    // 3. Connect to PostgreSQL.
    let pg_config = PostgresConfig::new(&config.infrastructure.postgres_url)
        .with_max_connections(config.infrastructure.postgres_max_connections);
    let pool = PostgresPool::connect(&pg_config)
        .await
        .map_err(EngineError::from)?;
    pool.run_migrations().await.map_err(EngineError::from)?;
    let store = PgStore::new(&pool);

    // 4. Connect to NATS.
    let nats_url = &config.infrastructure.nats_url;
    let sink: Arc<dyn EventSink> = match NatsSink::connect(nats_url).await {
        Ok(sink) => {
            info!(nats_url, "Publishing game events to NATS");
            Arc::new(sink)
        }
        Err(e) => {
            warn!(
                nats_url,
                error = %e,
                "failed to connect to NATS, game events will only be logged"
            );
            Arc::new(TracingSink)
        }
    };

    let interval = Duration::from_millis(config.sweep.interval_ms);
    let game = Game::new(store, SystemClock, sink, config).map_err(EngineError::from)?;

    // 5. Sweep until interrupted.
    run_sweeps(&game, interval).await;

    pool.close().await;
    info!("lunaris-engine shutdown complete");
    Ok(())
}

/// Run [`Game::sweep_completions`] every `interval` until Ctrl-C.
async fn run_sweeps<S: GameStore>(game: &Game<S, SystemClock>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = game.sweep_completions().await {
                    error!(error = %e, "Sweep failed");
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for Ctrl-C, stopping");
                }
                info!("Shutdown requested");
                break;
            }
        }
    }
}

/// Load configuration from the first CLI argument or `lunaris-config.yaml`.
///
/// A missing default file yields the built-in defaults (with environment
/// overrides applied); a missing explicit path is an error.
fn load_config() -> Result<GameConfig, EngineError> {
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        return Ok(GameConfig::from_file(&path)?);
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        Ok(GameConfig::from_file(default_path)?)
    } else {
        Ok(GameConfig::parse("{}")?)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
