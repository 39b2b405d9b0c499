//! DFA State Visualizer
//!
//! Deterministic finite automata declared as data, with tooling to run and inspect them.
//!
//! This library provides functionality for:
//! - Building wired state graphs from named, possibly circular state declarations
//! - Running words through the resulting automata
//! - Breadth-first introspection and layered layout of state graphs
//! - Loading machines from a built-in registry or TOML/JSON declaration files
//! - Visualizing machines in an interactive TUI

pub mod cli;
pub mod config;
pub mod error;
pub mod source;
pub mod state_machine;
pub mod tui;

pub use config::Config;
pub use error::{Error, Result};

use config::LoggingConfig;
use std::sync::Mutex;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging from the logging configuration.
///
/// `RUST_LOG` overrides the configured level. Logs go to the configured file
/// when there is one, otherwise to stderr unless `interactive` is set (a TUI owns
/// the terminal, so stray log lines would corrupt it).
pub fn init_logging(logging: &LoggingConfig, interactive: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };
    let stderr_layer = (file_layer.is_none() && !interactive)
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))
}
