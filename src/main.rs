//! wordnet-server: a single-client word guessing server
//!
//! One client connects, logs in with the fixed Wordnet account and then
//! guesses the six-letter mystery word:
//! - Login dialog with a shared budget of five failed attempts
//! - Per-position feedback on each wrong guess
//! - Multi-line responses framed with an `[EOR]` marker
//! - Configuration via CLI arguments or TOML file
//!
//! The process serves exactly one connection and exits when it ends.

mod auth;
mod config;
mod game;
mod protocol;
mod server;
mod session;

use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(listen = %config.listen, "Starting wordnet server");

    // One connection at a time never needs more than one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server::run(&config));
    Ok(())
}
