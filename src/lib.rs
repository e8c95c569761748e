pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod prescription;
pub mod scheduling;

use tracing_subscriber::EnvFilter;

/// Initialise tracing for an embedding application.
///
/// Respects `RUST_LOG` when set, otherwise falls back to the default
/// filter from [`config`]. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
