//! # Application State
//!
//! The shared state handed to every handler. It is built once at startup,
//! which is where the provider client is created and its credential checked.

use lenstag_core::{Config, ConfigError, Tagger};
use std::sync::Arc;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The loaded configuration.
    pub config: Arc<Config>,
    /// The tagger wrapping the configured provider client.
    pub tagger: Arc<Tagger>,
}

impl AppState {
    /// State around an already-built tagger (used by tests to inject mocks).
    pub fn new(config: Config, tagger: Tagger) -> Self {
        Self {
            config: Arc::new(config),
            tagger: Arc::new(tagger),
        }
    }
}

/// Builds the shared application state from the configuration.
///
/// Fails when the selected provider has no API key, so the server refuses to
/// start rather than failing on the first upload.
pub fn build_app_state(config: Config) -> Result<AppState, ConfigError> {
    let tagger = Tagger::from_config(&config)?;
    Ok(AppState::new(config, tagger))
}
