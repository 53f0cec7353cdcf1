// Application state module
// Read-only state shared by every connection

use super::types::Config;
use crate::handler::Router;

/// Application state
///
/// Built once before the listener starts; never mutated afterwards, so it is
/// shared across connections behind an `Arc` without locks.
pub struct AppState {
    pub config: Config,
    pub router: Router,
}

impl AppState {
    pub const fn new(config: Config, router: Router) -> Self {
        Self { config, router }
    }

    /// Whether access logging is enabled
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
