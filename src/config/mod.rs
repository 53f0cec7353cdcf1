// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use hyper::header::HeaderValue;
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, DatabaseConfig};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Layers, lowest first: built-in defaults, the optional file, then
    /// `APP_`-prefixed environment variables (`APP_DATABASE__URL`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://users.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout", 5)?
            .set_default("database.create_table", true)?
            .set_default("template.path", "static/templates/index.html")?
            .set_default("routes.create_path", "/myAddress")?
            .set_default("routes.add_path", "/addUser")?
            .set_default("routes.render_path", "/users/saved")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "user-form-server/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.expose_storage_errors", true)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject route settings the router cannot serve safely
    ///
    /// The redirect target must be its own route: the router ignores the
    /// method, so a browser following the 302 onto a saving route would
    /// insert a blank user.
    fn validate(&self) -> Result<(), config::ConfigError> {
        let routes = &self.routes;
        if routes.render_path == routes.create_path || routes.render_path == routes.add_path {
            return Err(config::ConfigError::Message(format!(
                "routes.render_path `{}` must differ from the create and add paths",
                routes.render_path
            )));
        }
        if HeaderValue::from_str(&routes.render_path).is_err() {
            return Err(config::ConfigError::Message(format!(
                "routes.render_path `{}` is not a valid Location header value",
                routes.render_path
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
