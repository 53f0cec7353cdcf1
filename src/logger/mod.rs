//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("User form server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("  - create + render: {}", config.routes.create_path));
    write_info(&format!(
        "  - create + redirect: {} -> {}",
        config.routes.add_path, config.routes.render_path
    ));
    if config.routes.health.enabled {
        write_info(&format!(
            "  - health: {} {}",
            config.routes.health.liveness_path, config.routes.health.readiness_path
        ));
    }
    write_info(&format!("Template: {}", config.template.path));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_database_connected(url: &str, max_connections: u32) {
    write_info(&format!(
        "[Database] Connected to {url} (max connections: {max_connections})"
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown_started(active_connections: usize) {
    write_info(&format!(
        "\n[Shutdown] Stopped accepting connections, {active_connections} still active"
    ));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections closed");
    } else {
        write_error(&format!(
            "[WARN] [Shutdown] Timed out with {remaining} connections still open"
        ));
    }
}

/// HTTP version as it appears in a request line (`1.1`, `2`)
pub fn format_version(version: hyper::Version) -> String {
    let text = if version == hyper::Version::HTTP_09 {
        "0.9"
    } else if version == hyper::Version::HTTP_10 {
        "1.0"
    } else if version == hyper::Version::HTTP_2 {
        "2"
    } else if version == hyper::Version::HTTP_3 {
        "3"
    } else {
        "1.1"
    };
    text.to_string()
}
