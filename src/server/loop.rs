// Server loop module
// Accepts connections until shutdown is signalled, then drains

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use super::shutdown::drain_connections;
use crate::config;
use crate::logger;

/// Configuration for server loop behavior
pub struct ServerLoopConfig {
    /// Notified once to stop accepting and drain
    pub shutdown_signal: Arc<Notify>,
    /// How long to wait for in-flight connections after shutdown
    pub drain_timeout: Duration,
}

/// Accept connections until `shutdown_signal` fires.
///
/// Each accepted connection is served on its own task. On shutdown the
/// listener is dropped first, then in-flight connections get up to
/// `drain_timeout` to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    config: ServerLoopConfig,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = config.shutdown_signal.notified() => {
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections, config.drain_timeout).await;
}
