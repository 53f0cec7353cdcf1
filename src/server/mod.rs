// Server module entry
// Listener setup, the accept loop, per-connection serving and shutdown

pub mod connection;
pub mod listener;
pub mod shutdown;
pub mod signal;

// Rust does not allow `loop` as a module name (keyword), use server_loop instead
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used items
pub use listener::create_reusable_listener;
pub use server_loop::{start_server_loop, ServerLoopConfig};
pub use signal::start_signal_handler;
