use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

mod config;
mod controller;
mod handler;
mod http;
mod logger;
mod model;
mod server;
mod storage;
mod view;

use storage::{Database, SqlGateway};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing worker threads from config when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Startup failures below are fatal: nothing is served until all succeed
    let view = view::HtmlView::from_file(&cfg.template.path)?;

    let gateway = Arc::new(SqlGateway::connect(&cfg.database).await?);
    logger::log_database_connected(&cfg.database.url, cfg.database.max_connections);

    if cfg.database.create_table {
        model::User::create_table(gateway.as_ref()).await?;
    }

    let db: Arc<dyn Database> = gateway.clone();
    let router = controller::build_router(&cfg, db, Arc::new(view));

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let drain_timeout = Duration::from_secs(cfg.performance.shutdown_timeout);
    let state = Arc::new(config::AppState::new(cfg, router));

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    server::start_server_loop(
        listener,
        state,
        server::ServerLoopConfig {
            shutdown_signal: shutdown,
            drain_timeout,
        },
    )
    .await;

    gateway.close().await;
    logger::log_info("Database pool closed, exiting");
    Ok(())
}
