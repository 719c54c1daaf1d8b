//! Todo server -- REST API over a single `todos` table.
//!
//! # Usage
//!
//! ```bash
//! # Listen on 0.0.0.0:3001 with ./todos.db
//! cargo run --bin todo-server
//!
//! # Custom address, throwaway in-memory store
//! cargo run --bin todo-server -- --bind 127.0.0.1:8080 --database-url memory
//!
//! # Or via environment variables
//! DATABASE_URL=sqlite:///tmp/todos.db?mode=rwc TODO_LOG=debug cargo run --bin todo-server
//! ```

use std::sync::Arc;

use clap::Parser;
use todo_server::config::{ServerCliArgs, ServerConfig, StoreBackend};
use todo_server::handlers::AppState;
use todo_server::server;
use todo_server::store::{MemoryStore, SqliteStore, TodoStore};

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match config.backend() {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; todos will not survive a restart");
            serve(&config.bind_addr, MemoryStore::new()).await;
        }
        StoreBackend::Sqlite(url) => {
            match SqliteStore::connect(&url, config.max_connections).await {
                Ok(store) => {
                    tracing::info!(url = %url, "connected to database");
                    serve(&config.bind_addr, store).await;
                }
                Err(e) => {
                    tracing::error!(url = %url, error = %e, "failed to open database");
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn serve<S: TodoStore>(addr: &str, store: S) {
    let state = Arc::new(AppState::new(store));

    match server::start_server_with_shutdown(addr, state, shutdown_signal()).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "todo server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "todo server task failed");
            }
            tracing::info!("todo server stopped");
        }
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to start todo server");
            std::process::exit(1);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
