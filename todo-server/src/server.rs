//! Router assembly and the HTTP listener.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};
use crate::store::TodoStore;

/// Builds the application router over the given state.
///
/// Cross-origin requests are allowed from anywhere so a browser front end on
/// another port can call the API.
pub fn router<S: TodoStore>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/todos",
            get(handlers::list_todos::<S>).post(handlers::create_todo::<S>),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo::<S>)
                .put(handlers::update_todo::<S>)
                .delete(handlers::delete_todo::<S>),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds `addr` and serves the API until the process exits.
///
/// Passing port 0 lets the OS pick a port; the bound address is returned.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server<S: TodoStore>(
    addr: &str,
    state: Arc<AppState<S>>,
) -> std::io::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    start_server_with_shutdown(addr, state, std::future::pending()).await
}

/// Like [`start_server`], but stops accepting connections once `signal`
/// resolves and lets in-flight requests finish.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_shutdown<S, F>(
    addr: &str,
    state: Arc<AppState<S>>,
    signal: F,
) -> std::io::Result<(SocketAddr, tokio::task::JoinHandle<()>)>
where
    S: TodoStore,
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
        {
            tracing::error!(error = %e, "todo server error");
        }
    });

    Ok((bound_addr, handle))
}
