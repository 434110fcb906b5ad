use axum::{
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use crate::storage::StudentGateway;

pub mod routes;

/// Server state
pub struct AppState {
    pub gateway: Arc<dyn StudentGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn StudentGateway>) -> Self {
        Self { gateway }
    }
}

/// Host-level options layered around the student routes
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Allow any origin, method and header
    pub cors: bool,
    /// Static display client served for unmatched paths
    pub ui_dir: Option<PathBuf>,
}

/// The five student routes, without host layers
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/students",
            get(routes::list_students).post(routes::create_student),
        )
        .route(
            "/students/{id}",
            get(routes::get_student)
                .put(routes::update_student)
                .delete(routes::delete_student),
        )
        .with_state(state)
}

/// Student routes plus CORS, request tracing and the optional static client
pub fn app(state: Arc<AppState>, options: &ServeOptions) -> Router {
    let mut app = router(state);

    if let Some(dir) = &options.ui_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    if options.cors {
        app = app.layer(CorsLayer::permissive());
    }

    app.layer(TraceLayer::new_for_http())
}

pub async fn start_server(addr: SocketAddr, state: Arc<AppState>, options: ServeOptions) -> anyhow::Result<()> {
    let app = app(state, &options);

    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
