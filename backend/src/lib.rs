//! FitCoach web backend.
//!
//! Sits between the coaching web app and the external coaching backend:
//! guards page routes by session presence, issues the session cookie on
//! login, keeps a per-session cache of backend resources that is refreshed
//! after mutations, and hosts server-side drafts for multi-stage forms.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod forms;
pub mod middleware;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use fitcoach_adapters::Envelope;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config::Config;
use errors::AppError;
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .merge(auth::routes::auth_router())
        .merge(api::resource::routes::resource_router())
        .merge(api::drafts::routes::drafts_router())
        .fallback(not_found)
        .layer(from_fn(auth::middleware::route_guard))
        .layer(from_fn(middleware::request_tracing))
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn start_server() -> Result<(), AppError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading configuration...");
    let config = Config::load()?;
    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::from_config(config);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn root_handler() -> &'static str {
    "Welcome to FitCoach!"
}

async fn not_found(request: Request) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::failure(404, format!("No route for {}", request.uri().path()))),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
