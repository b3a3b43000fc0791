//! Titanic Survival API Server
//!
//! Serves the logistic survival model over HTTP.
//!
//! # Routes
//!
//! ```text
//! GET  /          liveness message
//! GET  /healthz   {"status": "ok", "model_loaded": bool}
//! POST /predict   Passenger JSON, optional ?confidence=<0..1>
//! ```
//!
//! The model bundle is loaded once before the listener opens and shared
//! read-only across handlers. A bundle that fails to load leaves the
//! server up with `model_loaded: false`.

mod config;
mod error;
mod handlers;
mod models;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use titanic_core::{load_or_unavailable, ModelBundle};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so RUST_LOG can come from it
    dotenvy::dotenv().ok();

    // Initialize logging
    let fmt_layer = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt::layer().json().boxed(),
        _ => tracing_subscriber::fmt::layer().boxed(),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "titanic_api=debug,titanic_core=info,tower_http=debug".into()))
        .with(fmt_layer)
        .init();

    // Load configuration
    let config = config::Config::from_env();

    tracing::info!("Titanic API starting...");

    // Load model bundle (lenient)
    let bundle = load_or_unavailable(&config.model_path, config.default_threshold);
    if bundle.is_loaded() {
        tracing::info!("Model ready, threshold={}", bundle.threshold().value());
    } else {
        tracing::warn!("No model loaded from {}, /predict will answer 500", config.model_path.display());
    }

    // Build application state
    let state = AppState {
        bundle: Arc::new(bundle),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::home))
        .route("/healthz", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
