//! HTTP interface for Scout.
//!
//! `POST /api/search` runs one answer turn and streams it back in the data
//! stream wire format; `GET /health` reports liveness.

pub mod error;
pub mod providers;
pub mod routes;
pub mod state;
pub mod wire;


use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use scout_core::{AppConfig, AppError, AppResult};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use providers::{ConfiguredProviders, ProviderSource};
pub use state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> AppResult<Router> {
    let cors = cors_layer(&state.allowed_origins)?;

    Ok(Router::new()
        .route("/health", get(routes::health))
        .route("/api/search", post(routes::search))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> AppResult<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([HeaderName::from_static(wire::PROTOCOL_HEADER)]);

    if allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::Config(format!("Invalid allowed origin: {}", origin)))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Run the server until it is shut down.
pub async fn serve(config: &AppConfig) -> AppResult<()> {
    let state = AppState::from_config(config)?;
    let app = build_router(state)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        provider = %config.provider,
        search = %config.search.provider,
        "Scout server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
