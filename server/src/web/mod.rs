use axum::{
    Router,
    routing::{get, post},
};
use http::HeaderValue;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio::time::Duration as TokioDuration;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::compression::CompressionLevel;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::error::{ConfigError, Result as AppResult};
use crate::state::AppState;

pub mod error;
pub mod handlers;

pub use self::error::WebError;

fn cors_layer(server_config: &ServerConfig) -> CorsLayer {
    let cors_origins_result: Result<Vec<HeaderValue>, _> = server_config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .map_err(|e| format!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    let cors_origins = cors_origins_result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "CORS config error. Defaulting to restrictive");
        vec![]
    });

    if !cors_origins.is_empty() {
        tracing::info!(
            cors.origins.count = cors_origins.len(),
            "CORS configured with allowed origins"
        );
        CorsLayer::new()
            .allow_methods(vec![http::Method::GET, http::Method::POST])
            .allow_origin(cors_origins)
            .allow_credentials(true)
            .allow_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
    } else {
        tracing::info!("Restrictive CORS policy applied (no origins configured)");
        CorsLayer::new()
    }
}

/// Routes plus middleware. Must be called inside a tokio runtime when rate limiting is enabled.
pub fn build_router(app_state: AppState, server_config: &ServerConfig) -> AppResult<Router> {
    let mut app = Router::new()
        .route("/api/quiz/questions", get(handlers::get_questions_handler))
        .route("/api/quiz/attempt", post(handlers::save_attempt_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CompressionLayer::new()
                .quality(CompressionLevel::Default)
                .gzip(true),
        );

    let rate_limit = &server_config.rate_limit;
    if rate_limit.enabled {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_millisecond(rate_limit.per_millisecond)
                .burst_size(rate_limit.burst_size)
                .finish()
                .ok_or_else(|| {
                    ConfigError::InvalidValue("server.rate_limit is not usable".to_string())
                })?,
        );
        tracing::info!(
            rate_limit.per_ms = rate_limit.per_millisecond,
            rate_limit.burst_size = rate_limit.burst_size,
            "Rate limiter configured"
        );

        let governor_limiter = governor_conf.limiter().clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(TokioDuration::from_secs(60)).await;
                let limiter_size = governor_limiter.len();
                if limiter_size > 1_000_000 {
                    tracing::warn!(
                        rate_limiter.storage_size = limiter_size,
                        "Rate limiting storage size is large"
                    );
                }
                governor_limiter.retain_recent();
            }
        });

        app = app.layer(GovernorLayer {
            config: governor_conf,
        });
    } else {
        tracing::info!("Rate limiting disabled");
    }

    Ok(app.layer(cors_layer(server_config)))
}

pub async fn serve(listener: TcpListener, app: Router) -> AppResult<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(Into::into)
}

#[tracing::instrument(skip(app_state, server_config), fields(
    server.port = server_config.port,
    cors.origins.count = server_config.cors_origins.len()
))]
pub async fn run_server(app_state: AppState, server_config: ServerConfig) -> AppResult<()> {
    let app = build_router(app_state, &server_config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    tracing::info!(server.address = %addr, "HTTP server starting");

    serve(TcpListener::bind(addr).await?, app).await
}
