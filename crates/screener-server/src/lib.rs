pub mod body_logging;
pub mod config;
pub mod openapi;
pub mod request_id;
pub mod screening_routes;
pub mod watchlist_routes;


use anyhow::Context;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use market_data::{AlphaVantageClient, StaticFactsProvider};
use ratio_engine::RatioEngine;
use screener_core::{FactsProvider, ScreenerError, ScreeningConfig};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn FactsProvider>,
    pub engine: RatioEngine,
    pub default_periods: u32,
    pub log_requests: bool,
    pub log_responses: bool,
}

impl AppState {
    pub fn new(provider: Arc<dyn FactsProvider>, engine: RatioEngine, default_periods: u32) -> Self {
        Self {
            provider,
            engine,
            default_periods,
            log_requests: false,
            log_responses: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error rendered as a JSON `ApiResponse` with `success: false`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!("{}", message))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ScreenerError> for AppError {
    fn from(e: ScreenerError) -> Self {
        let status = match &e {
            ScreenerError::Provider(_) => StatusCode::BAD_GATEWAY,
            ScreenerError::InvalidFacts(_)
            | ScreenerError::Domain(_)
            | ScreenerError::MissingFact(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScreenerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::with_status(status, e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}: {:#}", self.status, self.error);
        } else {
            tracing::warn!("{}: {:#}", self.status, self.error);
        }
        let body = ApiResponse::<()>::error(format!("{:#}", self.error));
        (self.status, Json(body)).into_response()
    }
}

async fn health() -> &'static str {
    "OK"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(screening_routes::screening_routes())
        .merge(watchlist_routes::watchlist_routes())
        .merge(openapi::openapi_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            body_logging::log_bodies,
        ))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }
}

/// Static facts when `FACTS_FILE` is set, Alpha Vantage otherwise.
pub fn build_provider(config: &ServerConfig) -> anyhow::Result<Arc<dyn FactsProvider>> {
    match &config.facts_file {
        Some(path) => {
            let provider = StaticFactsProvider::from_path(path)
                .with_context(|| format!("loading facts from {}", path.display()))?;
            Ok(Arc::new(provider))
        }
        None => {
            let client = AlphaVantageClient::from_env()
                .context("set ALPHA_VANTAGE_API_KEY or FACTS_FILE")?;
            Ok(Arc::new(client))
        }
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let screening = ScreeningConfig::from_env().context("invalid screening configuration")?;
    let provider = build_provider(&config)?;

    tracing::info!(
        "Screening with {} provider, Graham constant {}, {:?} CAGR",
        provider.name(),
        screening.graham_constant.value(),
        screening.cagr_method
    );

    let state = AppState {
        provider,
        engine: RatioEngine::with_config(screening),
        default_periods: config.periods,
        log_requests: config.log_requests,
        log_responses: config.log_responses,
    };

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("Dividend screener listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
