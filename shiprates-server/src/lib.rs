use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use shiprates_core::aggregator::QuoteAggregator;
use shiprates_core::error::ShipRatesError;
use shiprates_core::model::{Carrier, ShipmentRequest};

/// Shared request-handling state. The carrier list is a read-only snapshot
/// fetched once at startup, serialized once, and served as-is afterwards.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<QuoteAggregator>,
    carriers_json: Bytes,
}

impl AppState {
    pub fn new(aggregator: Arc<QuoteAggregator>, carriers: &[Carrier]) -> anyhow::Result<Self> {
        let carriers_json = Bytes::from(serde_json::to_vec(carriers)?);
        Ok(Self {
            aggregator,
            carriers_json,
        })
    }
}

/// Build the application router: the JSON API, permissive CORS, request
/// tracing, and (optionally) the prebuilt frontend as the fallback.
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/api/quote", post(quote_handler))
        .route("/api/carriers", get(carriers_handler));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn quote_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let req: ShipmentRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting malformed quote request");
            return (StatusCode::BAD_REQUEST, "Invalid request".to_string()).into_response();
        }
    };

    match state.aggregator.quote(req).await {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => error_response(err),
    }
}

async fn carriers_handler(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.carriers_json.clone(),
    )
        .into_response()
}

fn error_response(err: ShipRatesError) -> Response {
    let status = match &err {
        ShipRatesError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "quote request failed");
    }
    (status, err.to_string()).into_response()
}
