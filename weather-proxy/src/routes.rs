//! Route definitions for the advice proxy.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use weather_core::{ProxyError, ProxyRequest, ResponseEnvelope};

use crate::{
    AppState,
    error::{ApiResult, panic_response},
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    with_middleware(
        Router::new()
            .route("/health", get(health_check))
            .route("/weather", post(advise_weather)),
    )
    .with_state(state)
}

fn with_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Attach advice to the weather object in the request body.
///
/// The body is parsed by hand so that non-JSON or wrongly shaped bodies get
/// the same 400 `{ message }` as a missing weather object.
async fn advise_weather(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ResponseEnvelope>> {
    let request: ProxyRequest = serde_json::from_slice(&body)
        .map_err(|e| ProxyError::MalformedInput(format!("Invalid request body: {e}")))?;

    let envelope = state.handler.handle(request).await?;
    Ok(Json(envelope))
}
