//! HTTP mapping for advice-proxy failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::any::Any;
use weather_core::ProxyError;

/// Error returned by the proxy routes.
#[derive(Debug)]
pub struct ApiError(pub ProxyError);

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            ProxyError::MalformedInput(message) => {
                tracing::warn!(%message, "rejected malformed weather payload");
                (StatusCode::BAD_REQUEST, ErrorBody { message, error: None })
            }
            ProxyError::Unexpected(error) => {
                tracing::error!(%error, "advice proxy failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { message: "Server error".to_string(), error: Some(error) },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Turn a handler panic into the usual 500 body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError(ProxyError::Unexpected(detail)).into_response()
}
