use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use junction_watch::JunctionWatchError;
use serde::Serialize;

/// JSON body of every failed API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

/// An API failure with the HTTP status it maps to.
#[derive(Debug)]
pub struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, error: ApiError { code, message: message.into() } }
    }

    pub fn junction_not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "junction_not_found", format!("no junction with id `{id}`"))
    }

    pub fn optimization_in_progress() -> Self {
        Self::new(StatusCode::CONFLICT, "optimization_in_progress", "signal optimization is already running")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_body", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JunctionWatchError> for HttpApiError {
    fn from(err: JunctionWatchError) -> Self {
        match err {
            JunctionWatchError::UnknownJunction(id) => Self::junction_not_found(&id),
            JunctionWatchError::OptimizationInProgress => Self::optimization_in_progress(),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for HttpApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
