//! Error responses shared by the pages and the JSON API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use biostructx_affinity::AffinityError;
use biostructx_llm::LlmError;
use biostructx_molecules::MoleculeError;
use biostructx_sources::SourceError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self { status, kind, message: message.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn unavailable(kind: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, kind, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl From<AffinityError> for ApiError {
    fn from(e: AffinityError) -> Self {
        let status = match &e {
            AffinityError::InvalidLigand(_) | AffinityError::InvalidProtein(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AffinityError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AffinityError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.kind(), e.to_string())
    }
}

impl From<SourceError> for ApiError {
    fn from(e: SourceError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "upstream_unavailable", e.to_string())
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Unavailable(m) => Self::unavailable("chat_unavailable", m),
            LlmError::InvalidRequest(m) => Self::invalid_input(m),
            other => Self::new(StatusCode::BAD_GATEWAY, "upstream_unavailable", other.to_string()),
        }
    }
}

impl From<MoleculeError> for ApiError {
    fn from(e: MoleculeError) -> Self {
        match e {
            MoleculeError::Csv(err) => Self::internal(err.to_string()),
            other => Self::invalid_input(other.to_string()),
        }
    }
}

impl From<minijinja::Error> for ApiError {
    fn from(e: minijinja::Error) -> Self {
        Self::internal(format!("template error: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(kind = self.kind, status = self.status.as_u16(), "{}", self.message);
        }
        let body = json!({ "status": "error", "kind": self.kind, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}
