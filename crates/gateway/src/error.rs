use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde_json::json,
};

/// Request-boundary error taxonomy. Every failure is converted to a JSON
/// error response here; nothing terminates the process.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request fields. Never retried, never sent to
    /// the provider.
    #[error("{0}")]
    Validation(String),

    /// Media resolution failed (bad descriptor, unreadable file, failed
    /// fetch). Surfaced as part of the enclosing send failure.
    #[error(transparent)]
    Media(#[from] parley_media::Error),

    /// The provider rejected or failed the operation.
    #[error(transparent)]
    Provider(#[from] parley_provider::Error),

    #[error("not found")]
    NotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            // A malformed descriptor is the client's fault; a failed
            // read/fetch is a downstream failure.
            Self::Media(e) if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            Self::Media(_) | Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
