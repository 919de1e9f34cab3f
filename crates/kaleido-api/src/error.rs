use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kaleido_persist::PersistError;
use kaleido_search::SearchError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or empty x-user-id header")]
    Unauthenticated,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Search(ref err) => match err {
                SearchError::Validation(_) | SearchError::AnswerMismatch(_) => {
                    (StatusCode::BAD_REQUEST, self.to_string())
                }
                SearchError::NeedsRefinement => (StatusCode::CONFLICT, self.to_string()),
                SearchError::AccessDenied(_) => (StatusCode::FORBIDDEN, self.to_string()),
                SearchError::NotFound(_) | SearchError::Persist(PersistError::ThreadNotFound(_)) => {
                    (StatusCode::NOT_FOUND, self.to_string())
                }
                SearchError::SchemaViolation { .. } => {
                    tracing::error!(error = %err, "oracle output rejected");
                    (StatusCode::BAD_GATEWAY, "Upstream model returned malformed output".to_string())
                }
                SearchError::Persist(_) => {
                    tracing::error!(error = %err, "persistence error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
                }
                SearchError::Oracle(_) | SearchError::Retrieval(_) => {
                    tracing::error!(error = %err, "processing error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Processing error".to_string())
                }
            },
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
