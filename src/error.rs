use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::site::SiteError;
use crate::store::StoreError;
use crate::upload::UploadError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Upload(UploadError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MalformedImport(msg) => AppError::BadRequest(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<SiteError> for AppError {
    fn from(e: SiteError) -> Self {
        match e {
            SiteError::Validation(msg) => AppError::Validation(msg),
            SiteError::NotFound(what) => AppError::NotFound(what),
            SiteError::Store(e) => e.into(),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Multipart(msg) => AppError::BadRequest(msg),
            other => AppError::Upload(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upload(UploadError::NotConfigured(msg)) => {
                (StatusCode::BAD_REQUEST, msg.to_string())
            }
            AppError::Upload(e) => {
                tracing::warn!("Upload error: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not save your changes".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            response_status(AppError::NotFound("Project")),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn validation_returns_400() {
        assert_eq!(
            response_status(AppError::Validation("Title is required.".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn malformed_import_returns_400() {
        let err: AppError = StoreError::MalformedImport("not json".into()).into();
        assert_eq!(response_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_failure_returns_500() {
        let err: AppError = SiteError::Store(StoreError::Storage("disk full".into())).into();
        assert_eq!(response_status(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn rejected_upload_returns_502() {
        let err: AppError = UploadError::Status {
            status: 500,
            body: String::new(),
        }
        .into();
        assert_eq!(response_status(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unconfigured_upload_returns_400() {
        let err: AppError = UploadError::NotConfigured("Missing cloud endpoint or token").into();
        assert_eq!(response_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
