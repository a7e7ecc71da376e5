/// Error types for Blog Service
///
/// Read-path denials surface as `NotFound` so hidden content is indistinguishable
/// from missing content. Write-path denials are explicit: `Redirect` for posts,
/// `Forbidden` for comments.
use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use thiserror::Error;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Denied post mutation; carries the canonical read URL.
    #[error("Redirect to {0}")]
    Redirect(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Redirect(_) => StatusCode::FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if let AppError::Redirect(location) = self {
            return HttpResponse::build(status)
                .insert_header((header::LOCATION, location.as_str()))
                .json(serde_json::json!({
                    "redirect_to": location,
                    "status": status.as_u16(),
                }));
        }

        // Internal details stay in the logs.
        let error_msg = match self {
            AppError::DatabaseError(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(db_err.message().to_string())
            }
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_sets_location_header() {
        let resp = AppError::Redirect("/api/v1/posts/abc".into()).error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/api/v1/posts/abc"
        );
    }

    #[test]
    fn hidden_and_forbidden_map_to_distinct_statuses() {
        assert_eq!(
            AppError::NotFound("post".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("comment".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn database_errors_are_not_echoed() {
        let resp = AppError::DatabaseError("relation \"posts\" does not exist".into())
            .error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
