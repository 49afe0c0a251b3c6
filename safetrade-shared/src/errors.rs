use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: Catalog errors
/// - E3xxx: Moderation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    ServiceUnavailable,
    BadRequest,
    PayloadTooLarge,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    EmailNotVerified,
    TokenExpired,
    TokenInvalid,
    RefreshTokenRevoked,
    PasswordTooWeak,
    VerificationCodeExpired,
    VerificationCodeInvalid,
    ResetCodeExpired,
    ResetCodeInvalid,
    EmailRateLimited,
    UserNotFound,

    // Catalog (E2xxx)
    ProductNotFound,
    NotProductOwner,
    ProductNotEditable,
    ReactivationBlocked,
    ImageUploadFailed,
    ImageNotFound,
    AlreadyLiked,

    // Moderation (E3xxx)
    IncidentNotFound,
    ModeratorNotFound,
    AlreadyAssigned,
    SelfReviewConflict,
    InvalidIncidentState,
    InvalidResolution,
    AppealNotAllowed,
    AppealAlreadySubmitted,
    StatusChangeFailed,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::RateLimited => "E0006",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",
            Self::PayloadTooLarge => "E0009",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::EmailNotVerified => "E1003",
            Self::TokenExpired => "E1004",
            Self::TokenInvalid => "E1005",
            Self::RefreshTokenRevoked => "E1006",
            Self::PasswordTooWeak => "E1007",
            Self::VerificationCodeExpired => "E1008",
            Self::VerificationCodeInvalid => "E1009",
            Self::ResetCodeExpired => "E1010",
            Self::ResetCodeInvalid => "E1011",
            Self::EmailRateLimited => "E1012",
            Self::UserNotFound => "E1013",

            // Catalog
            Self::ProductNotFound => "E2001",
            Self::NotProductOwner => "E2002",
            Self::ProductNotEditable => "E2003",
            Self::ReactivationBlocked => "E2004",
            Self::ImageUploadFailed => "E2005",
            Self::ImageNotFound => "E2006",
            Self::AlreadyLiked => "E2007",

            // Moderation
            Self::IncidentNotFound => "E3001",
            Self::ModeratorNotFound => "E3002",
            Self::AlreadyAssigned => "E3003",
            Self::SelfReviewConflict => "E3004",
            Self::InvalidIncidentState => "E3005",
            Self::InvalidResolution => "E3006",
            Self::AppealNotAllowed => "E3007",
            Self::AppealAlreadySubmitted => "E3008",
            Self::StatusChangeFailed => "E3009",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable | Self::StatusChangeFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::ModeratorNotFound | Self::InvalidResolution | Self::AppealNotAllowed
            | Self::AppealAlreadySubmitted | Self::ImageUploadFailed => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::UserNotFound | Self::ProductNotFound | Self::ImageNotFound
            | Self::IncidentNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid | Self::RefreshTokenRevoked | Self::EmailNotVerified
            | Self::VerificationCodeExpired | Self::VerificationCodeInvalid
            | Self::ResetCodeExpired | Self::ResetCodeInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotProductOwner => StatusCode::FORBIDDEN,
            Self::RateLimited | Self::EmailRateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::EmailAlreadyExists | Self::AlreadyLiked | Self::ProductNotEditable
            | Self::ReactivationBlocked | Self::AlreadyAssigned | Self::SelfReviewConflict
            | Self::InvalidIncidentState => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    /// Helper: convert an `AppError` into its JSON body string.
    async fn body_string(err: AppError) -> String {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn known_error_envelope() {
        let json = body_string(AppError::new(ErrorCode::IncidentNotFound, "incident not found")).await;
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "E3001");
        assert_eq!(value["error"]["message"], "incident not found");
    }

    #[tokio::test]
    async fn status_codes_follow_taxonomy() {
        let cases = [
            (ErrorCode::IncidentNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::ModeratorNotFound, StatusCode::BAD_REQUEST),
            (ErrorCode::AlreadyAssigned, StatusCode::CONFLICT),
            (ErrorCode::SelfReviewConflict, StatusCode::CONFLICT),
            (ErrorCode::AppealNotAllowed, StatusCode::BAD_REQUEST),
            (ErrorCode::AppealAlreadySubmitted, StatusCode::BAD_REQUEST),
            (ErrorCode::StatusChangeFailed, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, expected) in cases {
            assert_eq!(code.status_code(), expected, "wrong status for {code:?}");
        }
    }

    #[tokio::test]
    async fn database_not_found_maps_to_404() {
        let err = AppError::from(diesel::result::Error::NotFound);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn details_are_included_when_present() {
        let json = body_string(AppError::with_details(
            ErrorCode::ValidationError,
            "name too short",
            serde_json::json!({"field": "name"}),
        ))
        .await;
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"]["details"]["field"], "name");
    }
}
