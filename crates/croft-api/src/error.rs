//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps gateway and store errors to HTTP status codes with JSON bodies.
//!
//! ## Disclosure rules
//!
//! - Authentication failures collapse into one opaque 401 body: the
//!   response never reveals whether the token existed, was expired, or
//!   was issued elsewhere. The distinct reason goes to the logs.
//! - Tenant identifiers are not secret, so an unknown tenant hint is a
//!   distinct 404.
//! - Bind failures are internal faults: logged with full context,
//!   surfaced as an opaque 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// The error payload.
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "TENANT_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// The tenant hint matched no tenant (404).
    #[error("unknown tenant: {0}")]
    TenantNotFound(String),

    /// Scope binding failed (500). Detail is logged, never returned.
    #[error("scope bind failure: {0}")]
    BindFailure(String),

    /// Authentication failure (401). Deliberately carries no detail —
    /// the reason is logged where the failure is raised.
    #[error("authentication required")]
    Unauthorized,

    /// Authorization failure — principal lacks a required role (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found within the bound tenant (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::TenantNotFound(_) => (StatusCode::NOT_FOUND, "TENANT_NOT_FOUND"),
            Self::BindFailure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "BIND_FAILURE"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Opaque bodies for everything a caller could use to enumerate
        // credentials, and for internal faults.
        let message = match &self {
            Self::Unauthorized => "authentication required".to_string(),
            Self::BindFailure(_) => "an internal error occurred".to_string(),
            Self::Internal(_) => "an internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::BindFailure(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<croft_core::ValidationError> for AppError {
    fn from(err: croft_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<croft_core::AuthError> for AppError {
    fn from(_: croft_core::AuthError) -> Self {
        // All authentication failures collapse to the opaque 401.
        Self::Unauthorized
    }
}

impl From<croft_state::DirectoryError> for AppError {
    fn from(err: croft_state::DirectoryError) -> Self {
        match err {
            croft_state::DirectoryError::NotFound(hint) => Self::TenantNotFound(hint),
            croft_state::DirectoryError::DuplicateSlug(slug) => {
                Self::Conflict(format!("tenant slug {slug:?} already exists"))
            }
        }
    }
}

impl From<croft_state::BindError> for AppError {
    fn from(err: croft_state::BindError) -> Self {
        Self::BindFailure(err.to_string())
    }
}

impl From<croft_state::UserError> for AppError {
    fn from(err: croft_state::UserError) -> Self {
        match &err {
            croft_state::UserError::DuplicateUsername(_) => Self::Conflict(err.to_string()),
            croft_state::UserError::Hash(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    /// Helper to extract status and body from a Response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes_match_taxonomy() {
        let cases = [
            (AppError::TenantNotFound("x".into()), StatusCode::NOT_FOUND),
            (
                AppError::BindFailure("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let (status, _) = err.status_and_code();
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn unauthorized_body_is_opaque() {
        let (status, body) = response_parts(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error.code, "UNAUTHORIZED");
        assert_eq!(body.error.message, "authentication required");
    }

    #[tokio::test]
    async fn bind_failure_body_hides_detail() {
        let (status, body) =
            response_parts(AppError::BindFailure("binder closed mid-flight".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "BIND_FAILURE");
        assert!(
            !body.error.message.contains("binder closed"),
            "bind detail must not leak: {}",
            body.error.message
        );
    }

    #[tokio::test]
    async fn tenant_not_found_names_the_hint() {
        let (status, body) = response_parts(AppError::TenantNotFound("ghost".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "TENANT_NOT_FOUND");
        assert!(body.error.message.contains("ghost"));
    }

    #[test]
    fn every_auth_error_variant_collapses_to_unauthorized() {
        use croft_core::AuthError;
        for err in [
            AuthError::MissingCredential,
            AuthError::InvalidCredential,
            AuthError::ExpiredCredential,
        ] {
            assert!(matches!(AppError::from(err), AppError::Unauthorized));
        }
    }

    #[test]
    fn directory_not_found_maps_to_tenant_not_found() {
        let err = AppError::from(croft_state::DirectoryError::NotFound("ghost".into()));
        assert!(matches!(err, AppError::TenantNotFound(_)));
    }
}
