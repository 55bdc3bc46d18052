//! # Session API
//!
//! Login and logout. Both endpoints run under the tenant-scope
//! middleware (the user table is per-tenant) but outside the token
//! middleware — login is how a caller obtains a token in the first
//! place, and logout authenticates the presented token itself before
//! revoking it.
//!
//! ## Endpoints
//!
//! - `POST /v1/session` — verify username/password, issue a token
//! - `DELETE /v1/session` — revoke the presented bearer token

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth;
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::gateway::{self, RequestContext};
use crate::routes::users::UserResponse;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name within the resolved tenant.
    pub username: String,
    /// Plaintext password, verified against the stored Argon2id hash.
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        Ok(())
    }
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    /// The issued bearer token. Present it as `Authorization: Bearer <token>`.
    pub token: String,
    /// The authenticated user.
    pub user: UserResponse,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the session router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/session", post(login).delete(logout))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/session — Verify credentials and issue a token.
#[utoipa::path(
    post,
    path = "/v1/session",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Token issued", body = SessionResponse),
        (status = 401, description = "Unknown username or wrong password", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown tenant", body = crate::error::ErrorBody),
    ),
    tag = "session"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let req = extract_validated_json(body)?;

    // Unknown username and wrong password are indistinguishable to the
    // caller.
    let Some(user) = state
        .users
        .verify_password(ctx.scope(), &req.username, &req.password)
    else {
        tracing::warn!(
            tenant = %ctx.tenant().slug,
            username = %req.username,
            "login failed"
        );
        return Err(AppError::Unauthorized);
    };

    let token = state.credentials.issue(ctx.scope(), &user);

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::tokens::insert(pool, ctx.scope(), &token).await {
            tracing::error!(error = %e, user_id = %user.id, "failed to persist token");
        }
    }

    tracing::info!(tenant = %ctx.tenant().slug, user_id = %user.id, "session opened");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token: token.value.as_str().to_string(),
            user: user.into(),
        }),
    ))
}

/// DELETE /v1/session — Revoke the presented bearer token.
///
/// The token is authenticated first (same decision function the gateway
/// uses), so revocation is only possible for a credential the caller
/// actually holds.
#[utoipa::path(
    delete,
    path = "/v1/session",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Authentication failed", body = crate::error::ErrorBody),
    ),
    tag = "session"
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    ctx: RequestContext,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let Some(presented) = gateway::bearer_token(&headers) else {
        tracing::warn!(tenant = %ctx.tenant().slug, reason = "missing_credential", "logout rejected");
        return Err(AppError::Unauthorized);
    };
    let principal = auth::authenticate(&state.credentials, ctx.scope(), Some(&presented))
        .map_err(|err| {
            tracing::warn!(
                tenant = %ctx.tenant().slug,
                reason = err.as_str(),
                "logout rejected"
            );
            AppError::from(err)
        })?;

    state.credentials.revoke(ctx.scope(), &presented);

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::tokens::delete(pool, ctx.scope(), &presented).await {
            tracing::error!(error = %e, "failed to persist token revocation");
        }
    }

    tracing::info!(
        tenant = %ctx.tenant().slug,
        user_id = %principal.user_id,
        "session closed"
    );

    Ok(StatusCode::NO_CONTENT)
}
