//! # User Management API
//!
//! Per-tenant user administration. The whole router sits behind the
//! admin role guard.
//!
//! ## Endpoints
//!
//! - `GET /v1/users` — list the tenant's users
//! - `POST /v1/users` — create a user (password hashed at rest)
//! - `GET /v1/users/:id` — get a user

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use croft_core::{RoleSet, User, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth;
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::gateway::RequestContext;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to create a user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Login name, unique within the tenant.
    pub username: String,
    /// Plaintext password; hashed with Argon2id before storage.
    pub password: String,
    /// Role names ("admin", "billing", "member").
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.username.len() > 64 {
            return Err("username must not exceed 64 characters".to_string());
        }
        if self.password.len() < 8 {
            return Err("password must be at least 8 characters".to_string());
        }
        Ok(())
    }
}

/// User representation returned by the API. Never carries the credential
/// hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// User id.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Role names, sorted.
    pub roles: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username,
            roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
            created_at: user.created_at,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the users router. Admin role required throughout.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/users", get(list_users).post(create_user))
        .route("/v1/users/:id", get(get_user))
        .route_layer(from_fn(auth::admin_required))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/users — List the bound tenant's users.
#[utoipa::path(
    get,
    path = "/v1/users",
    responses(
        (status = 200, description = "Users in the bound tenant", body = Vec<UserResponse>),
        (status = 403, description = "Admin role required", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub(crate) async fn list_users(State(state): State<AppState>, ctx: RequestContext) -> Json<Vec<UserResponse>> {
    let mut users = state.users.list(ctx.scope());
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Json(users.into_iter().map(UserResponse::from).collect())
}

/// POST /v1/users — Create a user in the bound tenant.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 409, description = "Username already exists in this tenant", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let roles = RoleSet::parse(&req.roles)?;

    let user = state
        .users
        .create(ctx.scope(), req.username, &req.password, roles)?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::users::insert(pool, ctx.scope(), &user).await {
            tracing::error!(error = %e, user_id = %user.id, "failed to persist user");
        }
    }

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /v1/users/:id — Get a user from the bound tenant.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "No such user in the bound tenant", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let id = UserId::from_uuid(id);
    state
        .users
        .get(ctx.scope(), &id)
        .map(|u| Json(u.into()))
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))
}
