//! # Widget API
//!
//! Per-tenant widget CRUD. Every store operation goes through the
//! request's bound [`TenantScope`](croft_state::TenantScope), so a
//! handler physically cannot read or write another tenant's widgets.
//!
//! ## Endpoints
//!
//! - `GET /v1/widgets` — list (any authenticated principal)
//! - `POST /v1/widgets` — create (member or admin)
//! - `GET /v1/widgets/:id` — get (any authenticated principal)
//! - `PUT /v1/widgets/:id` — update (member or admin)
//! - `DELETE /v1/widgets/:id` — delete (member or admin)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use croft_core::{Role, RoleSet, Widget, WidgetId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_roles, CurrentUser};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::gateway::RequestContext;
use crate::state::AppState;

/// Roles allowed to mutate widgets.
fn writer_roles() -> RoleSet {
    RoleSet::of([Role::Member, Role::Admin])
}

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to create a widget.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWidgetRequest {
    /// Widget name.
    pub name: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for CreateWidgetRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.name.len() > 255 {
            return Err("name must not exceed 255 characters".to_string());
        }
        Ok(())
    }
}

/// Request to update a widget.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWidgetRequest {
    /// Updated name (optional).
    pub name: Option<String>,
    /// Updated notes (optional).
    pub notes: Option<String>,
}

impl Validate for UpdateWidgetRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty if provided".to_string());
            }
            if name.len() > 255 {
                return Err("name must not exceed 255 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Widget representation returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WidgetResponse {
    /// Widget id.
    pub id: Uuid,
    /// Widget name.
    pub name: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<Widget> for WidgetResponse {
    fn from(widget: Widget) -> Self {
        Self {
            id: *widget.id.as_uuid(),
            name: widget.name,
            notes: widget.notes,
            created_at: widget.created_at,
            updated_at: widget.updated_at,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the widgets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/widgets", get(list_widgets).post(create_widget))
        .route(
            "/v1/widgets/:id",
            get(get_widget).put(update_widget).delete(delete_widget),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/widgets — List the bound tenant's widgets.
#[utoipa::path(
    get,
    path = "/v1/widgets",
    responses(
        (status = 200, description = "Widgets in the bound tenant", body = Vec<WidgetResponse>),
        (status = 401, description = "Authentication failed", body = crate::error::ErrorBody),
    ),
    tag = "widgets"
)]
pub(crate) async fn list_widgets(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Json<Vec<WidgetResponse>> {
    let mut widgets: Vec<Widget> = state.widgets.list(ctx.scope());
    widgets.sort_by_key(|w| w.created_at);
    Json(widgets.into_iter().map(WidgetResponse::from).collect())
}

/// POST /v1/widgets — Create a widget in the bound tenant.
#[utoipa::path(
    post,
    path = "/v1/widgets",
    request_body = CreateWidgetRequest,
    responses(
        (status = 201, description = "Widget created", body = WidgetResponse),
        (status = 403, description = "Principal lacks a writer role", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "widgets"
)]
pub(crate) async fn create_widget(
    State(state): State<AppState>,
    ctx: RequestContext,
    CurrentUser(principal): CurrentUser,
    body: Result<Json<CreateWidgetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WidgetResponse>), AppError> {
    require_roles(&principal, &writer_roles())?;
    let req = extract_validated_json(body)?;

    let now = Utc::now();
    let widget = Widget {
        id: WidgetId::new(),
        tenant_id: ctx.scope().tenant_id(),
        name: req.name,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };

    state.widgets.insert(ctx.scope(), widget.id, widget.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::widgets::insert(pool, ctx.scope(), &widget).await {
            tracing::error!(error = %e, widget_id = %widget.id, "failed to persist widget");
        }
    }

    Ok((StatusCode::CREATED, Json(widget.into())))
}

/// GET /v1/widgets/:id — Get a widget from the bound tenant.
#[utoipa::path(
    get,
    path = "/v1/widgets/{id}",
    params(("id" = Uuid, Path, description = "Widget id")),
    responses(
        (status = 200, description = "Widget found", body = WidgetResponse),
        (status = 404, description = "No such widget in the bound tenant", body = crate::error::ErrorBody),
    ),
    tag = "widgets"
)]
pub(crate) async fn get_widget(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<WidgetResponse>, AppError> {
    let id = WidgetId::from_uuid(id);
    state
        .widgets
        .get(ctx.scope(), &id)
        .map(|w| Json(w.into()))
        .ok_or_else(|| AppError::NotFound(format!("widget {id} not found")))
}

/// PUT /v1/widgets/:id — Update a widget in the bound tenant.
#[utoipa::path(
    put,
    path = "/v1/widgets/{id}",
    params(("id" = Uuid, Path, description = "Widget id")),
    request_body = UpdateWidgetRequest,
    responses(
        (status = 200, description = "Widget updated", body = WidgetResponse),
        (status = 403, description = "Principal lacks a writer role", body = crate::error::ErrorBody),
        (status = 404, description = "No such widget in the bound tenant", body = crate::error::ErrorBody),
    ),
    tag = "widgets"
)]
pub(crate) async fn update_widget(
    State(state): State<AppState>,
    ctx: RequestContext,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateWidgetRequest>, JsonRejection>,
) -> Result<Json<WidgetResponse>, AppError> {
    require_roles(&principal, &writer_roles())?;
    let req = extract_validated_json(body)?;

    let id = WidgetId::from_uuid(id);
    let updated = state
        .widgets
        .update(ctx.scope(), &id, |widget| {
            if let Some(name) = req.name {
                widget.name = name;
            }
            if let Some(notes) = req.notes {
                widget.notes = Some(notes);
            }
            widget.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::NotFound(format!("widget {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::widgets::update(pool, ctx.scope(), &updated).await {
            tracing::error!(error = %e, widget_id = %updated.id, "failed to persist widget update");
        }
    }

    Ok(Json(updated.into()))
}

/// DELETE /v1/widgets/:id — Delete a widget from the bound tenant.
#[utoipa::path(
    delete,
    path = "/v1/widgets/{id}",
    params(("id" = Uuid, Path, description = "Widget id")),
    responses(
        (status = 204, description = "Widget deleted"),
        (status = 403, description = "Principal lacks a writer role", body = crate::error::ErrorBody),
        (status = 404, description = "No such widget in the bound tenant", body = crate::error::ErrorBody),
    ),
    tag = "widgets"
)]
pub(crate) async fn delete_widget(
    State(state): State<AppState>,
    ctx: RequestContext,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_roles(&principal, &writer_roles())?;

    let id = WidgetId::from_uuid(id);
    state
        .widgets
        .remove(ctx.scope(), &id)
        .ok_or_else(|| AppError::NotFound(format!("widget {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::widgets::delete(pool, ctx.scope(), &id).await {
            tracing::error!(error = %e, widget_id = %id, "failed to persist widget deletion");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
