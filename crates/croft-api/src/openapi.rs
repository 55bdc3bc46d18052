//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json` outside the gateway (the spec itself is not
//! tenant data).

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Croft API",
        version = "0.3.2",
        description = "Multi-tenant REST backend: tenant-scoped authentication gateway in front of per-tenant widget, user, session, and billing resources.",
        license(name = "Apache-2.0")
    ),
    paths(
        // Widgets
        crate::routes::widgets::list_widgets,
        crate::routes::widgets::create_widget,
        crate::routes::widgets::get_widget,
        crate::routes::widgets::update_widget,
        crate::routes::widgets::delete_widget,
        // Users
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::users::get_user,
        // Session
        crate::routes::session::login,
        crate::routes::session::logout,
        // Billing
        crate::routes::billing::billing_summary,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Widget DTOs
        crate::routes::widgets::CreateWidgetRequest,
        crate::routes::widgets::UpdateWidgetRequest,
        crate::routes::widgets::WidgetResponse,
        // User DTOs
        crate::routes::users::CreateUserRequest,
        crate::routes::users::UserResponse,
        // Session DTOs
        crate::routes::session::LoginRequest,
        crate::routes::session::SessionResponse,
        // Billing DTOs
        crate::routes::billing::BillingSummaryResponse,
    )),
    tags(
        (name = "widgets", description = "Per-tenant widget CRUD"),
        (name = "users", description = "Per-tenant user management (admin)"),
        (name = "session", description = "Login / logout"),
        (name = "billing", description = "Billing summary (billing role)"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router. Stateless and unauthenticated.
pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
