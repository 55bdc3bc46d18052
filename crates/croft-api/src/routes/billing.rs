//! # Billing API
//!
//! A single read-only summary endpoint, gated on the billing role. Also
//! the natural place to observe that role requirements are genuine set
//! membership: an admin without the billing role is rejected here.

use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth;
use crate::gateway::RequestContext;
use crate::state::AppState;

/// Billing summary for the bound tenant.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BillingSummaryResponse {
    /// Tenant slug.
    pub tenant: String,
    /// Number of users in the tenant.
    pub users: usize,
    /// Number of widgets in the tenant.
    pub widgets: usize,
}

/// Build the billing router. Billing role required.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/billing/summary", get(billing_summary))
        .route_layer(from_fn(auth::billing_required))
}

/// GET /v1/billing/summary — Usage counts for the bound tenant.
#[utoipa::path(
    get,
    path = "/v1/billing/summary",
    responses(
        (status = 200, description = "Billing summary", body = BillingSummaryResponse),
        (status = 403, description = "Billing role required", body = crate::error::ErrorBody),
    ),
    tag = "billing"
)]
pub(crate) async fn billing_summary(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Json<BillingSummaryResponse> {
    Json(BillingSummaryResponse {
        tenant: ctx.tenant().slug.as_str().to_string(),
        users: state.users.list(ctx.scope()).len(),
        widgets: state.widgets.len(ctx.scope()),
    })
}
