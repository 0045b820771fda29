use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::app::AppState;
use crate::authz::{require_role, PolicyRule, Role};
use crate::errors::AppResult;
use crate::jwt::MaybeSession;

pub fn routes() -> Router<AppState> {
    Router::new().route("/policies", get(list_policies))
}

/// Dump of the live route-policy table, for auditing what the gate enforces.
#[utoipa::path(
    get,
    path = "/api/developer/policies",
    tag = "Developer",
    responses((status = 200, description = "Active route policies", body = [PolicyRule])),
    security(("bearerAuth" = []))
)]
pub async fn list_policies(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> AppResult<Json<Vec<PolicyRule>>> {
    require_role(session.as_ref(), Role::Developer)?;
    Ok(Json(state.gate.table().rules().to_vec()))
}
