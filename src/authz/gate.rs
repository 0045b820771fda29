use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::app::AppState;
use crate::errors::AppError;
use crate::jwt::Session;

use super::policy::{PolicyTable, Surface};
use super::role::Role;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No session claim present.
    Unauthenticated,
    /// Valid session, role below the route's minimum.
    InsufficientRole,
}

/// A decision plus the surface that renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub surface: Surface,
}

/// Pluggable gate, in case a deployment swaps the table for something dynamic.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Resolve `(role, path)` against the route policy.
    async fn authorize(&self, role: Role, path: &str) -> Verdict;
}

/// Default gate backed by the static [`PolicyTable`].
#[derive(Debug, Clone, Default)]
pub struct TableGate {
    table: PolicyTable,
}

impl TableGate {
    pub fn new(table: PolicyTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    fn evaluate(&self, role: Role, path: &str) -> Verdict {
        let Some(rule) = self.table.match_rule(path) else {
            // Unlisted paths are public.
            return Verdict { decision: Decision::Allow, surface: Surface::Api };
        };

        let decision = if role.meets(rule.min_role) {
            Decision::Allow
        } else {
            tracing::debug!(
                role = %role,
                path = %path,
                required = %rule.min_role,
                "access denied"
            );
            Decision::Deny(deny_reason(role))
        };

        Verdict { decision, surface: rule.surface }
    }
}

#[async_trait]
impl PolicyEvaluator for TableGate {
    async fn authorize(&self, role: Role, path: &str) -> Verdict {
        self.evaluate(role, path)
    }
}

fn deny_reason(role: Role) -> DenyReason {
    if role == Role::NonUser {
        DenyReason::Unauthenticated
    } else {
        DenyReason::InsufficientRole
    }
}

/// Handler-level guard for API routes.
///
/// Every protected handler calls this with its own extracted session, so a
/// request that slipped past the middleware still gets the same ordinal check.
pub fn require_role(session: Option<&Session>, min: Role) -> Result<&Session, AppError> {
    let Some(session) = session else {
        return Err(AppError::unauthenticated("authentication required"));
    };
    if !session.role.meets(min) {
        return Err(AppError::insufficient_role(format!(
            "requires {} role or above",
            min
        )));
    }
    Ok(session)
}

/// Handler-level guard for page routes: deny means "send them home".
pub fn require_page_role(session: Option<&Session>, min: Role) -> Result<(), Redirect> {
    let role = session.map(|s| s.role).unwrap_or(Role::NonUser);
    if role.meets(min) {
        Ok(())
    } else {
        Err(Redirect::to("/"))
    }
}

/// Global request middleware, the first enforcement point.
///
/// Public rules bypass the check entirely; the session token is not even
/// inspected for them.
pub async fn access_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();

    let gated = state
        .gate
        .table()
        .match_rule(path)
        .map(|rule| rule.min_role != Role::NonUser)
        .unwrap_or(false);
    if !gated {
        return next.run(req).await;
    }

    let role = Session::from_headers(req.headers(), &state.jwt)
        .map(|session| session.role)
        .unwrap_or(Role::NonUser);

    let verdict = state.gate.authorize(role, path).await;
    match verdict.decision {
        Decision::Allow => next.run(req).await,
        Decision::Deny(reason) => deny_response(reason, verdict.surface),
    }
}

fn deny_response(reason: DenyReason, surface: Surface) -> Response {
    match surface {
        Surface::Page => Redirect::to("/").into_response(),
        Surface::Api => match reason {
            DenyReason::Unauthenticated => {
                AppError::unauthenticated("authentication required").into_response()
            }
            DenyReason::InsufficientRole => {
                AppError::insufficient_role("insufficient role").into_response()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn public_paths_allow_anonymous() {
        let gate = TableGate::default();
        let verdict = gate.authorize(Role::NonUser, "/novels/42").await;
        assert_eq!(verdict.decision, Decision::Allow);
    }

    #[tokio::test]
    async fn admin_pages_deny_below_admin_and_allow_above() {
        let gate = TableGate::default();

        let anon = gate.authorize(Role::NonUser, "/admin/users").await;
        assert_eq!(anon.decision, Decision::Deny(DenyReason::Unauthenticated));
        assert_eq!(anon.surface, Surface::Page);

        let writer = gate.authorize(Role::Writer, "/admin/users").await;
        assert_eq!(writer.decision, Decision::Deny(DenyReason::InsufficientRole));

        assert_eq!(gate.authorize(Role::Admin, "/admin/users").await.decision, Decision::Allow);
        assert_eq!(
            gate.authorize(Role::Superadmin, "/admin/users").await.decision,
            Decision::Allow
        );
    }

    #[tokio::test]
    async fn author_pages_require_writer() {
        let gate = TableGate::default();
        assert_eq!(
            gate.authorize(Role::Reader, "/author").await.decision,
            Decision::Deny(DenyReason::InsufficientRole)
        );
        assert_eq!(gate.authorize(Role::Writer, "/author").await.decision, Decision::Allow);
    }

    #[tokio::test]
    async fn api_denials_report_the_api_surface() {
        let gate = TableGate::default();
        let verdict = gate.authorize(Role::NonUser, "/api/reviews").await;
        assert_eq!(verdict.decision, Decision::Deny(DenyReason::Unauthenticated));
        assert_eq!(verdict.surface, Surface::Api);

        assert_eq!(gate.authorize(Role::Reader, "/api/reviews").await.decision, Decision::Allow);
    }

    #[test]
    fn require_role_splits_unauthenticated_from_insufficient() {
        let err = require_role(None, Role::Reader).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));

        let session = Session {
            user_id: uuid::Uuid::new_v4(),
            role: Role::Reader,
        };
        let err = require_role(Some(&session), Role::Admin).unwrap_err();
        assert!(matches!(err, AppError::InsufficientRole(_)));

        assert!(require_role(Some(&session), Role::Reader).is_ok());
    }

    #[test]
    fn page_guard_redirects_on_deny() {
        assert!(require_page_role(None, Role::Admin).is_err());
        let session = Session {
            user_id: uuid::Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(require_page_role(Some(&session), Role::Admin).is_ok());
    }
}
