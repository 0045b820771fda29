//! Page-surface shells.
//!
//! The middleware already gates these prefixes; each handler re-checks with
//! the same guard so a route wired outside the table still denies correctly.
//! Page denials redirect home with no error payload.

use axum::response::{Html, Redirect};
use axum::routing::get;
use axum::Router;

use crate::app::AppState;
use crate::authz::{require_page_role, Role};
use crate::jwt::MaybeSession;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/novels", get(browse))
        .route("/library", get(library))
        .route("/author", get(author_dashboard))
        .route("/admin", get(admin_dashboard))
        .route("/admin/users", get(admin_users))
        .route("/developer", get(developer_panel))
}

type PageResult = Result<Html<&'static str>, Redirect>;

pub async fn home() -> Html<&'static str> {
    Html("<!doctype html><title>Novel Nest</title><h1>Novel Nest</h1><p>Serialized fiction, fresh weekly.</p>")
}

pub async fn browse() -> Html<&'static str> {
    Html("<!doctype html><title>Browse novels</title><h1>Browse novels</h1>")
}

pub async fn library(MaybeSession(session): MaybeSession) -> PageResult {
    require_page_role(session.as_ref(), Role::Reader)?;
    Ok(Html("<!doctype html><title>My library</title><h1>My library</h1>"))
}

pub async fn author_dashboard(MaybeSession(session): MaybeSession) -> PageResult {
    require_page_role(session.as_ref(), Role::Writer)?;
    Ok(Html("<!doctype html><title>Author dashboard</title><h1>Author dashboard</h1>"))
}

pub async fn admin_dashboard(MaybeSession(session): MaybeSession) -> PageResult {
    require_page_role(session.as_ref(), Role::Admin)?;
    Ok(Html("<!doctype html><title>Moderation</title><h1>Moderation</h1>"))
}

pub async fn admin_users(MaybeSession(session): MaybeSession) -> PageResult {
    require_page_role(session.as_ref(), Role::Admin)?;
    Ok(Html("<!doctype html><title>Users</title><h1>Users</h1>"))
}

pub async fn developer_panel(MaybeSession(session): MaybeSession) -> PageResult {
    require_page_role(session.as_ref(), Role::Developer)?;
    Ok(Html("<!doctype html><title>Developer panel</title><h1>Developer panel</h1>"))
}
