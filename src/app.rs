use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::{middleware, Router};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::{access_gate, PolicyTable, TableGate};
use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{admin, auth, author, developer, health, novels, pages, reviews, shelf};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub gate: Arc<TableGate>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig, gate: TableGate) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
            gate: Arc::new(gate),
        }
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let gate = TableGate::new(PolicyTable::deployment());
    let state = AppState::new(pool, jwt_config, gate);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/auth", auth::routes())
        .nest("/api/novels", novels::routes())
        .nest("/api/reviews", reviews::routes())
        .nest("/api/wishlist", shelf::wishlist_routes())
        .nest("/api/likes", shelf::like_routes())
        .nest("/api/author", author::routes())
        .nest("/api/admin", admin::routes())
        .nest("/api/developer", developer::routes());

    let router = Router::new()
        .merge(pages::routes())
        .merge(api)
        // first enforcement point; handlers re-check with the same guards
        .layer(middleware::from_fn_with_state(state.clone(), access_gate))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
