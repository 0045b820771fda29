use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::ServerBuilder;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::models;
use crate::routes;

/// Registers the bearer scheme the protected paths reference.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::auth::register,
        routes::auth::login,
        routes::auth::me,
        routes::auth::logout,
        routes::novels::list_novels,
        routes::novels::get_novel,
        routes::novels::list_chapters,
        routes::novels::get_chapter,
        routes::novels::list_reviews,
        routes::reviews::create_review,
        routes::shelf::list_wishlist,
        routes::shelf::toggle_wishlist,
        routes::shelf::toggle_like,
        routes::author::list_own_novels,
        routes::author::create_novel,
        routes::author::update_novel,
        routes::author::publish_chapter,
        routes::admin::list_users,
        routes::admin::set_user_role,
        routes::admin::take_down_novel,
        routes::developer::list_policies
    ),
    components(
        schemas(
            models::user::User,
            models::user::AuthResponse,
            models::user::LoginRequest,
            models::user::RegisterRequest,
            models::user::UpdateRoleRequest,
            models::novel::Novel,
            models::novel::NovelCreateRequest,
            models::novel::NovelUpdateRequest,
            models::chapter::Chapter,
            models::chapter::ChapterSummary,
            models::chapter::ChapterCreateRequest,
            models::review::Review,
            models::review::ReviewCreateRequest,
            routes::shelf::ToggleResponse,
            routes::health::HealthResponse,
            crate::authz::Role,
            crate::authz::PolicyRule,
            crate::authz::Surface
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Novels", description = "Public browsing and reading"),
        (name = "Reviews", description = "Reader reviews"),
        (name = "Shelf", description = "Wishlist and likes"),
        (name = "Author", description = "Writer publishing"),
        (name = "Admin", description = "Moderation"),
        (name = "Developer", description = "Policy auditing"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![ServerBuilder::new()
        .url(format!("http://localhost:{port}"))
        .build()]);
    doc
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> Router {
    let config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
        .try_it_out_enabled(true)
        .persist_authorization(true);

    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", doc)
        .config(config)
        .into()
}
