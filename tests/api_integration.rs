use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::tempdir;
use tower::util::ServiceExt;
use uuid::Uuid;

use novel_nest::authz::Role;
use novel_nest::create_app;
use novel_nest::jwt::JwtConfig;

async fn setup() -> Result<(tempfile::TempDir, SqlitePool, Router)> {
    let dir = tempdir().context("failed to create tempdir")?;
    let opts = SqliteConnectOptions::new()
        .filename(dir.path().join("test_api.db"))
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"))
        .await?
        .run(&pool)
        .await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;
    Ok((dir, pool, app))
}

async fn seed_user(pool: &SqlitePool, email: &str, role: Role) -> Result<(Uuid, String)> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let password_hash = novel_nest::utils::hash_password("password123")
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(email)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let jwt = JwtConfig::from_env().map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let token = jwt.encode(id, role).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok((id, token))
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    payload: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match payload {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let resp: Response = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn promotion_publishing_and_reading_flow() -> Result<()> {
    let (_dir, pool, app) = setup().await?;

    // Register a fresh account; it starts as a reader
    let (status, registered) = send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"name": "Ada", "email": "ada@example.com", "password": "password123"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["user"]["role"], "reader");
    let ada_token = registered["token"].as_str().unwrap().to_string();
    let ada_id = registered["user"]["id"].as_str().unwrap().to_string();

    // A reader cannot use the author surface
    let (status, _) = send_json(&app, "GET", "/api/author/novels", Some(&ada_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An admin promotes Ada using the raw alias spelling; it lands as "writer"
    let (_, admin_token) = seed_user(&pool, "admin@example.com", Role::Admin).await?;
    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/admin/users/{}/role", ada_id),
        Some(&admin_token),
        Some(json!({"role": " Author "})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "writer");

    // The old token still carries the reader claim; a fresh login picks up writer
    let (status, _) = send_json(&app, "GET", "/api/author/novels", Some(&ada_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, logged_in) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "ada@example.com", "password": "password123"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["user"]["role"], "writer");
    let ada_token = logged_in["token"].as_str().unwrap().to_string();

    // Create a novel and publish two chapters; numbering is sequential
    let (status, novel) = send_json(
        &app,
        "POST",
        "/api/author/novels",
        Some(&ada_token),
        Some(json!({"title": "The Clockwork Orchard", "synopsis": "Trees that tick."})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(novel["status"], "ongoing");
    let novel_id = novel["id"].as_str().unwrap().to_string();

    let (status, first) = send_json(
        &app,
        "POST",
        &format!("/api/author/novels/{}/chapters", novel_id),
        Some(&ada_token),
        Some(json!({"title": "Winding", "content": "The gate had not been oiled in years."})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["number"], 1);

    let (status, second) = send_json(
        &app,
        "POST",
        &format!("/api/author/novels/{}/chapters", novel_id),
        Some(&ada_token),
        Some(json!({"title": "Unwinding", "content": "Spring rain, brass leaves."})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["number"], 2);

    // Anonymous readers can browse and read
    let (status, listing) = send_json(&app, "GET", "/api/novels", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);

    let (status, chapters) = send_json(
        &app,
        "GET",
        &format!("/api/novels/{}/chapters", novel_id),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let chapters = chapters.as_array().unwrap();
    assert_eq!(chapters.len(), 2);
    assert!(chapters[0].get("content").is_none(), "listing omits chapter bodies");

    let (status, chapter) = send_json(
        &app,
        "GET",
        &format!("/api/novels/{}/chapters/2", novel_id),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chapter["title"], "Unwinding");

    Ok(())
}

#[tokio::test]
async fn shelf_reviews_and_trending_flow() -> Result<()> {
    let (_dir, pool, app) = setup().await?;

    let (_, writer_token) = seed_user(&pool, "writer@example.com", Role::Writer).await?;
    let (_, reader_token) = seed_user(&pool, "reader@example.com", Role::Reader).await?;

    let mut novel_ids = Vec::new();
    for title in ["Quiet Harbor", "Loud Harbor"] {
        let (status, novel) = send_json(
            &app,
            "POST",
            "/api/author/novels",
            Some(&writer_token),
            Some(json!({"title": title})),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        novel_ids.push(novel["id"].as_str().unwrap().to_string());
    }

    // Like toggles flip on, off, on
    let like_uri = format!("/api/likes/{}", novel_ids[1]);
    let (status, toggled) = send_json(&app, "POST", &like_uri, Some(&reader_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["active"], true);
    let (_, toggled) = send_json(&app, "POST", &like_uri, Some(&reader_token), None).await?;
    assert_eq!(toggled["active"], false);
    let (_, toggled) = send_json(&app, "POST", &like_uri, Some(&reader_token), None).await?;
    assert_eq!(toggled["active"], true);

    // Wishlist toggle and listing
    let wish_uri = format!("/api/wishlist/{}", novel_ids[0]);
    let (status, toggled) = send_json(&app, "POST", &wish_uri, Some(&reader_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["active"], true);

    let (status, wishlist) = send_json(&app, "GET", "/api/wishlist", Some(&reader_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let wishlist = wishlist.as_array().unwrap();
    assert_eq!(wishlist.len(), 1);
    assert_eq!(wishlist[0]["title"], "Quiet Harbor");

    // Review the liked novel
    let (status, review) = send_json(
        &app,
        "POST",
        "/api/reviews",
        Some(&reader_token),
        Some(json!({"novel_id": novel_ids[1], "rating": 5, "body": "Brass and fog."})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["rating"], 5);

    let (status, reviews) = send_json(
        &app,
        "GET",
        &format!("/api/novels/{}/reviews", novel_ids[1]),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviews.as_array().unwrap().len(), 1);

    // Out-of-range rating is rejected before any write
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/reviews",
        Some(&reader_token),
        Some(json!({"novel_id": novel_ids[1], "rating": 6})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Trending puts the recently liked novel first and reports its like count
    let (status, trending) = send_json(&app, "GET", "/api/novels?sort=trending", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    let trending = trending.as_array().unwrap();
    assert_eq!(trending[0]["title"], "Loud Harbor");
    assert_eq!(trending[0]["like_count"], 1);

    // Admin takedown hides the novel from every public surface
    let (_, admin_token) = seed_user(&pool, "admin@example.com", Role::Admin).await?;
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/admin/novels/{}", novel_ids[1]),
        Some(&admin_token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(
        &app,
        "GET",
        &format!("/api/novels/{}", novel_ids[1]),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listing) = send_json(&app, "GET", "/api/novels", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);

    Ok(())
}
