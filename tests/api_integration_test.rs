//! End-to-end HTTP flows through the axum router

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use portal_lib::config::{Config, GamificationSettings};
use portal_lib::models::{mission, program, resource, resource_program, user};
use portal_lib::{db, server};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::{Value, json};
use tower::ServiceExt;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn test_app(db: &DatabaseConnection) -> Router {
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        cors_allowed_origins: Vec::new(),
        seed_demo: false,
        gamification: GamificationSettings::default(),
    };
    server::build_router(db.clone(), &config)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_program(db: &DatabaseConnection, name: &str) -> i32 {
    program::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create program")
    .id
}

async fn create_resource(
    db: &DatabaseConnection,
    program_id: i32,
    name: &str,
    resource_type: &str,
    status: &str,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let saved = resource::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("{} description", name)),
        ideal_use: Set(Some("Homework\nProjects".to_string())),
        url: Set(format!("https://example.com/{}", name.to_lowercase())),
        resource_type: Set(resource_type.to_string()),
        status: Set(status.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create resource");

    resource_program::Entity::insert(resource_program::ActiveModel {
        resource_id: Set(saved.id),
        program_id: Set(program_id),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to link resource");

    saved.id
}

async fn only_active(db: &DatabaseConnection, keys: &[&str]) {
    mission::Entity::update_many()
        .col_expr(mission::Column::Active, Expr::value(false))
        .filter(mission::Column::Key.is_not_in(keys.iter().copied()))
        .exec(db)
        .await
        .expect("Failed to disable missions");
}

/// Register through the API, optionally promote, then log in. Returns the token.
async fn register_and_login(
    app: &Router,
    db: &DatabaseConnection,
    national_id: &str,
    last_name: &str,
    program_id: i32,
    role: Option<&str>,
) -> (String, Value) {
    let (status, registered) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "first_name": "Test",
            "last_name": last_name,
            "email": null,
            "national_id": national_id,
            "program_id": program_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", registered);

    let username = registered["username"].as_str().unwrap().to_string();
    if let Some(role) = role {
        user::Entity::update_many()
            .col_expr(user::Column::Role, Expr::value(role))
            .filter(user::Column::Username.eq(username.as_str()))
            .exec(db)
            .await
            .unwrap();
    }

    let (status, login) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "username": username,
            "password": registered["temporary_password"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", login);

    (login["token"].as_str().unwrap().to_string(), login)
}

#[tokio::test]
async fn test_health_check() {
    let db = setup_test_db().await;
    let app = test_app(&db);

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_register_then_login_records_streak() {
    let db = setup_test_db().await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;

    let (_, login) = register_and_login(&app, &db, "0912345678", "Pérez Gómez", program_id, None).await;

    assert_eq!(login["user"]["username"], "tperezg");
    assert!(login["user"].get("password_hash").is_none());
    assert_eq!(login["login"]["streak"], 1);
    assert_eq!(login["login"]["points"], 10);
}

#[tokio::test]
async fn test_register_rejects_bad_or_duplicate_national_id() {
    let db = setup_test_db().await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;

    let body = |national_id: &str| {
        json!({
            "first_name": "Ana",
            "last_name": "Ruiz",
            "national_id": national_id,
            "program_id": program_id
        })
    };

    let (status, _) = send(&app, "POST", "/api/auth/register", None, Some(body("12ab"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/auth/register", None, Some(body("1111111111"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(body("1111111111"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let db = setup_test_db().await;
    let app = test_app(&db);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rating_flow_awards_mission_once() {
    let db = setup_test_db().await;
    only_active(&db, &["daily_login", "rate_resource"]).await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;
    let resource_id = create_resource(&db, program_id, "Figma", "tool", "approved").await;

    let (token, _) = register_and_login(&app, &db, "0101010101", "Mora", program_id, None).await;
    let uri = format!("/api/resources/{}/ratings", resource_id);

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "score": 6, "comment": "great" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, rated) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "score": 4, "comment": "Useful for mockups" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rated["average"], 4.0);
    assert_eq!(rated["rating_count"], 1);
    assert_eq!(rated["mission"]["points_awarded"], 10);

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "score": 5, "comment": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, dashboard) = send(&app, "GET", "/api/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["points"], 20);
    assert_eq!(dashboard["role"], "student");
    let missions = dashboard["missions"].as_array().unwrap();
    assert!(missions.iter().all(|m| m["completed"] == true));
}

#[tokio::test]
async fn test_browse_search_and_favorites() {
    let db = setup_test_db().await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;
    let figma = create_resource(&db, program_id, "Figma", "tool", "approved").await;
    create_resource(&db, program_id, "Canva", "tool", "approved").await;
    create_resource(&db, program_id, "Hidden", "tool", "pending").await;
    create_resource(&db, program_id, "Gemini", "ai", "approved").await;

    let (token, _) = register_and_login(&app, &db, "0202020202", "Vera", program_id, None).await;

    let uri = format!("/api/programs/{}/resources/tool", program_id);
    let (status, page) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["num_pages"], 1);

    let (_, searched) = send(&app, "GET", &format!("{}?q=FIG", uri), Some(&token), None).await;
    assert_eq!(searched["total"], 1);
    assert_eq!(searched["resources"][0]["name"], "Figma");

    let favorite_uri = format!("/api/resources/{}/favorite", figma);
    let (_, toggled) = send(&app, "POST", &favorite_uri, Some(&token), None).await;
    assert_eq!(toggled["is_favorited"], true);

    let (_, page) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(page["favorite_ids"], json!([figma]));

    let (_, favorites) = send(&app, "GET", "/api/favorites", Some(&token), None).await;
    assert_eq!(favorites["resources"][0]["id"], figma);

    let (_, toggled) = send(&app, "POST", &favorite_uri, Some(&token), None).await;
    assert_eq!(toggled["is_favorited"], false);
}

#[tokio::test]
async fn test_visit_shows_in_dashboard() {
    let db = setup_test_db().await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;
    let figma = create_resource(&db, program_id, "Figma", "tool", "approved").await;

    let (token, _) = register_and_login(&app, &db, "0303030303", "Lara", program_id, None).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/resources/{}/visit", figma),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, dashboard) = send(&app, "GET", "/api/dashboard", Some(&token), None).await;
    assert_eq!(dashboard["recent_visits"][0]["id"], figma);
    assert_eq!(dashboard["program"]["id"], program_id);
}

#[tokio::test]
async fn test_only_teachers_suggest_and_moderators_approve() {
    let db = setup_test_db().await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;

    let (student, _) = register_and_login(&app, &db, "0404040404", "Sol", program_id, None).await;
    let (teacher, _) =
        register_and_login(&app, &db, "0505050505", "Paz", program_id, Some("teacher")).await;
    let (manager, _) = register_and_login(
        &app,
        &db,
        "0606060606",
        "Rey",
        program_id,
        Some("content_manager"),
    )
    .await;

    let suggestion = json!({
        "name": "Notion",
        "description": "Notes and wikis",
        "url": "https://notion.so",
        "resource_type": "app",
        "program_ids": [program_id]
    });

    let (status, _) = send(
        &app,
        "POST",
        "/api/resources/suggest",
        Some(&student),
        Some(suggestion.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(
        &app,
        "POST",
        "/api/resources/suggest",
        Some(&teacher),
        Some(suggestion.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["resource"]["status"], "pending");
    let resource_id = created["resource"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/resources/suggest",
        Some(&teacher),
        Some(suggestion),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Pending resources are hidden from students
    let detail_uri = format!("/api/resources/{}", resource_id);
    let (status, _) = send(&app, "GET", &detail_uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let status_uri = format!("/api/admin/resources/{}/status", resource_id);
    let (status, _) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&teacher),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, moderated) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&manager),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moderated["resource"]["status"], "approved");

    let (status, detail) = send(&app, "GET", &detail_uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["user_has_rated"], false);
    assert_eq!(detail["resource"]["ideal_use"], json!([]));

    let (_, dashboard) = send(&app, "GET", "/api/dashboard", Some(&manager), None).await;
    assert_eq!(dashboard["pending_resources"], 0);
    assert_eq!(dashboard["top_programs"][0]["id"], program_id);
}

#[tokio::test]
async fn test_mission_admin_requires_admin_and_positive_reward() {
    let db = setup_test_db().await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;

    let (student, _) = register_and_login(&app, &db, "0707070707", "Gil", program_id, None).await;
    let (admin, _) =
        register_and_login(&app, &db, "0808080808", "Roa", program_id, Some("admin")).await;

    let (status, _) = send(&app, "GET", "/api/admin/missions", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = send(&app, "GET", "/api/admin/missions", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["missions"].as_array().unwrap().len(), 4);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/admin/missions/1",
        Some(&admin),
        Some(json!({ "reward_points": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        "PUT",
        "/api/admin/missions/1",
        Some(&admin),
        Some(json!({ "reward_points": 25, "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["mission"]["reward_points"], 25);
    assert_eq!(updated["mission"]["active"], false);
}

#[tokio::test]
async fn test_visit_mission_pays_once_across_detail_and_visit() {
    let db = setup_test_db().await;
    only_active(&db, &["daily_login", "visit_resource"]).await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;
    let figma = create_resource(&db, program_id, "Figma", "tool", "approved").await;

    let (token, login) = register_and_login(&app, &db, "0909090909", "Luna", program_id, None).await;
    assert_eq!(login["login"]["points"], 10);

    let (status, detail) = send(
        &app,
        "GET",
        &format!("/api/resources/{}", figma),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["mission"]["completed"], true);
    assert_eq!(detail["mission"]["points_awarded"], 10);

    let (status, visit) = send(
        &app,
        "POST",
        &format!("/api/resources/{}/visit", figma),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visit["mission"]["completed"], false);
    assert_eq!(visit["mission"]["points_awarded"], 0);

    let (_, dashboard) = send(&app, "GET", "/api/dashboard", Some(&token), None).await;
    assert_eq!(dashboard["points"], 20);
    assert_eq!(dashboard["recent_visits"][0]["id"], figma);
}

#[tokio::test]
async fn test_suggest_mission_pays_teacher_once() {
    let db = setup_test_db().await;
    only_active(&db, &["daily_login", "suggest_resource"]).await;
    let app = test_app(&db);
    let program_id = create_program(&db, "Software").await;

    let (teacher, login) =
        register_and_login(&app, &db, "1010101010", "Ortiz", program_id, Some("teacher")).await;
    assert_eq!(login["login"]["points"], 10);

    let suggestion = |name: &str| {
        json!({
            "name": name,
            "description": "Collaborative whiteboard",
            "url": format!("https://{}.example.com", name.to_lowercase()),
            "resource_type": "tool",
            "program_ids": [program_id]
        })
    };

    let (status, first) = send(
        &app,
        "POST",
        "/api/resources/suggest",
        Some(&teacher),
        Some(suggestion("Miro")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["mission"]["points_awarded"], 10);

    let (status, second) = send(
        &app,
        "POST",
        "/api/resources/suggest",
        Some(&teacher),
        Some(suggestion("Mural")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["mission"]["points_awarded"], 0);

    let (_, dashboard) = send(&app, "GET", "/api/dashboard", Some(&teacher), None).await;
    assert_eq!(dashboard["points"], 20);
    assert_eq!(dashboard["pending_suggestions"], 2);
}
