use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use kanban::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.jwt_secret = "test-secret-for-api-tests".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = kanban::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    kanban::api::router(state)
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
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Creates the root user and returns an access token for it.
async fn bootstrap_root(app: &Router) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/setup/root-user",
        None,
        Some(json!({"username": "admin", "password": "admin123", "name": "Admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    login(app, "admin", "admin123").await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn login(app: &Router, username: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"].clone()
}

async fn create_column(app: &Router, token: &str, title: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/columns",
        Some(token),
        Some(json!({"title": title})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "column create failed: {body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn create_task(app: &Router, token: &str, column_id: i64, title: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/tasks",
        Some(token),
        Some(json!({"title": title, "column_id": column_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "task create failed: {body}");
    body["data"].clone()
}

#[tokio::test]
async fn test_health_and_auth_required() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], true);

    let (status, body) = send(&app, "GET", "/api/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "GET", "/api/tasks", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_setup_flow() {
    let app = spawn_app().await;

    let (_, body) = send(&app, "GET", "/api/setup/status", None, None).await;
    assert_eq!(body["data"]["setup_complete"], false);

    let (_, body) = send(&app, "GET", "/api/setup/settings", None, None).await;
    assert_eq!(body["data"]["app_name"], "Offline Kanban");
    assert_eq!(body["data"]["default_theme"], "system");

    let token = bootstrap_root(&app).await;

    let (_, body) = send(&app, "GET", "/api/setup/status", None, None).await;
    assert_eq!(body["data"]["setup_complete"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/api/setup/root-user",
        None,
        Some(json!({"username": "second", "password": "password"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "admin");
    assert_eq!(body["data"]["user"]["is_root"], true);
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = spawn_app().await;
    bootstrap_root(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "admin", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_refresh_token_rotation_and_logout() {
    let app = spawn_app().await;
    bootstrap_root(&app).await;

    let session = login(&app, "admin", "admin123").await;
    let refresh_token = session["refresh_token"].as_str().unwrap().to_string();
    assert_eq!(session["token_type"], "Bearer");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({"refresh_token": refresh_token})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh_token);

    // A refresh token is good for one exchange only.
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({"refresh_token": refresh_token})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/logout",
        None,
        Some(json!({"refresh_token": rotated})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({"refresh_token": rotated})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_board_flow() {
    let app = spawn_app().await;
    let token = bootstrap_root(&app).await;

    let todo = create_column(&app, &token, "Todo").await;
    let done = create_column(&app, &token, "Done").await;

    let first = create_task(&app, &token, todo, "Write spec").await;
    assert_eq!(first["position"], 1);
    assert_eq!(first["column_title"], "Todo");
    let second = create_task(&app, &token, todo, "Review spec").await;
    assert_eq!(second["position"], 2);

    let first_id = first["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tasks/{first_id}/move"),
        Some(&token),
        Some(json!({"column_id": done, "position": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["column_id"], done);
    assert_eq!(body["data"]["position"], 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/tasks?column_id={todo}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["position"], 1);

    let (_, body) = send(&app, "GET", "/api/columns", Some(&token), None).await;
    let counts: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["task_count"].as_i64().unwrap())
        .collect();
    assert_eq!(counts, vec![1, 1]);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/activities/task/{first_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let history = body["data"].as_array().unwrap();
    assert_eq!(history[0]["action"], "moved");
    assert_eq!(history[0]["old_value"], "Todo");
    assert_eq!(history[0]["new_value"], "Done");
    assert_eq!(history[0]["user"]["username"], "admin");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/columns/{todo}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "cannot delete column with existing tasks");
}

#[tokio::test]
async fn test_update_task_clears_assignee_with_null() {
    let app = spawn_app().await;
    let token = bootstrap_root(&app).await;
    let todo = create_column(&app, &token, "Todo").await;
    let task = create_task(&app, &token, todo, "Assign me").await;
    let task_id = task["id"].as_i64().unwrap();
    let root_id = task["created_by"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{task_id}"),
        Some(&token),
        Some(json!({"assigned_to": root_id, "priority": "high", "due_date": "2030-01-01T09:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assigned_to"], root_id);
    assert_eq!(body["data"]["assignee"]["name"], "Admin");
    assert_eq!(body["data"]["priority"], "high");

    // Absent fields stay untouched; explicit null clears.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{task_id}"),
        Some(&token),
        Some(json!({"assigned_to": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["assigned_to"].is_null());
    assert_eq!(body["data"]["priority"], "high");
    assert_eq!(body["data"]["due_date"], "2030-01-01T09:00:00Z");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{task_id}"),
        Some(&token),
        Some(json!({"due_date": "soon"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_member_permissions() {
    let app = spawn_app().await;
    let root = bootstrap_root(&app).await;
    let todo = create_column(&app, &root, "Todo").await;
    let root_task = create_task(&app, &root, todo, "Root's task").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&root),
        Some(json!({"username": "member", "password": "member1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let member = login(&app, "member", "member1").await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/columns",
        Some(&member),
        Some(json!({"title": "Sneaky"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/users", Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/users/search?q=adm", Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["username"], "admin");

    let root_task_id = root_task["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{root_task_id}"),
        Some(&member),
        Some(json!({"title": "Taken over"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Moving is open to every member.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/tasks/{root_task_id}/move"),
        Some(&member),
        Some(json!({"column_id": todo, "position": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let own = create_task(&app, &member, todo, "Member's task").await;
    let own_id = own["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/admin/tasks/{own_id}"),
        Some(&member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/admin/tasks/{own_id}"),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_archived_user_loses_access() {
    let app = spawn_app().await;
    let root = bootstrap_root(&app).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(&root),
        Some(json!({"username": "leaver", "password": "leaver1"})),
    )
    .await;
    let user_id = body["data"]["id"].as_i64().unwrap();
    let session = login(&app, "leaver", "leaver1").await;
    let access = session["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/users/{user_id}/archive"),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/auth/verify", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({"refresh_token": session["refresh_token"]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validation_errors() {
    let app = spawn_app().await;
    let token = bootstrap_root(&app).await;
    let todo = create_column(&app, &token, "Todo").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({"title": "ab", "column_id": todo})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(&token),
        Some(json!({"title": "Valid title", "column_id": 9999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/tasks?limit=500", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/tasks/424242", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/activities/prune",
        Some(&token),
        Some(json!({"days": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_settings_update_is_root_only() {
    let app = spawn_app().await;
    let token = bootstrap_root(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(&token),
        Some(json!({"app_name": "Team Board", "default_theme": "dark"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["app_name"], "Team Board");
    assert_eq!(body["data"]["default_theme"], "dark");

    let (_, body) = send(&app, "GET", "/api/setup/settings", None, None).await;
    assert_eq!(body["data"]["app_name"], "Team Board");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(&token),
        Some(json!({"default_theme": "neon"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
