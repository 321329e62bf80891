use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use crewbase::api::{AppState, build_router};
use crewbase::config::Config;
use crewbase::db::Store;

/// Default admin seeded by the initial migration (must match m20250901_initial.rs)
const ADMIN_EMAIL: &str = "admin@company.com";
const ADMIN_PASSWORD: &str = "changeme";

async fn spawn_app() -> (Router, Store) {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
    config.uploads.path = std::env::temp_dir()
        .join("crewbase-api-tests")
        .to_string_lossy()
        .into_owned();

    // Single connection so every request sees the same in-memory database
    let store = Store::with_pool_options(&config.database.url, 1, 1)
        .await
        .expect("Failed to create store");

    let state = AppState::new(Arc::new(config), store.clone());
    (build_router(state), store)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_employee(app: &Router, token: &str, email: &str, department: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/employees",
            Some(token),
            &json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "email": email,
                "department": department,
                "position": "Engineer",
                "salary": 50000
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_login_and_me() {
    let (app, _store) = spawn_app().await;

    // Wrong password and unknown email both get the same undifferentiated 401
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid credentials");

    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["role"], "admin");

    // Missing and garbage tokens are both 401 with distinct messages
    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing authentication token");

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some("not.a.token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_register_defaults_and_role_gate() {
    let (app, _store) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "name": "Regular User",
                "email": "USER@example.com",
                "password": "secret123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["role"], "user");
    // Emails are lowercased on the way in
    assert_eq!(body["data"]["user"]["email"], "user@example.com");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Same email again, any casing, is a conflict
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "name": "Dup",
                "email": "user@example.com",
                "password": "secret123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A plain user can read employees but not create them
    let response = app
        .clone()
        .oneshot(get_request("/api/employees", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/employees",
            Some(&token),
            &json!({ "firstName": "X" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_password_change() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/auth/password",
            Some(&token),
            &json!({ "currentPassword": "wrong", "newPassword": "brand-new-pass" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/auth/password",
            Some(&token),
            &json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "brand-new-pass" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, new one does
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    login(&app, ADMIN_EMAIL, "brand-new-pass").await;
}

#[tokio::test]
async fn test_config_typed_round_trip() {
    let (app, store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Entry listings return the value as stored; only value reads coerce.
    // A number saved as its string form reads back as a number.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "retry_limit", "value": "100", "type": "number" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["value"], json!("100"));

    assert_eq!(
        store.get_config_value("retry_limit").await.unwrap(),
        Some(json!(100))
    );

    let response = app
        .clone()
        .oneshot(get_request("/api/config/retry_limit", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["value"], json!("100"));
    assert_eq!(body["data"]["type"], "number");

    // Arrays saved as JSON text are parsed; garbage falls back to empty
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "flags", "value": "[1,2,3]", "type": "array" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        store.get_config_value("flags").await.unwrap(),
        Some(json!([1, 2, 3]))
    );

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "flags", "value": "not json", "type": "array" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        store.get_config_value("flags").await.unwrap(),
        Some(json!([]))
    );

    // Booleans are strict: only true / "true" are true
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "feature_on", "value": "yes", "type": "boolean" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        store.get_config_value("feature_on").await.unwrap(),
        Some(json!(false))
    );
}

#[tokio::test]
async fn test_config_type_defaults_to_string() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "motd", "value": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["type"], "string");
}

#[tokio::test]
async fn test_valid_to_must_be_rfc3339() {
    let (app, store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // A malformed timestamp must not be accepted (it would otherwise
    // compare greater than any real date and never expire)
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "oddity", "value": "x", "type": "string", "validTo": "banana" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"validTo"));

    // Non-UTC offsets are normalized before storage, so the window is
    // evaluated by instant, not by wall-clock text
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({
                "key": "offset_expiry",
                "value": "x",
                "type": "string",
                "validTo": "2020-01-01T00:00:00+10:00"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["validTo"], "2019-12-31T14:00:00+00:00");
    assert_eq!(store.get_config_value("offset_expiry").await.unwrap(), None);
}

#[tokio::test]
async fn test_config_validation_is_collected() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "Bad-Key", "type": "decimal" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    let errors = body["errors"].as_array().unwrap();
    // Bad key, unknown type, missing value: all reported at once
    assert_eq!(errors.len(), 3);
}

#[tokio::test]
async fn test_public_configs_projection() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for (key, public) in [("site_title", true), ("internal_flag", false)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/config",
                Some(&token),
                &json!({ "key": key, "value": "x", "type": "string", "isPublic": public }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // No token needed
    let response = app
        .clone()
        .oneshot(get_request("/api/config/public", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["key"], "site_title");
    // Projection only: internal columns are not leaked
    assert!(items[0].get("isEditable").is_none());
    assert!(items[0].get("updatedBy").is_none());
}

#[tokio::test]
async fn test_valid_to_soft_expiry() {
    let (app, store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({
                "key": "promo_banner",
                "value": "Sale!",
                "type": "string",
                "category": "marketing",
                "validTo": "2020-01-01T00:00:00+00:00"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Expired entries read as absent, but the row itself still exists
    assert_eq!(store.get_config_value("promo_banner").await.unwrap(), None);

    let response = app
        .clone()
        .oneshot(get_request("/api/config/category/marketing", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"].get("promo_banner").is_none());

    let response = app
        .clone()
        .oneshot(get_request("/api/config/promo_banner", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_initialize_defaults_is_idempotent() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config/initialize",
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let created = body["data"]["created"].as_u64().unwrap();
    assert!(created > 0);

    // Customize one entry, then re-run: nothing is overwritten
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "app_name", "value": "Custom Name", "type": "string" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config/initialize",
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["created"], json!(0));

    let response = app
        .clone()
        .oneshot(get_request("/api/config/app_name", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["value"], "Custom Name");
}

#[tokio::test]
async fn test_employee_lifecycle() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let created = create_employee(&app, &token, "jane@example.com", "Engineering").await;
    let id = created["data"]["id"].as_i64().unwrap();
    let code = created["data"]["employeeId"].as_str().unwrap();
    assert!(code.starts_with("EMP"), "unexpected code {code}");
    assert_eq!(created["data"]["status"], "active");
    assert_eq!(created["data"]["profileImage"], "default-avatar.png");

    // Duplicate active email is a conflict
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/employees",
            Some(&token),
            &json!({
                "firstName": "Other",
                "lastName": "Person",
                "email": "JANE@example.com",
                "department": "Sales",
                "position": "Rep",
                "salary": 1
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Soft delete hides the row from default listings
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/employees/{id}"),
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/employees", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["total"], json!(0));

    let response = app
        .clone()
        .oneshot(get_request("/api/employees?showDeleted=true", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["total"], json!(1));

    let response = app
        .clone()
        .oneshot(get_request("/api/employees?status=deleted", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["employees"][0]["id"], json!(id));

    // Direct fetch still works on a deleted row
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/employees/{id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "deleted");
    assert!(body["data"]["deletedAt"].is_string());

    // Email is free for reuse while the original is deleted
    let reused = create_employee(&app, &token, "jane@example.com", "Sales").await;
    assert_ne!(reused["data"]["id"], json!(id));

    // Restore always lands on active
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/employees/{id}/restore"),
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "active");
    assert!(body["data"]["deletedAt"].is_null());

    // Hard delete removes the row entirely
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/employees/{id}/permanent"),
            Some(&token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/employees/{id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_employee_validation_and_partial_update() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/employees",
            Some(&token),
            &json!({ "email": "bad-email", "salary": -5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"firstName"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"salary"));

    let created = create_employee(&app, &token, "merge@example.com", "Engineering").await;
    let id = created["data"]["id"].as_i64().unwrap();

    // Address merges field-wise across partial updates
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/employees/{id}"),
            Some(&token),
            &json!({ "address": { "city": "Berlin" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/employees/{id}"),
            Some(&token),
            &json!({ "address": { "country": "Germany" }, "salary": 60000 }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["address"]["city"], "Berlin");
    assert_eq!(body["data"]["address"]["country"], "Germany");
    assert_eq!(body["data"]["salary"], json!(60000.0));
}

#[tokio::test]
async fn test_page_size_comes_from_config() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Stored as a string, declared a number: coercion drives paging
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "max_page_size", "value": "2", "type": "number" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for i in 0..3 {
        create_employee(&app, &token, &format!("p{i}@example.com"), "Engineering").await;
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/employees?limit=50", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["limit"], json!(2));
    assert_eq!(body["data"]["pagination"]["pages"], json!(2));
    assert_eq!(body["data"]["employees"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_zero_max_page_size_does_not_break_listing() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // An admin can store a nonsensical cap; listing must survive it
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/config",
            Some(&token),
            &json!({ "key": "max_page_size", "value": 0, "type": "number" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    create_employee(&app, &token, "cap@example.com", "Engineering").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/employees?limit=5", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["limit"], json!(1));
    assert_eq!(body["data"]["pagination"]["total"], json!(1));
}

#[tokio::test]
async fn test_update_of_missing_employee_is_not_found() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    create_employee(&app, &token, "taken@example.com", "Engineering").await;

    // Even with an email that is already in use, a missing id is a 404
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/employees/424242",
            Some(&token),
            &json!({ "email": "taken@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sequence_increments_are_unique() {
    let (_app, store) = spawn_app().await;

    let tasks = (0..20).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { store.increment_sequence("stress").await.unwrap() })
    });

    let mut values: Vec<i64> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    values.sort_unstable();
    let expected: Vec<i64> = (values[0]..values[0] + 20).collect();
    assert_eq!(values, expected, "sequence values must be consecutive and unique");
}

#[tokio::test]
async fn test_stats_and_positions() {
    let (app, _store) = spawn_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    create_employee(&app, &token, "a@example.com", "Engineering").await;
    create_employee(&app, &token, "b@example.com", "Engineering").await;
    create_employee(&app, &token, "c@example.com", "Sales").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/employees/stats", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totalEmployees"], json!(3));
    assert_eq!(body["data"]["totalSalary"], json!(150_000.0));
    // Department groups come back sorted by descending headcount
    assert_eq!(body["data"]["byDepartment"][0]["department"], "Engineering");
    assert_eq!(body["data"]["byDepartment"][0]["count"], json!(2));

    let response = app
        .clone()
        .oneshot(get_request("/api/employees/positions", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"], json!(["Engineer"]));
}
