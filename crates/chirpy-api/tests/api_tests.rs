//! API Integration Tests
//!
//! Every test drives the full router over the in-memory store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chirpy_api::auth::validate_access_token;
use chirpy_api::{create_router_for_testing, create_router_for_testing_with, test_config};
use chirpy_core::Platform;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret";

/// Helper to create a test request
fn create_json_request(
    method: &str,
    uri: &str,
    body: Option<Value>,
    authorization: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Request with a body sent verbatim, for payloads that are not valid JSON
fn create_raw_request(
    method: &str,
    uri: &str,
    body: &str,
    authorization: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

async fn create_user(app: &Router, email: &str, password: &str) -> Value {
    let (status, json) = send_json(
        app,
        create_json_request(
            "POST",
            "/api/users",
            Some(json!({ "email": email, "password": password })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send_json(
        app,
        create_json_request(
            "POST",
            "/api/login",
            Some(json!({ "email": email, "password": password })),
            None,
        ),
    )
    .await
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_healthz() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_router_for_testing();

    let (status, json) = send_json(
        &app,
        create_json_request("GET", "/api-docs/openapi.json", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/login"].is_object());
}

// =============================================================================
// User Tests
// =============================================================================

#[tokio::test]
async fn test_create_user_hides_password_hash() {
    let app = create_router_for_testing();

    let user = create_user(&app, "a@x.com", "secret").await;

    assert_eq!(user["email"], "a@x.com");
    assert!(Uuid::parse_str(user["id"].as_str().unwrap()).is_ok());
    assert!(user["created_at"].is_string());
    assert!(user["updated_at"].is_string());
    assert!(user.get("hashed_password").is_none());
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let app = create_router_for_testing();
    create_user(&app, "a@x.com", "secret").await;

    let (status, json) = send_json(
        &app,
        create_json_request(
            "POST",
            "/api/users",
            Some(json!({ "email": "a@x.com", "password": "other" })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_create_user_invalid_email() {
    let app = create_router_for_testing();

    let (status, _) = send_json(
        &app,
        create_json_request(
            "POST",
            "/api/users",
            Some(json!({ "email": "not-an-email", "password": "secret" })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user() {
    let app = create_router_for_testing();
    let user = create_user(&app, "a@x.com", "secret").await;
    let (_, session) = login(&app, "a@x.com", "secret").await;
    let token = session["token"].as_str().unwrap();

    let (status, updated) = send_json(
        &app,
        create_json_request(
            "PUT",
            "/api/users",
            Some(json!({ "email": "b@x.com", "password": "new-secret" })),
            Some(&bearer(token)),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], user["id"]);
    assert_eq!(updated["email"], "b@x.com");

    let (status, _) = login(&app, "a@x.com", "secret").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "b@x.com", "new-secret").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_user_requires_access_token() {
    let app = create_router_for_testing();
    create_user(&app, "a@x.com", "secret").await;
    let (_, session) = login(&app, "a@x.com", "secret").await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let body = json!({ "email": "b@x.com", "password": "new-secret" });

    let (status, _) = send(
        &app,
        create_json_request("PUT", "/api/users", Some(body.clone()), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A refresh token is not accepted where an access token is required
    let (status, _) = send(
        &app,
        create_json_request("PUT", "/api/users", Some(body), Some(&bearer(refresh_token))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Session Tests
// =============================================================================

#[tokio::test]
async fn test_login_returns_user_and_tokens() {
    let app = create_router_for_testing();
    let user = create_user(&app, "a@x.com", "secret").await;

    let (status, session) = login(&app, "a@x.com", "secret").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["id"], user["id"]);
    assert_eq!(session["email"], "a@x.com");
    assert!(session["created_at"].is_string());
    assert!(session["updated_at"].is_string());

    let user_id = Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();
    let token = session["token"].as_str().unwrap();
    assert_eq!(validate_access_token(token, SECRET).unwrap(), user_id);

    let refresh_token = session["refresh_token"].as_str().unwrap();
    assert_eq!(refresh_token.len(), 64);
    assert!(refresh_token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = create_router_for_testing();
    create_user(&app, "a@x.com", "secret").await;

    let (wrong_status, wrong_password) = login(&app, "a@x.com", "Secret").await;
    let (unknown_status, unknown_email) = login(&app, "nobody@x.com", "secret").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_login_with_undecodable_body_is_uniform() {
    let app = create_router_for_testing();
    create_user(&app, "a@x.com", "secret").await;
    let (_, wrong_password) = login(&app, "a@x.com", "Secret").await;

    for body in ["{not json", r#"{"email":"a@x.com"}"#, r#"{"email":1,"password":2}"#] {
        let (status, json) =
            send_json(&app, create_raw_request("POST", "/api/login", body, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "body: {body}");
        assert_eq!(json, wrong_password, "body: {body}");
    }
}

#[tokio::test]
async fn test_refresh_issues_access_token_for_same_user() {
    let app = create_router_for_testing();
    let user = create_user(&app, "a@x.com", "secret").await;
    let (_, session) = login(&app, "a@x.com", "secret").await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let (status, json) = send_json(
        &app,
        create_json_request("POST", "/api/refresh", None, Some(&bearer(refresh_token))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let user_id = Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();
    let token = json["token"].as_str().unwrap();
    assert_eq!(validate_access_token(token, SECRET).unwrap(), user_id);

    // Not rotated: the same refresh token keeps working
    let (status, _) = send(
        &app,
        create_json_request("POST", "/api/refresh", None, Some(&bearer(refresh_token))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejections() {
    let app = create_router_for_testing();

    for authorization in [None, Some("Bearer deadbeef"), Some("bearer deadbeef")] {
        let (status, _) = send(
            &app,
            create_json_request("POST", "/api/refresh", None, authorization),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_revoke_is_idempotent_and_blocks_refresh() {
    let app = create_router_for_testing();
    create_user(&app, "a@x.com", "secret").await;
    let (_, session) = login(&app, "a@x.com", "secret").await;
    let authorization = bearer(session["refresh_token"].as_str().unwrap());

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            create_json_request("POST", "/api/revoke", None, Some(&authorization)),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    let (status, _) = send(
        &app,
        create_json_request("POST", "/api/refresh", None, Some(&authorization)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoke_unknown_token() {
    let app = create_router_for_testing();

    let (status, _) = send(
        &app,
        create_json_request("POST", "/api/revoke", None, Some("Bearer deadbeef")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, create_json_request("POST", "/api/revoke", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_access_token_rejected() {
    let mut config = test_config();
    config.auth.access_token_ttl_secs = 0;
    let app = create_router_for_testing_with(config);

    create_user(&app, "a@x.com", "secret").await;
    let (status, session) = login(&app, "a@x.com", "secret").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/api/chirps",
            Some(json!({ "body": "hello" })),
            Some(&bearer(session["token"].as_str().unwrap())),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Chirp Tests
// =============================================================================

async fn access_token(app: &Router, email: &str) -> (String, Value) {
    let user = create_user(app, email, "secret").await;
    let (_, session) = login(app, email, "secret").await;
    (session["token"].as_str().unwrap().to_string(), user)
}

async fn post_chirp(app: &Router, token: &str, body: &str) -> (StatusCode, Value) {
    send_json(
        app,
        create_json_request(
            "POST",
            "/api/chirps",
            Some(json!({ "body": body })),
            Some(&bearer(token)),
        ),
    )
    .await
}

#[tokio::test]
async fn test_create_chirp_masks_profanity() {
    let app = create_router_for_testing();
    let (token, user) = access_token(&app, "a@x.com").await;

    let (status, chirp) = post_chirp(&app, &token, "What a Kerfuffle this is, fornax!").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chirp["body"], "What a **** this is, fornax!");
    assert_eq!(chirp["user_id"], user["id"]);
    assert!(chirp["id"].is_string());
}

#[tokio::test]
async fn test_create_chirp_length_limit() {
    let app = create_router_for_testing();
    let (token, _) = access_token(&app, "a@x.com").await;

    let (status, _) = post_chirp(&app, &token, &"a".repeat(140)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = post_chirp(&app, &token, &"a".repeat(141)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Chirp is too long");
}

#[tokio::test]
async fn test_create_chirp_requires_auth() {
    let app = create_router_for_testing();

    let (status, _) = send(
        &app,
        create_json_request("POST", "/api/chirps", Some(json!({ "body": "hi" })), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post_chirp(&app, "not.a.jwt", "hi").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_gets_api_error_body() {
    let app = create_router_for_testing();
    let (token, _) = access_token(&app, "a@x.com").await;
    let auth = bearer(&token);

    let requests = [
        create_raw_request("POST", "/api/users", "{not json", None),
        create_raw_request("POST", "/api/users", r#"{"email":"b@x.com"}"#, None),
        create_raw_request("PUT", "/api/users", "{not json", Some(&auth)),
        create_raw_request("POST", "/api/chirps", "{not json", Some(&auth)),
        create_raw_request("POST", "/api/chirps", r#"{"body":42}"#, Some(&auth)),
    ];

    for request in requests {
        let uri = request.uri().to_string();
        let (status, json) = send_json(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(json["code"], "BAD_REQUEST", "uri: {uri}");
        assert!(json["error"].is_string(), "uri: {uri}");
    }
}

#[tokio::test]
async fn test_list_and_get_chirps() {
    let app = create_router_for_testing();
    let (token, _) = access_token(&app, "a@x.com").await;

    let (_, first) = post_chirp(&app, &token, "first").await;
    let (_, second) = post_chirp(&app, &token, "second").await;

    let (status, list) = send_json(&app, create_json_request("GET", "/api/chirps", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["first", "second"]);

    let uri = format!("/api/chirps/{}", second["id"].as_str().unwrap());
    let (status, chirp) = send_json(&app, create_json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chirp["body"], "second");
    assert_ne!(chirp["id"], first["id"]);
}

#[tokio::test]
async fn test_get_chirp_not_found() {
    let app = create_router_for_testing();

    let (status, _) = send(&app, create_json_request("GET", "/api/chirps/not-a-uuid", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/chirps/{}", Uuid::new_v4());
    let (status, _) = send(&app, create_json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Admin Tests
// =============================================================================

async fn metrics_page(app: &Router) -> String {
    let (status, body) = send(app, create_json_request("GET", "/admin/metrics", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    String::from_utf8(body).unwrap()
}

#[tokio::test]
async fn test_fileserver_hits_counted() {
    let app = create_router_for_testing();
    assert!(metrics_page(&app).await.contains("visited 0 times"));

    for _ in 0..3 {
        send(&app, create_json_request("GET", "/app/", None, None)).await;
    }

    assert!(metrics_page(&app).await.contains("visited 3 times"));
}

#[tokio::test]
async fn test_reset_wipes_state() {
    let app = create_router_for_testing();
    let (token, _) = access_token(&app, "a@x.com").await;
    post_chirp(&app, &token, "hello").await;
    send(&app, create_json_request("GET", "/app/", None, None)).await;

    let (status, body) = send(&app, create_json_request("POST", "/admin/reset", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "Hits: 0");

    assert!(metrics_page(&app).await.contains("visited 0 times"));
    let (status, _) = login(&app, "a@x.com", "secret").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, list) = send_json(&app, create_json_request("GET", "/api/chirps", None, None)).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_reset_forbidden_outside_dev() {
    let mut config = test_config();
    config.server.platform = Platform::Prod;
    let app = create_router_for_testing_with(config);

    let (status, _) = send(&app, create_json_request("POST", "/admin/reset", None, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reset_requires_configured_api_key() {
    let mut config = test_config();
    config.auth.admin_api_key = Some("admin-key".to_string());
    let app = create_router_for_testing_with(config);

    for authorization in [None, Some("ApiKey wrong-key"), Some("Bearer admin-key")] {
        let (status, _) = send(
            &app,
            create_json_request("POST", "/admin/reset", None, authorization),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _) = send(
        &app,
        create_json_request("POST", "/admin/reset", None, Some("ApiKey admin-key")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
