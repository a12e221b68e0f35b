mod common;

use axum::http::{Method, StatusCode};
use common::{raw_authorization, TestApp, ADMIN_EMAIL};
use parts_core::Collection;
use serde_json::{json, Value};

#[tokio::test]
async fn admin_route_without_header_is_unauthorized() {
    let app = TestApp::new();

    app.server
        .get("/users")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_without_token_is_unauthorized() {
    let app = TestApp::new();
    let (name, value) = raw_authorization("Bearer");

    app.server
        .get("/orders")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_signature_is_forbidden() {
    let app = TestApp::new();
    let (name, value) = raw_authorization("Bearer not.a.jwt");

    app.server
        .get("/users")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn token_from_another_secret_is_forbidden() {
    let app = TestApp::new();
    app.seed_user(ADMIN_EMAIL, Some("admin")).await;
    let foreign = parts_api::auth::TokenService::new("someone-else").issue(ADMIN_EMAIL).unwrap();

    app.server
        .get("/users")
        .authorization_bearer(foreign)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_admin_is_forbidden_on_admin_routes() {
    let app = TestApp::new();
    app.seed_user("ann@parts.io", None).await;
    let token = app.token_for("ann@parts.io");

    app.server
        .get("/users")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post("/product")
        .authorization_bearer(&token)
        .json(&json!({"name": "Gear"}))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    assert_eq!(app.store.count(Collection::Products).await, 0);
}

#[tokio::test]
async fn verified_token_for_unknown_user_is_forbidden_on_admin_routes() {
    let app = TestApp::new();
    let token = app.token_for("ghost@parts.io");

    app.server
        .get("/orders")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

fn admin_routes() -> Vec<(Method, &'static str)> {
    vec![
        (Method::POST, "/product"),
        (Method::DELETE, "/product/missing"),
        (Method::GET, "/orders"),
        (Method::PATCH, "/order/shipped/missing"),
        (Method::GET, "/users"),
        (Method::PUT, "/user/admin/carl@parts.io"),
    ]
}

#[tokio::test]
async fn every_admin_route_checks_token_then_role() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.seed_user("ann@parts.io", None).await;
    app.seed_user("carl@parts.io", None).await;
    let user = app.token_for("ann@parts.io");

    for (method, path) in admin_routes() {
        let body = json!({"name": "Gear"});

        app.server
            .method(method.clone(), path)
            .json(&body)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        app.server
            .method(method.clone(), path)
            .authorization_bearer(&user)
            .json(&body)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        app.server
            .method(method, path)
            .authorization_bearer(&admin)
            .json(&body)
            .await
            .assert_status_ok();
    }

    assert_eq!(app.store.count(Collection::Products).await, 1);
}

#[tokio::test]
async fn user_cannot_grant_themselves_admin() {
    let app = TestApp::new();
    app.seed_user("ann@parts.io", None).await;
    let token = app.token_for("ann@parts.io");

    app.server
        .put("/user/admin/ann@parts.io")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let status = app
        .server
        .get("/admin/ann@parts.io")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(status, json!({"admin": false}));
}

#[tokio::test]
async fn admin_passes_admin_routes() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let users = app
        .server
        .get("/users")
        .authorization_bearer(token)
        .await
        .json::<Vec<Value>>();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn user_routes_need_only_a_valid_token() {
    let app = TestApp::new();
    let token = app.token_for("nobody-stored@parts.io");

    app.server
        .get("/product/missing")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/product/missing")
        .authorization_bearer(token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), Value::Null);
}

#[tokio::test]
async fn upsert_issues_token_that_passes_verification() {
    let app = TestApp::new();

    let body = app
        .server
        .put("/user/ann@parts.io")
        .json(&json!({"name": "Ann"}))
        .await
        .json::<Value>();
    let token = body["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let status = app
        .server
        .get("/admin/ann@parts.io")
        .authorization_bearer(token)
        .await
        .json::<Value>();
    assert_eq!(status, json!({"admin": false}));
}

#[tokio::test]
async fn grant_then_check_admin() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.seed_user("ann@parts.io", None).await;

    let result = app
        .server
        .put("/user/admin/ann@parts.io")
        .authorization_bearer(&admin)
        .await
        .json::<Value>();
    assert_eq!(result["matchedCount"], 1);

    let status = app
        .server
        .get("/admin/ann@parts.io")
        .authorization_bearer(app.token_for("ann@parts.io"))
        .await
        .json::<Value>();
    assert_eq!(status, json!({"admin": true}));

    // The new admin can now reach admin routes
    app.server
        .get("/orders")
        .authorization_bearer(app.token_for("ann@parts.io"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn admin_check_for_unknown_email_is_false() {
    let app = TestApp::new();

    let status = app
        .server
        .get("/admin/ghost@parts.io")
        .authorization_bearer(app.token_for("ann@parts.io"))
        .await
        .json::<Value>();
    assert_eq!(status, json!({"admin": false}));
}

#[tokio::test]
async fn profile_update_cannot_grant_admin() {
    let app = TestApp::new();

    let body = app
        .server
        .put("/user/mallory@parts.io")
        .json(&json!({"role": "admin", "email": "boss@parts.io"}))
        .await
        .json::<Value>();
    let token = body["token"].as_str().unwrap().to_string();

    let user = app.server.get("/user/mallory@parts.io").await.json::<Value>();
    assert_eq!(user["email"], "mallory@parts.io");
    assert!(user.get("role").is_none());

    app.server
        .get("/users")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
