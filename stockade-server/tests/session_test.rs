//! Session lifecycle: logout and single-active-session policy

mod common;

use axum::http::header::AUTHORIZATION;
use common::{bearer, create_test_server, login, seed_user};
use serde_json::Value;
use stockade_core::Role;

#[tokio::test]
async fn test_logout_invalidates_session() {
    let (server, ctx) = create_test_server();
    seed_user(&ctx, "alice@example.com", Role::Customer);
    let token = login(&server, &ctx, "alice@example.com").await;

    let response = server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);

    // The token is cryptographically intact but its session is gone
    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid session");
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let (server, ctx) = create_test_server();
    seed_user(&ctx, "alice@example.com", Role::Customer);
    let first = login(&server, &ctx, "alice@example.com").await;

    server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, bearer(&first))
        .await
        .assert_status_ok();

    // A fresh login works fine after logout
    let second = login(&server, &ctx, "alice@example.com").await;
    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&second))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_second_login_invalidates_first_token() {
    let (server, ctx) = create_test_server();
    seed_user(&ctx, "alice@example.com", Role::Customer);

    let first = login(&server, &ctx, "alice@example.com").await;
    let second = login(&server, &ctx, "alice@example.com").await;

    // The superseded token is rejected with "invalid session"
    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&first))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid session");

    // The newest token still works
    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&second))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_sessions_are_per_identity() {
    let (server, ctx) = create_test_server();
    seed_user(&ctx, "alice@example.com", Role::Customer);
    seed_user(&ctx, "bob@example.com", Role::Customer);

    let alice = login(&server, &ctx, "alice@example.com").await;
    let bob = login(&server, &ctx, "bob@example.com").await;

    // Bob logging in does not disturb Alice's session
    for token in [&alice, &bob] {
        let response = server
            .get("/api/orders")
            .add_header(AUTHORIZATION, bearer(token))
            .await;
        assert_eq!(response.status_code(), 200);
    }
}
