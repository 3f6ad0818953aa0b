//! Authorization gate behavior at the HTTP surface

mod common;

use axum::http::header::AUTHORIZATION;
use chrono::Duration;
use common::{bearer, create_test_server, login, seed_user};
use serde_json::{json, Value};
use stockade_core::{Role, TokenSigner};

#[tokio::test]
async fn test_missing_token_rejected() {
    let (server, _ctx) = create_test_server();

    let response = server.get("/api/orders").await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["kind"], "authentication");
}

#[tokio::test]
async fn test_malformed_header_rejected() {
    let (server, _ctx) = create_test_server();

    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, "Token abcdef".parse::<axum::http::HeaderValue>().unwrap())
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let (server, ctx) = create_test_server();
    seed_user(&ctx, "alice@example.com", Role::Customer);
    let token = login(&server, &ctx, "alice@example.com").await;

    // Forge a token with a different secret; same generic message as
    // an expired one
    let forged = TokenSigner::new("not-the-server-secret", Duration::hours(1))
        .mint(1, "alice@example.com", Role::Admin, "default_company")
        .unwrap();

    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&forged))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid token");

    // The honest token still works
    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_expired_token_rejected_even_with_live_session() {
    let (server, ctx) = create_test_server();
    let user_id = seed_user(&ctx, "alice@example.com", Role::Customer);

    // Mint an already-expired token with the server's own secret and
    // register it as a live session: the embedded expiry must still win.
    let expired = TokenSigner::new("insecure-dev-secret", Duration::seconds(-60))
        .mint(user_id, "alice@example.com", Role::Customer, "default_company")
        .unwrap();
    ctx.state.sessions.create(user_id, &expired).await.unwrap();

    let response = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&expired))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid token");
}

#[tokio::test]
async fn test_role_gating_per_endpoint() {
    let (server, ctx) = create_test_server();
    seed_user(&ctx, "admin@co.example.com", Role::Admin);
    seed_user(&ctx, "clerk@co.example.com", Role::Clerk);
    seed_user(&ctx, "buyer@co.example.com", Role::Customer);

    let admin = login(&server, &ctx, "admin@co.example.com").await;
    let clerk = login(&server, &ctx, "clerk@co.example.com").await;
    let customer = login(&server, &ctx, "buyer@co.example.com").await;

    // /api/companies is admin-only
    for (token, expected) in [(&admin, 200), (&clerk, 403), (&customer, 403)] {
        let response = server
            .get("/api/companies")
            .add_header(AUTHORIZATION, bearer(token))
            .await;
        assert_eq!(response.status_code(), expected);
    }

    // Placing orders is customer-only
    let order_body = json!({ "items": [{ "item_id": "x", "quantity": 1 }] });
    for token in [&admin, &clerk] {
        let response = server
            .post("/api/orders")
            .add_header(AUTHORIZATION, bearer(token))
            .json(&order_body)
            .await;
        assert_eq!(response.status_code(), 403);
        let body: Value = response.json();
        assert_eq!(body["error"], "insufficient permissions");
        assert_eq!(body["kind"], "authorization");
    }

    // Inventory is open to admin and clerk, closed to customers
    let item_body = json!({
        "name": "Widget",
        "category": "general",
        "quantity": 5,
        "price": 1.25
    });
    for (token, expected) in [(&admin, 200), (&clerk, 200), (&customer, 403)] {
        let response = server
            .post("/api/inventory")
            .add_header(AUTHORIZATION, bearer(token))
            .json(&item_body)
            .await;
        assert_eq!(response.status_code(), expected);
    }
}
