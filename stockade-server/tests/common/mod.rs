//! Common test utilities for server integration tests

use std::sync::{Arc, RwLock};

use axum_test::TestServer;
use serde_json::{json, Value};
use stockade_core::Role;
use stockade_server::store::sqlite::DEFAULT_COMPANY_ID;
use stockade_server::users::CreateUser;
use stockade_server::{
    routes, AppState, CodeDispatcher, Config, MemoryCache, SqliteRepository,
};

/// Password used for every seeded user
pub const PASSWORD: &str = "Sup3r@Secret!pw";

/// Mock dispatcher that captures login codes
#[derive(Default, Clone)]
pub struct MockDispatcher {
    /// Captured (email, code) pairs
    pub sent: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get the last code sent to an email
    pub fn last_code(&self, email: &str) -> Option<String> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(e, _)| e == email)
            .map(|(_, c)| c.clone())
    }

    /// How many codes were sent to an email
    pub fn count_for(&self, email: &str) -> usize {
        self.sent
            .read()
            .unwrap()
            .iter()
            .filter(|(e, _)| e == email)
            .count()
    }
}

impl CodeDispatcher for MockDispatcher {
    fn send_login_code(&self, email: &str, code: &str) -> Result<(), String> {
        self.sent
            .write()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct TestContext {
    pub state: Arc<AppState<SqliteRepository, MockDispatcher>>,
    pub dispatcher: MockDispatcher,
}

/// Create a test server with a fresh in-memory database and mock dispatcher
pub fn create_test_server() -> (TestServer, TestContext) {
    let config = Config::default();

    let repo = SqliteRepository::open_in_memory().expect("Failed to open in-memory database");
    repo.ensure_default_company()
        .expect("Failed to seed default company");

    let dispatcher = MockDispatcher::new();
    let state = Arc::new(AppState::new(
        &config,
        repo,
        Arc::new(MemoryCache::new()),
        dispatcher.clone(),
    ));

    let app = routes::create_router(Arc::clone(&state));
    let server = TestServer::new(app).expect("Failed to create test server");

    (server, TestContext { state, dispatcher })
}

/// Seed a user in the default company, returning its id
pub fn seed_user(ctx: &TestContext, email: &str, role: Role) -> i64 {
    ctx.state
        .users
        .create_user(CreateUser {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            forename: "Test".to_string(),
            surname: "User".to_string(),
            role,
            company_id: DEFAULT_COMPANY_ID.to_string(),
        })
        .expect("Failed to seed user")
        .id
        .0
}

/// Run the full two-step login for a seeded user, returning the token
pub async fn login(server: &TestServer, ctx: &TestContext, email: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 200, "login step failed for {}", email);

    let body: Value = response.json();
    let user_id = body["user_id"].as_i64().expect("missing user_id");
    let code = ctx
        .dispatcher
        .last_code(email)
        .expect("no code was dispatched");

    let response = server
        .post("/api/auth/verify-otp")
        .json(&json!({ "user_id": user_id, "otp": code }))
        .await;
    assert_eq!(response.status_code(), 200, "verify step failed for {}", email);

    let body: Value = response.json();
    body["token"].as_str().expect("missing token").to_string()
}

/// Build an Authorization header value for a token
pub fn bearer(token: &str) -> axum::http::HeaderValue {
    format!("Bearer {}", token).parse().unwrap()
}
