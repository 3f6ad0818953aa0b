//! Authorization gate
//!
//! The enforcement point in front of every protected operation: decode
//! and verify the bearer token, check the server-side session is still
//! live, check role membership, and hand the authenticated identity to
//! the operation. Downstream code trusts the returned context for the
//! rest of the call.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use stockade_core::{Error as TokenError, Role, TokenSigner};

use crate::error::ServerError;
use crate::session::SessionManager;

/// The authenticated identity a protected operation runs as
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub company_id: String,
}

#[derive(Clone)]
pub struct Gate {
    sessions: SessionManager,
    signer: Arc<TokenSigner>,
}

impl Gate {
    pub fn new(sessions: SessionManager, signer: Arc<TokenSigner>) -> Self {
        Self { sessions, signer }
    }

    /// Check an incoming request against a permitted-role set
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permitted: &[Role],
    ) -> Result<AuthContext, ServerError> {
        let token = bearer_token(headers)
            .ok_or_else(|| ServerError::authentication("missing or invalid token"))?;

        // Expired and tampered tokens are logged apart but answered alike
        let claims = match self.signer.verify(token) {
            Ok(claims) => claims,
            Err(TokenError::TokenExpired) => {
                tracing::warn!("Rejected expired token");
                return Err(ServerError::authentication("invalid token"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected malformed or tampered token");
                return Err(ServerError::authentication("invalid token"));
            }
        };

        // A cryptographically valid token may still have been superseded
        // by a newer login or an explicit logout
        if !self.sessions.is_valid(claims.user_id, token).await? {
            tracing::warn!(user_id = claims.user_id, "Rejected token with no live session");
            return Err(ServerError::authentication("invalid session"));
        }

        if !permitted.contains(&claims.role) {
            tracing::warn!(
                user_id = claims.user_id,
                role = %claims.role,
                "Rejected request: role not permitted"
            );
            return Err(ServerError::authorization("insufficient permissions"));
        }

        Ok(AuthContext {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            company_id: claims.company_id,
        })
    }
}

/// Extract the token from an `Authorization: Bearer ...` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    fn gate_with(secret: &str) -> (Gate, SessionManager, Arc<TokenSigner>) {
        let cache = Arc::new(MemoryCache::new());
        let sessions = SessionManager::new(cache, StdDuration::from_secs(60));
        let signer = Arc::new(TokenSigner::new(secret, Duration::hours(1)));
        (
            Gate::new(sessions.clone(), Arc::clone(&signer)),
            sessions,
            signer,
        )
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_valid_token_and_role_pass() {
        let (gate, sessions, signer) = gate_with("s");
        let token = signer.mint(1, "a@example.com", Role::Clerk, "c1").unwrap();
        sessions.create(1, &token).await.unwrap();

        let ctx = gate
            .authorize(&headers_with(&token), &[Role::Admin, Role::Clerk])
            .await
            .unwrap();
        assert_eq!(ctx.user_id, 1);
        assert_eq!(ctx.role, Role::Clerk);
    }

    #[tokio::test]
    async fn test_role_outside_permitted_set_forbidden() {
        let (gate, sessions, signer) = gate_with("s");
        let token = signer.mint(1, "a@example.com", Role::Customer, "c1").unwrap();
        sessions.create(1, &token).await.unwrap();

        let result = gate.authorize(&headers_with(&token), &[Role::Admin]).await;
        assert!(matches!(result, Err(ServerError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let (gate, _, _) = gate_with("s");
        let result = gate.authorize(&HeaderMap::new(), &[Role::Admin]).await;
        assert!(matches!(result, Err(ServerError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_session_must_be_live() {
        let (gate, _, signer) = gate_with("s");
        // Token is genuine, but no session was ever registered
        let token = signer.mint(1, "a@example.com", Role::Admin, "c1").unwrap();

        let result = gate.authorize(&headers_with(&token), &[Role::Admin]).await;
        assert!(matches!(result, Err(ServerError::Authentication(ref m)) if m == "invalid session"));
    }

    #[tokio::test]
    async fn test_expired_token_rejected_despite_live_session() {
        let (gate, sessions, _) = gate_with("s");
        let expired_signer = TokenSigner::new("s", Duration::seconds(-60));
        let token = expired_signer
            .mint(1, "a@example.com", Role::Admin, "c1")
            .unwrap();
        // Session entry exists, but the embedded expiry wins
        sessions.create(1, &token).await.unwrap();

        let result = gate.authorize(&headers_with(&token), &[Role::Admin]).await;
        assert!(matches!(result, Err(ServerError::Authentication(ref m)) if m == "invalid token"));
    }
}
