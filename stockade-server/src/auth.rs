//! Two-step authentication service
//!
//! Step one checks credentials and dispatches a one-time code; step two
//! consumes the code and mints a signed token registered as the caller's
//! session. Failure messages are deliberately generic so responses cannot
//! be used to probe which accounts exist.
//!
//! Neither step counts failures: rate limiting belongs to the boundary in
//! front of this service.

use std::sync::Arc;

use serde::Serialize;
use stockade_core::{AccountStatus, Role, TokenSigner};

use crate::crypto;
use crate::dispatch::CodeDispatcher;
use crate::error::ServerError;
use crate::otp::OtpManager;
use crate::session::SessionManager;
use crate::store::{Repository, UserId};

/// Outcome of step one: the caller must now present a one-time code
#[derive(Debug, Clone, Serialize)]
pub struct LoginChallenge {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub company_id: String,
    pub requires_otp: bool,
}

pub struct AuthService<R: Repository, D: CodeDispatcher> {
    repo: Arc<R>,
    codes: OtpManager,
    sessions: SessionManager,
    signer: Arc<TokenSigner>,
    dispatcher: Arc<D>,
}

impl<R: Repository, D: CodeDispatcher> AuthService<R, D> {
    pub fn new(
        repo: Arc<R>,
        codes: OtpManager,
        sessions: SessionManager,
        signer: Arc<TokenSigner>,
        dispatcher: Arc<D>,
    ) -> Self {
        Self {
            repo,
            codes,
            sessions,
            signer,
            dispatcher,
        }
    }

    /// Step one: verify credentials and dispatch a one-time code
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginChallenge, ServerError> {
        // Absent user and wrong password produce the same message
        let Some(user) = self.repo.find_user_by_email(email)? else {
            tracing::warn!(email = %email, "Failed login attempt: unknown email");
            return Err(ServerError::authentication("invalid credentials"));
        };

        if user.status != AccountStatus::Active {
            tracing::warn!(email = %email, user_id = user.id.0, "Inactive account login attempt");
            return Err(ServerError::authentication("account inactive"));
        }

        if !crypto::verify_password(password, &user.password_hash)? {
            tracing::warn!(email = %email, user_id = user.id.0, "Failed login attempt: bad password");
            return Err(ServerError::authentication("invalid credentials"));
        }

        let code = self.codes.issue(user.id.0).await?;
        self.dispatcher
            .send_login_code(&user.email, &code)
            .map_err(ServerError::Internal)?;

        tracing::info!(email = %user.email, user_id = user.id.0, "Credentials verified, code dispatched");

        Ok(LoginChallenge {
            user_id: user.id.0,
            email: user.email,
            role: user.role,
            company_id: user.company_id.0,
            requires_otp: true,
        })
    }

    /// Step two: consume the one-time code and mint a session token
    pub async fn complete(&self, user_id: i64, code: &str) -> Result<String, ServerError> {
        if !self.codes.verify(user_id, code).await? {
            tracing::warn!(user_id, "Login completion failed: bad or expired code");
            return Err(ServerError::authentication("invalid or expired code"));
        }

        // Re-fetch: the account may have been deleted since step one
        let user = self
            .repo
            .find_user(UserId(user_id))?
            .ok_or_else(|| ServerError::authentication("user not found"))?;

        let token = self
            .signer
            .mint(user.id.0, &user.email, user.role, &user.company_id.0)
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        self.sessions.create(user.id.0, &token).await?;

        tracing::info!(email = %user.email, user_id = user.id.0, "Login completed");
        Ok(token)
    }

    /// Drop the caller's session; idempotent
    pub async fn logout(&self, user_id: i64) -> Result<(), ServerError> {
        self.sessions.invalidate(user_id).await?;
        tracing::info!(user_id, "Logged out");
        Ok(())
    }
}
