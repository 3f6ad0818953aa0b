//! Application state
//!
//! The managers and services are constructed once at startup and shared
//! by handle; there is no module-level mutable state anywhere in the
//! server.

use std::sync::Arc;

use chrono::Duration;
use stockade_core::TokenSigner;

use crate::auth::AuthService;
use crate::cache::TtlCache;
use crate::config::Config;
use crate::dispatch::CodeDispatcher;
use crate::engine::OrderEngine;
use crate::gate::Gate;
use crate::otp::OtpManager;
use crate::session::SessionManager;
use crate::store::Repository;
use crate::users::UserDirectory;

/// Shared application state
pub struct AppState<R: Repository, D: CodeDispatcher> {
    pub auth: AuthService<R, D>,
    pub gate: Gate,
    pub users: UserDirectory<R>,
    pub engine: OrderEngine<R>,
    pub repo: Arc<R>,
    pub sessions: SessionManager,
    pub signer: Arc<TokenSigner>,
}

impl<R: Repository, D: CodeDispatcher> AppState<R, D> {
    pub fn new(config: &Config, repo: R, cache: Arc<dyn TtlCache>, dispatcher: D) -> Self {
        let repo = Arc::new(repo);
        let dispatcher = Arc::new(dispatcher);

        let signer = Arc::new(TokenSigner::new(
            &config.token_secret,
            Duration::seconds(config.session_ttl.as_secs() as i64),
        ));

        let codes = OtpManager::new(Arc::clone(&cache), config.code_ttl, config.code_length);
        let sessions = SessionManager::new(cache, config.session_ttl);

        let auth = AuthService::new(
            Arc::clone(&repo),
            codes,
            sessions.clone(),
            Arc::clone(&signer),
            dispatcher,
        );
        let gate = Gate::new(sessions.clone(), Arc::clone(&signer));

        Self {
            auth,
            gate,
            users: UserDirectory::new(Arc::clone(&repo)),
            engine: OrderEngine::new(Arc::clone(&repo)),
            repo,
            sessions,
            signer,
        }
    }
}
