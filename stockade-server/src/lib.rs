//! Stockade Server
//!
//! A multi-tenant shop server. Callers log in with a two-step protocol
//! (credentials, then a short-lived one-time code) and receive a signed
//! access token; every protected operation passes an authorization gate
//! that checks the token, the server-side session, and role membership
//! before reaching the inventory/order engine.

pub mod auth;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod gate;
pub mod otp;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod users;

pub use auth::{AuthService, LoginChallenge};
pub use cache::{MemoryCache, RedisCache, TtlCache};
pub use config::Config;
pub use dispatch::{CodeDispatcher, ConsoleDispatcher, SmtpConfig, SmtpDispatcher};
pub use engine::OrderEngine;
pub use error::ServerError;
pub use gate::{AuthContext, Gate};
pub use otp::OtpManager;
pub use session::SessionManager;
pub use state::AppState;
pub use store::{Repository, SqliteRepository};
