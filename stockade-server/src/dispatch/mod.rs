//! Out-of-band code dispatch
//!
//! The login flow hands the one-time code to a dispatcher; delivery itself
//! is outside this subsystem. A dispatch failure does not invalidate the
//! issued code, which stays verifiable until it expires or is reissued.

pub mod console;
pub mod smtp;

pub use console::ConsoleDispatcher;
pub use smtp::{SmtpConfig, SmtpDispatcher};

/// Trait for delivering one-time login codes to an out-of-band address
pub trait CodeDispatcher: Send + Sync {
    /// Send a login code to an email address
    fn send_login_code(&self, email: &str, code: &str) -> Result<(), String>;
}

/// Allow using Box<dyn CodeDispatcher> as a CodeDispatcher
impl CodeDispatcher for Box<dyn CodeDispatcher> {
    fn send_login_code(&self, email: &str, code: &str) -> Result<(), String> {
        (**self).send_login_code(email, code)
    }
}
