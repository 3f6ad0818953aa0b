//! Console-based code dispatcher for development

use super::CodeDispatcher;

/// Dispatcher that logs codes to the console (for development)
pub struct ConsoleDispatcher;

impl ConsoleDispatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeDispatcher for ConsoleDispatcher {
    fn send_login_code(&self, email: &str, code: &str) -> Result<(), String> {
        println!();
        println!("========================================");
        println!("  LOGIN CODE FOR: {}", email);
        println!("  CODE: {}", code);
        println!("========================================");
        println!();

        tracing::info!(email = %email, "Login code dispatched");

        Ok(())
    }
}
