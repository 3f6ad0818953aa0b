//! User provisioning

use std::sync::Arc;

use stockade_core::Role;

use crate::crypto;
use crate::error::ServerError;
use crate::store::{CompanyId, NewUser, Repository, User};

/// Fields accepted when provisioning a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub forename: String,
    pub surname: String,
    pub role: Role,
    pub company_id: String,
}

pub struct UserDirectory<R: Repository> {
    repo: Arc<R>,
}

impl<R: Repository> UserDirectory<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Provision a new user with a policy-checked, hashed password
    pub fn create_user(&self, req: CreateUser) -> Result<User, ServerError> {
        if !req.email.contains('@') {
            return Err(ServerError::validation("invalid email address"));
        }
        if req.forename.trim().is_empty() || req.surname.trim().is_empty() {
            return Err(ServerError::validation("name cannot be empty"));
        }
        crypto::validate_password(&req.password)?;

        if self.repo.find_user_by_email(&req.email)?.is_some() {
            return Err(ServerError::validation("email already registered"));
        }

        let password_hash = crypto::hash_password(&req.password)?;
        let user = self.repo.create_user(NewUser {
            email: req.email,
            password_hash,
            forename: req.forename,
            surname: req.surname,
            role: req.role,
            company_id: CompanyId(req.company_id),
        })?;

        tracing::info!(email = %user.email, user_id = user.id.0, role = %user.role, "User created");
        Ok(user)
    }
}
