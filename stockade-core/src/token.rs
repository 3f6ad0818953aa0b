//! Signed access tokens
//!
//! A token is an HS256 JWT carrying the authenticated identity and an
//! expiry. The signature proves the issuer; the embedded expiry is enforced
//! on every decode, independent of any server-side session record.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, Role};

/// Claims embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub company_id: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Mints and verifies access tokens with a single shared secret
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, validity: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        }
    }

    /// How long a minted token stays valid
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Mint a signed token for an authenticated identity
    pub fn mint(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        company_id: &str,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            user_id,
            email: email.to_string(),
            role,
            company_id: company_id.to_string(),
            exp: (now + self.validity).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::InvalidToken(e.to_string()))
    }

    /// Verify a token's signature and embedded expiry, returning its claims
    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: an expired token is expired
        validation.leeway = 0;

        match decode::<AccessClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(Error::TokenExpired),
                ErrorKind::InvalidSignature => Err(Error::SignatureVerificationFailed),
                _ => Err(Error::InvalidToken(e.to_string())),
            },
        }
    }
}
