//! Admin authentication service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// Role embedded in every issued token
pub const ADMIN_ROLE: &str = "admin";

/// Source of truth for admin credentials
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// True when the pair identifies an admin
    fn verify(&self, email: &str, password: &str) -> bool;
}

enum AdminSecret {
    Plain(String),
    Hashed(String),
}

/// A single admin identity read from configuration
pub struct StaticAdminCredentials {
    email: String,
    secret: AdminSecret,
}

impl StaticAdminCredentials {
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        let secret = match &config.admin_password_hash {
            Some(hash) => {
                PasswordHash::new(hash)
                    .map_err(|e| AppError::Internal(format!("Invalid admin password hash: {}", e)))?;
                AdminSecret::Hashed(hash.clone())
            }
            None => AdminSecret::Plain(config.admin_password.clone()),
        };

        Ok(Self {
            email: config.admin_email.clone(),
            secret,
        })
    }
}

impl CredentialStore for StaticAdminCredentials {
    fn verify(&self, email: &str, password: &str) -> bool {
        if email != self.email {
            return false;
        }
        match &self.secret {
            AdminSecret::Plain(expected) => !expected.is_empty() && password == expected,
            AdminSecret::Hashed(hash) => PasswordHash::new(hash)
                .map(|parsed| {
                    Argon2::default()
                        .verify_password(password.as_bytes(), &parsed)
                        .is_ok()
                })
                .unwrap_or(false),
        }
    }
}

/// JWT claims carried by the `auth-token` cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl AdminClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token (signature and expiry)
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// A freshly signed session token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: AdminClaims,
    pub max_age: Duration,
}

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, config: AuthConfig) -> Self {
        Self { credentials, config }
    }

    /// Check the admin credentials and sign a session token
    pub fn login(&self, email: &str, password: &str) -> AppResult<IssuedToken> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        if !self.credentials.verify(email, password) {
            tracing::warn!("Rejected admin login attempt");
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let max_age = Duration::days(self.config.token_ttl_days);
        let now = Utc::now();
        let claims = AdminClaims {
            email: email.to_string(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: (now + max_age).timestamp(),
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!(email = %claims.email, "Admin logged in");
        Ok(IssuedToken { token, claims, max_age })
    }

    /// Verify a session token. Every failure is reported the same way.
    pub fn verify_token(&self, token: &str) -> AppResult<AdminClaims> {
        AdminClaims::from_token(token, &self.config.jwt_secret)
            .ok()
            .filter(AdminClaims::is_admin)
            .ok_or_else(|| AppError::Authentication("Authentication required".to_string()))
    }

    pub fn secure_cookie(&self) -> bool {
        self.config.secure_cookie
    }
}

/// Hash a password using Argon2 (for `auth.admin_password_hash`)
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
