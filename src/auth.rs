// ABOUTME: JWT-based user authentication and authorization system
// ABOUTME: Handles token generation, validation, refresh, and the per-request auth context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! # Authentication and Session Management
//!
//! This module provides HS256 JWT authentication for the multi-tenant
//! SportClub server. Every token pins the user's club, which is how all
//! downstream queries are tenant-scoped.

use crate::errors::AppError;
use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Audience claim stamped into every token
pub const TOKEN_AUDIENCE: &str = "sportclub-api";

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let expired_for = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "JWT token expired {} minutes ago at {}",
                    expired_for.num_minutes(),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match &error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            JwtValidationError::TokenInvalid { .. } | JwtValidationError::TokenMalformed { .. } => {
                Self::auth_invalid(error.to_string())
            }
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Club the user belongs to; scopes every request
    pub club_id: String,
    /// User role inside the club
    pub role: UserRole,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// Authenticated request context derived from a validated token
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Club the request is scoped to
    pub club_id: Uuid,
    /// Role of the authenticated user
    pub role: UserRole,
    /// Email of the authenticated user
    pub email: String,
}

impl AuthContext {
    /// Require the caller to be a club admin
    ///
    /// # Errors
    ///
    /// Returns a permission error for coach and athlete callers
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "This action requires club admin privileges",
            ))
        }
    }

    /// Require the caller to be staff (admin or coach)
    ///
    /// # Errors
    ///
    /// Returns a permission error for athlete callers
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "This action requires staff privileges",
            ))
        }
    }
}

/// Authentication manager for `JWT` tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    /// Monotonic counter to ensure unique issued-at values for tokens
    token_counter: AtomicU64,
}

impl AuthManager {
    /// Create a new authentication manager from a shared secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Token lifetime in seconds, for login responses
    #[must_use]
    pub const fn expiry_seconds(&self) -> i64 {
        self.token_expiry_hours * 3600
    }

    /// Generate a `JWT` token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        // Atomic counter keeps issued-at values unique within a second
        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let unique_iat =
            now.timestamp() * 1000 + i64::from(u32::try_from(counter % 1000).unwrap_or(0));

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            club_id: user.club_id.to_string(),
            role: user.role,
            iat: unique_iat,
            exp: expiry.timestamp(),
            aud: TOKEN_AUDIENCE.to_owned(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a JWT token, including expiry, and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is expired, malformed,
    /// or carries an invalid signature.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let claims = self.decode_token_claims(token)?;
        Self::validate_claims_expiry(&claims)?;
        Ok(claims)
    }

    /// Decode token claims without expiration validation
    ///
    /// Used by the refresh flow, where the signature must hold even though
    /// the token may have expired.
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the signature or format is invalid
    pub fn decode_token_claims(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_audience(&[TOKEN_AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))
    }

    /// Refresh a token if its signature is still valid
    ///
    /// The caller is responsible for re-checking the user's account status
    /// before minting the replacement.
    ///
    /// # Errors
    ///
    /// Returns an error if the old token fails signature validation or the
    /// new token cannot be generated.
    pub fn refresh_token(&self, old_token: &str, user: &User) -> Result<String> {
        let claims = self
            .decode_token_claims(old_token)
            .map_err(|e| anyhow::anyhow!("Failed to validate old token for refresh: {e}"))?;

        if claims.sub != user.id.to_string() {
            anyhow::bail!("Refresh token does not belong to this user");
        }

        self.generate_token(user)
    }

    /// Build an [`AuthContext`] from validated claims
    ///
    /// # Errors
    ///
    /// Returns an error if the subject or club id is not a valid UUID
    pub fn context_from_claims(claims: &Claims) -> Result<AuthContext> {
        let user_id = crate::utils::uuid::parse_uuid(&claims.sub)
            .context("Invalid user ID in token subject")?;
        let club_id =
            crate::utils::uuid::parse_uuid(&claims.club_id).context("Invalid club ID in token")?;
        Ok(AuthContext {
            user_id,
            club_id,
            role: claims.role,
            email: claims.email.clone(),
        })
    }

    fn validate_claims_expiry(claims: &Claims) -> Result<(), JwtValidationError> {
        let current_time = Utc::now();
        if current_time.timestamp() > claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
            tracing::warn!(
                user_id = %claims.sub,
                expired_at = %expired_at.to_rfc3339(),
                "JWT token expired"
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }
        Ok(())
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }
}

/// Generate a random `JWT` secret for development use
#[must_use]
pub fn generate_jwt_secret() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            Uuid::new_v4(),
            "coach@club.example".into(),
            "hash".into(),
            Some("Coach".into()),
            UserRole::Coach,
        )
    }

    fn manager() -> AuthManager {
        AuthManager::new(generate_jwt_secret().as_bytes(), 24)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let auth_manager = manager();
        let user = test_user();

        let token = auth_manager.generate_token(&user).unwrap();
        let claims = auth_manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.club_id, user.club_id.to_string());
        assert_eq!(claims.role, UserRole::Coach);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let user = test_user();
        let token = manager().generate_token(&user).unwrap();
        let other = manager();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let result = manager().validate_token("not.a.jwt");
        assert!(matches!(
            result,
            Err(JwtValidationError::TokenMalformed { .. } | JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_refresh_token_checks_subject() {
        let auth_manager = manager();
        let user = test_user();
        let token = auth_manager.generate_token(&user).unwrap();

        assert!(auth_manager.refresh_token(&token, &user).is_ok());

        let other_user = test_user();
        assert!(auth_manager.refresh_token(&token, &other_user).is_err());
    }

    #[test]
    fn test_context_from_claims() {
        let auth_manager = manager();
        let user = test_user();
        let token = auth_manager.generate_token(&user).unwrap();
        let claims = auth_manager.validate_token(&token).unwrap();

        let ctx = AuthManager::context_from_claims(&claims).unwrap();
        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.club_id, user.club_id);
        assert!(ctx.require_staff().is_ok());
        assert!(ctx.require_admin().is_err());
    }
}
