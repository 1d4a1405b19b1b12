// ABOUTME: Authentication middleware for request authentication and authorization
// ABOUTME: Validates Bearer tokens, loads the account, and builds the request AuthContext
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use crate::auth::{AuthContext, AuthManager};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use std::sync::Arc;

/// Middleware for REST API authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its headers
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The authorization header is missing or not a Bearer token
    /// - JWT validation fails
    /// - The account no longer exists or has been deactivated
    #[tracing::instrument(
        skip(self, headers),
        fields(
            user_id = tracing::field::Empty,
            club_id = tracing::field::Empty,
        )
    )]
    pub async fn authenticate_request(
        &self,
        headers: &axum::http::HeaderMap,
    ) -> AppResult<AuthContext> {
        let auth_header = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::auth_invalid("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::auth_invalid("Invalid authorization header format - must be 'Bearer <token>'")
        })?;

        let claims = self.auth_manager.validate_token(token)?;
        let context = AuthManager::context_from_claims(&claims)
            .map_err(|e| AppError::auth_invalid(format!("Invalid token claims: {e}")))?;

        // The account must still exist and be active; tokens outlive
        // deactivation otherwise
        let user = self
            .database
            .get_user(context.user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
            .ok_or_else(|| AppError::auth_invalid("Account no longer exists"))?;

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Deactivated account presented a valid token");
            return Err(AppError::auth_invalid("Account has been deactivated"));
        }

        tracing::Span::current()
            .record("user_id", context.user_id.to_string())
            .record("club_id", context.club_id.to_string());

        Ok(context)
    }
}
