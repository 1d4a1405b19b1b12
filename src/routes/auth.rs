// ABOUTME: Authentication route handlers for club registration, login, and tokens
// ABOUTME: Provides REST endpoints for account bootstrap, session tokens, and profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Authentication routes
//!
//! Club registration creates the tenant and its first admin account in one
//! call. Login and refresh mint HS256 tokens that pin the caller's club.

use crate::{
    errors::AppError,
    models::{Club, User, UserRole},
    server::ServerResources,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Minimum accepted password length
const MIN_PASSWORD_LENGTH: usize = 8;

/// Club registration request
#[derive(Debug, Deserialize)]
pub struct RegisterClubRequest {
    /// Name of the new club
    pub club_name: String,
    /// Email for the first admin account
    pub email: String,
    /// Password for the first admin account
    pub password: String,
    /// Display name for the first admin
    pub display_name: Option<String>,
}

/// Club registration response
#[derive(Debug, Serialize)]
pub struct RegisterClubResponse {
    /// Id of the created club
    pub club_id: String,
    /// Slug derived from the club name
    pub slug: String,
    /// Id of the created admin account
    pub user_id: String,
    /// Human-readable confirmation
    pub message: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// User info for login and profile responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// Account id
    pub user_id: String,
    /// Club the account belongs to
    pub club_id: String,
    /// Account email
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Role inside the club
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            club_id: user.club_id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role.to_string(),
        }
    }
}

/// User login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub jwt_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// Authenticated account details
    pub user: UserInfo,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    /// The token to refresh (signature must still verify)
    pub token: String,
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/refresh", post(Self::handle_refresh))
            .route("/api/auth/me", get(Self::handle_me))
            .with_state(resources)
    }

    /// Handle club + first admin registration
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterClubRequest>,
    ) -> Result<Response, AppError> {
        info!(club_name = %request.club_name, email = %request.email, "Club registration attempt");

        if !Self::is_valid_email(&request.email) {
            return Err(AppError::invalid_input("Invalid email format"));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let slug = Club::slugify(&request.club_name);
        if slug.is_empty() {
            return Err(AppError::invalid_input("Club name must not be empty"));
        }

        if resources
            .database
            .get_club_by_slug(&slug)
            .await
            .map_err(|e| AppError::database(format!("Failed to check club slug: {e}")))?
            .is_some()
        {
            return Err(AppError::already_exists(format!(
                "A club named '{slug}' is already registered"
            )));
        }
        if resources
            .database
            .get_user_by_email(&request.email)
            .await
            .map_err(|e| AppError::database(format!("Failed to check email: {e}")))?
            .is_some()
        {
            return Err(AppError::already_exists("Email already in use"));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let club = Club::new(request.club_name.clone(), slug.clone());
        resources
            .database
            .create_club(&club)
            .await
            .map_err(|e| AppError::database(format!("Failed to create club: {e}")))?;

        let admin = User::new(
            club.id,
            request.email.clone(),
            password_hash,
            request.display_name,
            UserRole::Admin,
        );
        resources
            .database
            .create_user(&admin)
            .await
            .map_err(|e| AppError::database(format!("Failed to create admin account: {e}")))?;

        info!(club_id = %club.id, user_id = %admin.id, "Club registered");

        Ok((
            StatusCode::CREATED,
            Json(RegisterClubResponse {
                club_id: club.id.to_string(),
                slug,
                user_id: admin.id.to_string(),
                message: "Club registered successfully".into(),
            }),
        )
            .into_response())
    }

    /// Handle user login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        info!(email = %request.email, "Login attempt");

        let user = resources
            .database
            .get_user_by_email_required(&request.email)
            .await
            .map_err(|_| AppError::auth_invalid("Invalid email or password"))?;

        // Verify on a blocking task; bcrypt is CPU-bound
        let password = request.password;
        let password_hash = user.password_hash.clone();
        let is_valid =
            tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
                .await
                .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("Password verification error: {e}")))?;

        if !is_valid {
            warn!(email = %request.email, "Invalid password");
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        if !user.is_active {
            warn!(email = %request.email, "Login blocked for deactivated account");
            return Err(AppError::auth_invalid("Account has been deactivated"));
        }

        resources
            .database
            .update_last_active(user.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last active: {e}")))?;

        let jwt_token = resources
            .auth_manager
            .generate_token(&user)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

        info!(user_id = %user.id, club_id = %user.club_id, "Login successful");

        Ok((
            StatusCode::OK,
            Json(LoginResponse {
                jwt_token,
                expires_in: resources.auth_manager.expiry_seconds(),
                user: UserInfo::from(&user),
            }),
        )
            .into_response())
    }

    /// Handle token refresh
    ///
    /// The old token's signature must verify, but it may have expired; the
    /// account is re-checked before a fresh token is minted.
    async fn handle_refresh(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RefreshTokenRequest>,
    ) -> Result<Response, AppError> {
        let claims = resources
            .auth_manager
            .decode_token_claims(&request.token)
            .map_err(|e| AppError::auth_invalid(format!("Invalid refresh token: {e}")))?;

        let user_id = crate::utils::uuid::parse_uuid(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))?;

        let user = resources
            .database
            .get_user(user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
            .ok_or_else(|| AppError::auth_invalid("Account no longer exists"))?;

        if !user.is_active {
            return Err(AppError::auth_invalid("Account has been deactivated"));
        }

        let jwt_token = resources
            .auth_manager
            .refresh_token(&request.token, &user)
            .map_err(|e| AppError::internal(format!("Failed to refresh token: {e}")))?;

        Ok((
            StatusCode::OK,
            Json(LoginResponse {
                jwt_token,
                expires_in: resources.auth_manager.expiry_seconds(),
                user: UserInfo::from(&user),
            }),
        )
            .into_response())
    }

    /// Handle current-user profile lookup
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let user = resources
            .database
            .get_user(auth.user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok((StatusCode::OK, Json(UserInfo::from(&user))).into_response())
    }

    /// Minimal email shape check; deliverability is not our problem
    fn is_valid_email(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }
}

#[cfg(test)]
mod tests {
    use super::AuthRoutes;

    #[test]
    fn test_email_validation() {
        assert!(AuthRoutes::is_valid_email("admin@club.example"));
        assert!(!AuthRoutes::is_valid_email("no-at-sign"));
        assert!(!AuthRoutes::is_valid_email("@club.example"));
        assert!(!AuthRoutes::is_valid_email("admin@nodot"));
        assert!(!AuthRoutes::is_valid_email("admin@.example"));
    }
}
