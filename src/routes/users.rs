// ABOUTME: User account management route handlers
// ABOUTME: Admin-scoped CRUD for coach and athlete login accounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! User account routes
//!
//! Admins create and manage the club's login accounts. Deletion is a soft
//! deactivation so attendance and evaluation history keeps valid references.

use crate::{
    errors::AppError,
    models::{User, UserRole},
    routes::auth::UserInfo,
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request to create a coach or athlete account
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Account email
    pub email: String,
    /// Initial password
    pub password: String,
    /// Display name
    pub display_name: Option<String>,
    /// Role: "coach" or "athlete"
    pub role: String,
}

/// Request to update an account
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// New display name
    pub display_name: Option<String>,
    /// New role
    pub role: String,
    /// Whether the account may log in
    pub is_active: bool,
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, Default)]
pub struct ListUsersQuery {
    /// Filter by role
    pub role: Option<String>,
}

/// Response listing club accounts
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    /// Accounts in the club
    pub users: Vec<UserSummary>,
}

/// One account in a listing
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// Account id
    pub user_id: String,
    /// Account email
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Role inside the club
    pub role: String,
    /// Whether the account may log in
    pub is_active: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role.to_string(),
            is_active: user.is_active,
        }
    }
}

/// User account routes implementation
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user management routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", post(Self::handle_create_user))
            .route("/api/users", get(Self::handle_list_users))
            .route("/api/users/:id", get(Self::handle_get_user))
            .route("/api/users/:id", put(Self::handle_update_user))
            .route("/api/users/:id", delete(Self::handle_deactivate_user))
            .with_state(resources)
    }

    /// Handle account creation (admin only)
    async fn handle_create_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateUserRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let role: UserRole = request.role.parse()?;
        if role == UserRole::Admin {
            return Err(AppError::invalid_input(
                "New accounts are created as coach or athlete; promote via update",
            ));
        }
        if request.password.len() < 8 {
            return Err(AppError::invalid_input(
                "Password must be at least 8 characters",
            ));
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

        let user = User::new(
            auth.club_id,
            request.email,
            password_hash,
            request.display_name,
            role,
        );
        resources
            .database
            .create_user(&user)
            .await
            .map_err(|e| AppError::database(format!("Failed to create account: {e}")))?;

        info!(club_id = %auth.club_id, user_id = %user.id, role = %role, "Account created");

        Ok((StatusCode::CREATED, Json(UserInfo::from(&user))).into_response())
    }

    /// Handle account listing with optional role filter
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListUsersQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let role = query.role.as_deref().map(str::parse).transpose()?;

        let users = resources
            .database
            .list_users(auth.club_id, role)
            .await
            .map_err(|e| AppError::database(format!("Failed to list accounts: {e}")))?;

        Ok((
            StatusCode::OK,
            Json(ListUsersResponse {
                users: users.iter().map(UserSummary::from).collect(),
            }),
        )
            .into_response())
    }

    /// Handle single account lookup
    async fn handle_get_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let user = Self::load_club_user(&resources, auth.club_id, &id).await?;

        Ok((StatusCode::OK, Json(UserInfo::from(&user))).into_response())
    }

    /// Handle account update (admin only)
    async fn handle_update_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(request): Json<UpdateUserRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let user = Self::load_club_user(&resources, auth.club_id, &id).await?;
        let role: UserRole = request.role.parse()?;

        if user.id == auth.user_id && !request.is_active {
            return Err(AppError::conflict("You cannot deactivate your own account"));
        }

        resources
            .database
            .update_user(user.id, request.display_name.as_deref(), role, request.is_active)
            .await
            .map_err(|e| AppError::database(format!("Failed to update account: {e}")))?;

        let updated = Self::load_club_user(&resources, auth.club_id, &id).await?;
        Ok((StatusCode::OK, Json(UserInfo::from(&updated))).into_response())
    }

    /// Handle account deactivation (admin only, soft delete)
    async fn handle_deactivate_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let user = Self::load_club_user(&resources, auth.club_id, &id).await?;
        if user.id == auth.user_id {
            return Err(AppError::conflict("You cannot deactivate your own account"));
        }

        resources
            .database
            .deactivate_user(user.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to deactivate account: {e}")))?;

        info!(club_id = %auth.club_id, user_id = %user.id, "Account deactivated");

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Load a user and verify it belongs to the caller's club
    async fn load_club_user(
        resources: &Arc<ServerResources>,
        club_id: Uuid,
        id: &str,
    ) -> Result<User, AppError> {
        let user_id = crate::utils::uuid::parse_uuid(id)
            .map_err(|e| AppError::invalid_input(format!("Invalid user ID: {e}")))?;

        let user = resources
            .database
            .get_user(user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load account: {e}")))?
            .ok_or_else(|| AppError::not_found("User"))?;

        if user.club_id != club_id {
            // Cross-club ids are indistinguishable from unknown ones
            return Err(AppError::not_found("User"));
        }

        Ok(user)
    }
}
