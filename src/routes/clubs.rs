// ABOUTME: Club profile route handlers
// ABOUTME: Exposes the caller's club with member counts and admin-only rename
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Club profile routes
//!
//! The caller only ever sees their own club; there is no cross-tenant
//! listing surface.

use crate::{errors::AppError, server::ServerResources};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Club profile response
#[derive(Debug, Serialize)]
pub struct ClubResponse {
    /// Club id
    pub id: String,
    /// Club display name
    pub name: String,
    /// Club slug
    pub slug: String,
    /// Active login accounts in the club
    pub member_count: i64,
    /// Athlete profiles in the club
    pub sportif_count: i64,
    /// Creation timestamp
    pub created_at: String,
}

/// Club rename request
#[derive(Debug, Deserialize)]
pub struct UpdateClubRequest {
    /// New display name
    pub name: String,
}

/// Club routes implementation
pub struct ClubRoutes;

impl ClubRoutes {
    /// Create all club routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/club", get(Self::handle_get_club))
            .route("/api/club", put(Self::handle_update_club))
            .with_state(resources)
    }

    /// Handle club profile lookup
    async fn handle_get_club(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let club = resources
            .database
            .get_club(auth.club_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load club: {e}")))?
            .ok_or_else(|| AppError::not_found("Club"))?;

        let member_count = resources
            .database
            .count_club_members(auth.club_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to count members: {e}")))?;
        let sportif_count = resources
            .database
            .count_club_sportifs(auth.club_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to count sportifs: {e}")))?;

        Ok((
            StatusCode::OK,
            Json(ClubResponse {
                id: club.id.to_string(),
                name: club.name,
                slug: club.slug,
                member_count,
                sportif_count,
                created_at: club.created_at.to_rfc3339(),
            }),
        )
            .into_response())
    }

    /// Handle club rename (admin only, slug is immutable)
    async fn handle_update_club(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdateClubRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("Club name must not be empty"));
        }

        resources
            .database
            .update_club_name(auth.club_id, request.name.trim())
            .await
            .map_err(|e| AppError::database(format!("Failed to rename club: {e}")))?;

        info!(club_id = %auth.club_id, "Club renamed");

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
