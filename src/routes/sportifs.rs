// ABOUTME: Sportif (athlete profile) route handlers
// ABOUTME: Staff-managed profile CRUD with category and name search filters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Sportif routes
//!
//! Athlete profiles are managed by staff. A profile may link to an athlete
//! login account of the same club.

use crate::{
    errors::AppError,
    models::{sportif::SportifParams, Sportif, UserRole},
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request to create or update a sportif profile
#[derive(Debug, Deserialize)]
pub struct SportifRequest {
    /// Category the athlete trains in
    pub category_id: String,
    /// Linked athlete login account, if any
    pub user_id: Option<String>,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Date of birth (YYYY-MM-DD)
    pub birth_date: NaiveDate,
    /// Federation licence number
    pub licence_number: Option<String>,
    /// Emergency contact
    pub emergency_contact: Option<String>,
}

/// Sportif profile response
#[derive(Debug, Serialize)]
pub struct SportifResponse {
    /// Profile id
    pub id: String,
    /// Category id
    pub category_id: String,
    /// Linked login account id, if any
    pub user_id: Option<String>,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Federation licence number
    pub licence_number: Option<String>,
    /// Emergency contact
    pub emergency_contact: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl From<&Sportif> for SportifResponse {
    fn from(sportif: &Sportif) -> Self {
        Self {
            id: sportif.id.to_string(),
            category_id: sportif.category_id.to_string(),
            user_id: sportif.user_id.map(|id| id.to_string()),
            first_name: sportif.first_name.clone(),
            last_name: sportif.last_name.clone(),
            birth_date: sportif.birth_date,
            licence_number: sportif.licence_number.clone(),
            emergency_contact: sportif.emergency_contact.clone(),
            created_at: sportif.created_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing sportifs
#[derive(Debug, Deserialize, Default)]
pub struct ListSportifsQuery {
    /// Filter by category
    pub category_id: Option<String>,
    /// Substring search on first or last name
    pub search: Option<String>,
}

/// Sportif routes implementation
pub struct SportifRoutes;

impl SportifRoutes {
    /// Create all sportif routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/sportifs", post(Self::handle_create))
            .route("/api/sportifs", get(Self::handle_list))
            .route("/api/sportifs/:id", get(Self::handle_get))
            .route("/api/sportifs/:id", put(Self::handle_update))
            .route("/api/sportifs/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle profile creation (staff only)
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<SportifRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let (category_id, user_id) = Self::validate_links(&resources, auth.club_id, &request).await?;

        let sportif = Sportif::new(SportifParams {
            club_id: auth.club_id,
            category_id,
            user_id,
            first_name: request.first_name.trim().to_owned(),
            last_name: request.last_name.trim().to_owned(),
            birth_date: request.birth_date,
            licence_number: request.licence_number,
            emergency_contact: request.emergency_contact,
        });

        if sportif.first_name.is_empty() || sportif.last_name.is_empty() {
            return Err(AppError::invalid_input("Name fields must not be empty"));
        }

        resources
            .database
            .create_sportif(&sportif)
            .await
            .map_err(|e| AppError::database(format!("Failed to create sportif: {e}")))?;

        info!(club_id = %auth.club_id, sportif_id = %sportif.id, "Sportif created");

        Ok((StatusCode::CREATED, Json(SportifResponse::from(&sportif))).into_response())
    }

    /// Handle profile listing with filters
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListSportifsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let category_id = query
            .category_id
            .as_deref()
            .map(crate::utils::uuid::parse_uuid)
            .transpose()
            .map_err(|e| AppError::invalid_input(format!("Invalid category ID: {e}")))?;

        let sportifs = resources
            .database
            .list_sportifs(auth.club_id, category_id, query.search.as_deref())
            .await
            .map_err(|e| AppError::database(format!("Failed to list sportifs: {e}")))?;

        let responses: Vec<SportifResponse> = sportifs.iter().map(SportifResponse::from).collect();
        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle single profile lookup
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let sportif = Self::load(&resources, auth.club_id, &id).await?;

        Ok((StatusCode::OK, Json(SportifResponse::from(&sportif))).into_response())
    }

    /// Handle profile update (staff only)
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(request): Json<SportifRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let mut sportif = Self::load(&resources, auth.club_id, &id).await?;
        let (category_id, user_id) = Self::validate_links(&resources, auth.club_id, &request).await?;

        sportif.category_id = category_id;
        sportif.user_id = user_id;
        sportif.first_name = request.first_name.trim().to_owned();
        sportif.last_name = request.last_name.trim().to_owned();
        sportif.birth_date = request.birth_date;
        sportif.licence_number = request.licence_number;
        sportif.emergency_contact = request.emergency_contact;

        if sportif.first_name.is_empty() || sportif.last_name.is_empty() {
            return Err(AppError::invalid_input("Name fields must not be empty"));
        }

        resources
            .database
            .update_sportif(&sportif)
            .await
            .map_err(|e| AppError::database(format!("Failed to update sportif: {e}")))?;

        Ok((StatusCode::OK, Json(SportifResponse::from(&sportif))).into_response())
    }

    /// Handle profile deletion (admin only)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let sportif = Self::load(&resources, auth.club_id, &id).await?;

        resources
            .database
            .delete_sportif(auth.club_id, sportif.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete sportif: {e}")))?;

        info!(club_id = %auth.club_id, sportif_id = %sportif.id, "Sportif deleted");

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Validate the category and optional account link against the club
    async fn validate_links(
        resources: &Arc<ServerResources>,
        club_id: Uuid,
        request: &SportifRequest,
    ) -> Result<(Uuid, Option<Uuid>), AppError> {
        let category_id = crate::utils::uuid::parse_uuid(&request.category_id)
            .map_err(|e| AppError::invalid_input(format!("Invalid category ID: {e}")))?;
        resources
            .database
            .get_category(club_id, category_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load category: {e}")))?
            .ok_or_else(|| AppError::not_found("Category"))?;

        let user_id = match request.user_id.as_deref() {
            None => None,
            Some(raw) => {
                let user_id = crate::utils::uuid::parse_uuid(raw)
                    .map_err(|e| AppError::invalid_input(format!("Invalid user ID: {e}")))?;
                let user = resources
                    .database
                    .get_user(user_id)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?
                    .ok_or_else(|| AppError::not_found("Linked user"))?;
                if user.club_id != club_id || user.role != UserRole::Athlete {
                    return Err(AppError::invalid_input(
                        "Linked account must be an athlete of this club",
                    ));
                }
                Some(user_id)
            }
        };

        Ok((category_id, user_id))
    }

    /// Load a sportif and verify club ownership
    async fn load(
        resources: &Arc<ServerResources>,
        club_id: Uuid,
        id: &str,
    ) -> Result<Sportif, AppError> {
        let sportif_id = crate::utils::uuid::parse_uuid(id)
            .map_err(|e| AppError::invalid_input(format!("Invalid sportif ID: {e}")))?;

        resources
            .database
            .get_sportif(club_id, sportif_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load sportif: {e}")))?
            .ok_or_else(|| AppError::not_found("Sportif"))
    }
}
