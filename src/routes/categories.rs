// ABOUTME: Category management route handlers
// ABOUTME: Category CRUD plus the coach assignment endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Category routes
//!
//! Categories group athletes and trainings. Deleting a category is refused
//! while sportifs or trainings still reference it.

use crate::{
    errors::AppError,
    models::{Category, UserRole},
    server::ServerResources,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request to create or update a category
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    /// Category name, unique within the club
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Minimum athlete age (inclusive)
    pub min_age: Option<u8>,
    /// Maximum athlete age (inclusive)
    pub max_age: Option<u8>,
}

/// Category response
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    /// Category id
    pub id: String,
    /// Category name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Minimum athlete age
    pub min_age: Option<u8>,
    /// Maximum athlete age
    pub max_age: Option<u8>,
    /// Creation timestamp
    pub created_at: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone(),
            min_age: category.min_age,
            max_age: category.max_age,
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

/// Request replacing the coaches assigned to a category
#[derive(Debug, Deserialize)]
pub struct SetCoachesRequest {
    /// Coach account ids; replaces the previous assignment
    pub coach_ids: Vec<String>,
}

/// Response listing the coaches assigned to a category
#[derive(Debug, Serialize)]
pub struct CategoryCoachesResponse {
    /// Assigned coach account ids
    pub coach_ids: Vec<String>,
}

/// Category routes implementation
pub struct CategoryRoutes;

impl CategoryRoutes {
    /// Create all category routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/categories", post(Self::handle_create))
            .route("/api/categories", get(Self::handle_list))
            .route("/api/categories/:id", get(Self::handle_get))
            .route("/api/categories/:id", put(Self::handle_update))
            .route("/api/categories/:id", delete(Self::handle_delete))
            .route("/api/categories/:id/coaches", put(Self::handle_set_coaches))
            .route("/api/categories/:id/coaches", get(Self::handle_list_coaches))
            .with_state(resources)
    }

    /// Handle category creation (admin only)
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CategoryRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let category = Category::new(
            auth.club_id,
            request.name.trim().to_owned(),
            request.description,
            request.min_age,
            request.max_age,
        );
        Self::validate(&category)?;

        resources
            .database
            .create_category(&category)
            .await
            .map_err(|e| AppError::database(format!("Failed to create category: {e}")))?;

        info!(club_id = %auth.club_id, category_id = %category.id, "Category created");

        Ok((StatusCode::CREATED, Json(CategoryResponse::from(&category))).into_response())
    }

    /// Handle category listing
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let categories = resources
            .database
            .list_categories(auth.club_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to list categories: {e}")))?;

        let responses: Vec<CategoryResponse> =
            categories.iter().map(CategoryResponse::from).collect();
        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle single category lookup
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let category = Self::load(&resources, auth.club_id, &id).await?;

        Ok((StatusCode::OK, Json(CategoryResponse::from(&category))).into_response())
    }

    /// Handle category update (admin only)
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(request): Json<CategoryRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let mut category = Self::load(&resources, auth.club_id, &id).await?;
        category.name = request.name.trim().to_owned();
        category.description = request.description;
        category.min_age = request.min_age;
        category.max_age = request.max_age;
        Self::validate(&category)?;

        resources
            .database
            .update_category(&category)
            .await
            .map_err(|e| AppError::database(format!("Failed to update category: {e}")))?;

        Ok((StatusCode::OK, Json(CategoryResponse::from(&category))).into_response())
    }

    /// Handle category deletion (admin only, refused while referenced)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let category = Self::load(&resources, auth.club_id, &id).await?;

        let references = resources
            .database
            .category_reference_count(category.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to check references: {e}")))?;
        if references > 0 {
            return Err(AppError::conflict(format!(
                "Category still has {references} sportifs or trainings attached"
            )));
        }

        resources
            .database
            .delete_category(auth.club_id, category.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete category: {e}")))?;

        info!(club_id = %auth.club_id, category_id = %category.id, "Category deleted");

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle coach assignment replacement (admin only)
    async fn handle_set_coaches(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(request): Json<SetCoachesRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let category = Self::load(&resources, auth.club_id, &id).await?;

        let mut coach_ids = Vec::with_capacity(request.coach_ids.len());
        for raw in &request.coach_ids {
            let coach_id = crate::utils::uuid::parse_uuid(raw)
                .map_err(|e| AppError::invalid_input(format!("Invalid coach ID: {e}")))?;
            let coach = resources
                .database
                .get_user(coach_id)
                .await
                .map_err(|e| AppError::database(format!("Failed to load coach: {e}")))?
                .ok_or_else(|| AppError::not_found(format!("Coach {coach_id}")))?;
            if coach.club_id != auth.club_id || coach.role != UserRole::Coach {
                return Err(AppError::invalid_input(format!(
                    "User {coach_id} is not a coach of this club"
                )));
            }
            coach_ids.push(coach_id);
        }

        resources
            .database
            .set_category_coaches(category.id, &coach_ids)
            .await
            .map_err(|e| AppError::database(format!("Failed to assign coaches: {e}")))?;

        info!(
            club_id = %auth.club_id,
            category_id = %category.id,
            coach_count = coach_ids.len(),
            "Category coaches replaced"
        );

        Ok((
            StatusCode::OK,
            Json(CategoryCoachesResponse {
                coach_ids: coach_ids.iter().map(Uuid::to_string).collect(),
            }),
        )
            .into_response())
    }

    /// Handle coach assignment listing
    async fn handle_list_coaches(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let category = Self::load(&resources, auth.club_id, &id).await?;

        let coach_ids = resources
            .database
            .list_category_coaches(category.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to list coaches: {e}")))?;

        Ok((
            StatusCode::OK,
            Json(CategoryCoachesResponse {
                coach_ids: coach_ids.iter().map(Uuid::to_string).collect(),
            }),
        )
            .into_response())
    }

    fn validate(category: &Category) -> Result<(), AppError> {
        if category.name.is_empty() {
            return Err(AppError::invalid_input("Category name must not be empty"));
        }
        if !category.age_bounds_valid() {
            return Err(AppError::invalid_input(
                "Minimum age must not exceed maximum age",
            ));
        }
        Ok(())
    }

    /// Load a category and verify club ownership
    async fn load(
        resources: &Arc<ServerResources>,
        club_id: Uuid,
        id: &str,
    ) -> Result<Category, AppError> {
        let category_id = crate::utils::uuid::parse_uuid(id)
            .map_err(|e| AppError::invalid_input(format!("Invalid category ID: {e}")))?;

        resources
            .database
            .get_category(club_id, category_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load category: {e}")))?
            .ok_or_else(|| AppError::not_found("Category"))
    }
}
