// ABOUTME: Training and event route handlers with occurrence expansion
// ABOUTME: CRUD for sessions/matches/tournaments, per-training occurrences, and the calendar view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Training routes
//!
//! Weekly sessions are stored as a rule and expanded into dated occurrences
//! on read; matches and tournaments are always one-off.

use crate::{
    errors::AppError,
    models::{training::TrainingParams, Recurrence, Training, TrainingKind},
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request to create or update a training
#[derive(Debug, Deserialize)]
pub struct TrainingRequest {
    /// Category the training is scheduled for
    pub category_id: String,
    /// Kind: "session", "match", or "tournament"
    pub kind: String,
    /// Display title
    pub title: String,
    /// Venue
    pub location: Option<String>,
    /// First (or only) date (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// Start time (HH:MM:SS)
    pub start_time: NaiveTime,
    /// Duration in minutes
    pub duration_minutes: u32,
    /// Present for weekly sessions: last date of the recurrence
    pub weekly_until: Option<NaiveDate>,
    /// Opponent name for matches
    pub opponent: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Training response
#[derive(Debug, Serialize)]
pub struct TrainingResponse {
    /// Training id
    pub id: String,
    /// Category id
    pub category_id: String,
    /// Kind of event
    pub kind: String,
    /// Display title
    pub title: String,
    /// Venue
    pub location: Option<String>,
    /// First (or only) date
    pub start_date: NaiveDate,
    /// Start time
    pub start_time: NaiveTime,
    /// Duration in minutes
    pub duration_minutes: u32,
    /// Last recurrence date for weekly sessions
    pub weekly_until: Option<NaiveDate>,
    /// Opponent name for matches
    pub opponent: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl From<&Training> for TrainingResponse {
    fn from(training: &Training) -> Self {
        let weekly_until = match training.recurrence {
            Recurrence::OneOff => None,
            Recurrence::Weekly { until } => Some(until),
        };
        Self {
            id: training.id.to_string(),
            category_id: training.category_id.to_string(),
            kind: training.kind.to_string(),
            title: training.title.clone(),
            location: training.location.clone(),
            start_date: training.start_date,
            start_time: training.start_time,
            duration_minutes: training.duration_minutes,
            weekly_until,
            opponent: training.opponent.clone(),
            notes: training.notes.clone(),
            created_at: training.created_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing trainings
#[derive(Debug, Deserialize, Default)]
pub struct ListTrainingsQuery {
    /// Filter by category
    pub category_id: Option<String>,
    /// Filter by kind
    pub kind: Option<String>,
}

/// Date window query for occurrence expansion
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    /// Window start (inclusive)
    pub from: NaiveDate,
    /// Window end (inclusive)
    pub to: NaiveDate,
}

/// Date window plus optional category for the calendar view
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// Window start (inclusive)
    pub from: NaiveDate,
    /// Window end (inclusive)
    pub to: NaiveDate,
    /// Restrict to one category
    pub category_id: Option<String>,
}

/// One dated occurrence in an expansion response
#[derive(Debug, Serialize)]
pub struct OccurrenceResponse {
    /// Training id
    pub training_id: String,
    /// Occurrence date
    pub date: NaiveDate,
    /// Start time
    pub start_time: NaiveTime,
    /// Duration in minutes
    pub duration_minutes: u32,
}

/// One entry of the merged calendar view
#[derive(Debug, Serialize)]
pub struct CalendarEntry {
    /// Training id
    pub training_id: String,
    /// Category id
    pub category_id: String,
    /// Kind of event
    pub kind: String,
    /// Display title
    pub title: String,
    /// Venue
    pub location: Option<String>,
    /// Occurrence date
    pub date: NaiveDate,
    /// Start time
    pub start_time: NaiveTime,
    /// Duration in minutes
    pub duration_minutes: u32,
}

/// Training routes implementation
pub struct TrainingRoutes;

impl TrainingRoutes {
    /// Create all training routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/trainings", post(Self::handle_create))
            .route("/api/trainings", get(Self::handle_list))
            .route("/api/trainings/calendar", get(Self::handle_calendar))
            .route("/api/trainings/:id", get(Self::handle_get))
            .route("/api/trainings/:id", put(Self::handle_update))
            .route("/api/trainings/:id", delete(Self::handle_delete))
            .route("/api/trainings/:id/occurrences", get(Self::handle_occurrences))
            .with_state(resources)
    }

    /// Handle training creation (staff only)
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<TrainingRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let params = Self::build_params(&resources, auth.club_id, &request).await?;
        let training = Training::new(params);
        training.validate_recurrence()?;

        resources
            .database
            .create_training(&training)
            .await
            .map_err(|e| AppError::database(format!("Failed to create training: {e}")))?;

        info!(
            club_id = %auth.club_id,
            training_id = %training.id,
            kind = %training.kind,
            "Training created"
        );

        Ok((StatusCode::CREATED, Json(TrainingResponse::from(&training))).into_response())
    }

    /// Handle training listing with filters
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListTrainingsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let category_id = query
            .category_id
            .as_deref()
            .map(crate::utils::uuid::parse_uuid)
            .transpose()
            .map_err(|e| AppError::invalid_input(format!("Invalid category ID: {e}")))?;

        // Reject unknown kinds up front instead of returning an empty list
        if let Some(kind) = query.kind.as_deref() {
            kind.parse::<TrainingKind>()?;
        }

        let trainings = resources
            .database
            .list_trainings(auth.club_id, category_id, query.kind.as_deref())
            .await
            .map_err(|e| AppError::database(format!("Failed to list trainings: {e}")))?;

        let responses: Vec<TrainingResponse> =
            trainings.iter().map(TrainingResponse::from).collect();
        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle single training lookup
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let training = Self::load(&resources, auth.club_id, &id).await?;

        Ok((StatusCode::OK, Json(TrainingResponse::from(&training))).into_response())
    }

    /// Handle training update (staff only)
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(request): Json<TrainingRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let existing = Self::load(&resources, auth.club_id, &id).await?;
        let params = Self::build_params(&resources, auth.club_id, &request).await?;

        let mut training = Training::new(params);
        training.id = existing.id;
        training.created_at = existing.created_at;
        training.validate_recurrence()?;

        resources
            .database
            .update_training(&training)
            .await
            .map_err(|e| AppError::database(format!("Failed to update training: {e}")))?;

        Ok((StatusCode::OK, Json(TrainingResponse::from(&training))).into_response())
    }

    /// Handle training deletion (staff only)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let training = Self::load(&resources, auth.club_id, &id).await?;

        resources
            .database
            .delete_training(auth.club_id, training.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete training: {e}")))?;

        info!(club_id = %auth.club_id, training_id = %training.id, "Training deleted");

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle occurrence expansion for one training
    async fn handle_occurrences(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(window): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        Self::validate_window(window.from, window.to)?;

        let training = Self::load(&resources, auth.club_id, &id).await?;

        let occurrences: Vec<OccurrenceResponse> = training
            .occurrences_between(window.from, window.to)
            .into_iter()
            .map(|occurrence| OccurrenceResponse {
                training_id: occurrence.training_id.to_string(),
                date: occurrence.date,
                start_time: occurrence.start_time,
                duration_minutes: occurrence.duration_minutes,
            })
            .collect();

        Ok((StatusCode::OK, Json(occurrences)).into_response())
    }

    /// Handle the merged calendar view across trainings
    async fn handle_calendar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<CalendarQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        Self::validate_window(query.from, query.to)?;

        let category_id = query
            .category_id
            .as_deref()
            .map(crate::utils::uuid::parse_uuid)
            .transpose()
            .map_err(|e| AppError::invalid_input(format!("Invalid category ID: {e}")))?;

        let trainings = resources
            .database
            .list_trainings(auth.club_id, category_id, None)
            .await
            .map_err(|e| AppError::database(format!("Failed to list trainings: {e}")))?;

        let mut entries: Vec<CalendarEntry> = Vec::new();
        for training in &trainings {
            for occurrence in training.occurrences_between(query.from, query.to) {
                entries.push(CalendarEntry {
                    training_id: training.id.to_string(),
                    category_id: training.category_id.to_string(),
                    kind: training.kind.to_string(),
                    title: training.title.clone(),
                    location: training.location.clone(),
                    date: occurrence.date,
                    start_time: occurrence.start_time,
                    duration_minutes: occurrence.duration_minutes,
                });
            }
        }
        entries.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));

        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    fn validate_window(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
        if from > to {
            return Err(AppError::invalid_input(
                "Window start must not be after window end",
            ));
        }
        Ok(())
    }

    /// Resolve and validate request fields against the caller's club
    async fn build_params(
        resources: &Arc<ServerResources>,
        club_id: Uuid,
        request: &TrainingRequest,
    ) -> Result<TrainingParams, AppError> {
        let category_id = crate::utils::uuid::parse_uuid(&request.category_id)
            .map_err(|e| AppError::invalid_input(format!("Invalid category ID: {e}")))?;
        resources
            .database
            .get_category(club_id, category_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load category: {e}")))?
            .ok_or_else(|| AppError::not_found("Category"))?;

        let kind: TrainingKind = request.kind.parse()?;
        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("Title must not be empty"));
        }
        if request.duration_minutes == 0 {
            return Err(AppError::invalid_input("Duration must be positive"));
        }

        let recurrence = request
            .weekly_until
            .map_or(Recurrence::OneOff, |until| Recurrence::Weekly { until });

        Ok(TrainingParams {
            club_id,
            category_id,
            kind,
            title: request.title.trim().to_owned(),
            location: request.location.clone(),
            start_date: request.start_date,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
            recurrence,
            opponent: request.opponent.clone(),
            notes: request.notes.clone(),
        })
    }

    /// Load a training and verify club ownership
    async fn load(
        resources: &Arc<ServerResources>,
        club_id: Uuid,
        id: &str,
    ) -> Result<Training, AppError> {
        let training_id = crate::utils::uuid::parse_uuid(id)
            .map_err(|e| AppError::invalid_input(format!("Invalid training ID: {e}")))?;

        resources
            .database
            .get_training(club_id, training_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load training: {e}")))?
            .ok_or_else(|| AppError::not_found("Training"))
    }
}
