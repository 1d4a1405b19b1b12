// ABOUTME: Attendance route handlers for per-occurrence sheets and summaries
// ABOUTME: Staff upsert full sheets; summaries derive rates over a date window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Attendance routes
//!
//! A sheet is the set of statuses for one training occurrence date. Writing
//! a sheet upserts each record keyed on (training, sportif, date), so a
//! corrected sheet simply replaces the earlier one.

use crate::{
    errors::AppError,
    models::{AttendanceRecord, AttendanceStatus, AttendanceSummary},
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// One line of an attendance sheet write
#[derive(Debug, Deserialize)]
pub struct SheetEntry {
    /// Athlete the status is about
    pub sportif_id: String,
    /// Status: present, absent, excused, or late
    pub status: String,
}

/// Request writing the full sheet for one occurrence date
#[derive(Debug, Deserialize)]
pub struct PutSheetRequest {
    /// Occurrence date (must be a real occurrence of the training)
    pub date: NaiveDate,
    /// Statuses per athlete
    pub entries: Vec<SheetEntry>,
}

/// Query selecting one occurrence date
#[derive(Debug, Deserialize)]
pub struct SheetQuery {
    /// Occurrence date
    pub date: NaiveDate,
}

/// Date window for the per-athlete summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Window start (inclusive)
    pub from: NaiveDate,
    /// Window end (inclusive)
    pub to: NaiveDate,
}

/// One recorded status in a sheet response
#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    /// Athlete id
    pub sportif_id: String,
    /// Recorded status
    pub status: String,
    /// Occurrence date
    pub date: NaiveDate,
    /// Staff user who recorded it
    pub recorded_by: String,
    /// When it was recorded
    pub recorded_at: String,
}

impl From<&AttendanceRecord> for AttendanceResponse {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            sportif_id: record.sportif_id.to_string(),
            status: record.status.to_string(),
            date: record.date,
            recorded_by: record.recorded_by.to_string(),
            recorded_at: record.recorded_at.to_rfc3339(),
        }
    }
}

/// Attendance routes implementation
pub struct AttendanceRoutes;

impl AttendanceRoutes {
    /// Create all attendance routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/trainings/:id/attendance", put(Self::handle_put_sheet))
            .route("/api/trainings/:id/attendance", get(Self::handle_get_sheet))
            .route("/api/sportifs/:id/attendance", get(Self::handle_summary))
            .with_state(resources)
    }

    /// Handle writing the full sheet for one occurrence (staff only)
    async fn handle_put_sheet(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(request): Json<PutSheetRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let training_id = crate::utils::uuid::parse_uuid(&id)
            .map_err(|e| AppError::invalid_input(format!("Invalid training ID: {e}")))?;
        let training = resources
            .database
            .get_training(auth.club_id, training_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load training: {e}")))?
            .ok_or_else(|| AppError::not_found("Training"))?;

        if !training.occurs_on(request.date) {
            return Err(AppError::invalid_input(format!(
                "{} is not an occurrence of this training",
                request.date
            )));
        }

        let now = Utc::now();
        let mut written = 0usize;
        for entry in &request.entries {
            let sportif_id = crate::utils::uuid::parse_uuid(&entry.sportif_id)
                .map_err(|e| AppError::invalid_input(format!("Invalid sportif ID: {e}")))?;
            // The athlete must exist in the caller's club
            resources
                .database
                .get_sportif(auth.club_id, sportif_id)
                .await
                .map_err(|e| AppError::database(format!("Failed to load sportif: {e}")))?
                .ok_or_else(|| AppError::not_found(format!("Sportif {sportif_id}")))?;

            let status: AttendanceStatus = entry.status.parse()?;
            let record = AttendanceRecord {
                id: Uuid::new_v4(),
                club_id: auth.club_id,
                training_id,
                sportif_id,
                date: request.date,
                status,
                recorded_by: auth.user_id,
                recorded_at: now,
            };
            resources
                .database
                .upsert_attendance(&record)
                .await
                .map_err(|e| AppError::database(format!("Failed to record attendance: {e}")))?;
            written += 1;
        }

        info!(
            club_id = %auth.club_id,
            training_id = %training_id,
            date = %request.date,
            entries = written,
            "Attendance sheet recorded"
        );

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "recorded": written })),
        )
            .into_response())
    }

    /// Handle reading the sheet for one occurrence date
    async fn handle_get_sheet(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(query): Query<SheetQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let training_id = crate::utils::uuid::parse_uuid(&id)
            .map_err(|e| AppError::invalid_input(format!("Invalid training ID: {e}")))?;
        resources
            .database
            .get_training(auth.club_id, training_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load training: {e}")))?
            .ok_or_else(|| AppError::not_found("Training"))?;

        let sheet = resources
            .database
            .get_attendance_sheet(training_id, query.date)
            .await
            .map_err(|e| AppError::database(format!("Failed to load sheet: {e}")))?;

        let responses: Vec<AttendanceResponse> = sheet.iter().map(AttendanceResponse::from).collect();
        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle the per-athlete summary over a window
    async fn handle_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(query): Query<SummaryQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if query.from > query.to {
            return Err(AppError::invalid_input(
                "Window start must not be after window end",
            ));
        }

        let sportif_id = crate::utils::uuid::parse_uuid(&id)
            .map_err(|e| AppError::invalid_input(format!("Invalid sportif ID: {e}")))?;
        resources
            .database
            .get_sportif(auth.club_id, sportif_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load sportif: {e}")))?
            .ok_or_else(|| AppError::not_found("Sportif"))?;

        let records = resources
            .database
            .list_sportif_attendance(sportif_id, query.from, query.to)
            .await
            .map_err(|e| AppError::database(format!("Failed to load attendance: {e}")))?;

        let statuses: Vec<AttendanceStatus> = records.iter().map(|r| r.status).collect();
        let summary = AttendanceSummary::from_statuses(sportif_id, &statuses);

        Ok((StatusCode::OK, Json(summary)).into_response())
    }
}
