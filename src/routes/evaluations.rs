// ABOUTME: Skill evaluation route handlers
// ABOUTME: Staff record and delete evaluations; history and per-skill summaries are derived
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Evaluation routes
//!
//! The recording coach is always the authenticated staff user. Deletion is
//! limited to the author or a club admin.

use crate::{
    errors::AppError,
    models::{SkillEvaluation, UserRole},
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Request recording one evaluation
#[derive(Debug, Deserialize)]
pub struct CreateEvaluationRequest {
    /// Athlete being evaluated
    pub sportif_id: String,
    /// Skill name
    pub skill: String,
    /// Score in [0, 10]
    pub score: f64,
    /// Optional comment
    pub comment: Option<String>,
    /// Date the evaluation was performed (defaults to today)
    pub evaluated_on: Option<NaiveDate>,
}

/// Evaluation response
#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    /// Evaluation id
    pub id: String,
    /// Athlete id
    pub sportif_id: String,
    /// Recording coach id
    pub coach_id: String,
    /// Skill name
    pub skill: String,
    /// Score
    pub score: f64,
    /// Comment
    pub comment: Option<String>,
    /// Date of the evaluation
    pub evaluated_on: NaiveDate,
}

impl From<&SkillEvaluation> for EvaluationResponse {
    fn from(evaluation: &SkillEvaluation) -> Self {
        Self {
            id: evaluation.id.to_string(),
            sportif_id: evaluation.sportif_id.to_string(),
            coach_id: evaluation.coach_id.to_string(),
            skill: evaluation.skill.clone(),
            score: evaluation.score,
            comment: evaluation.comment.clone(),
            evaluated_on: evaluation.evaluated_on,
        }
    }
}

/// Query parameters for the evaluation history
#[derive(Debug, Deserialize, Default)]
pub struct ListEvaluationsQuery {
    /// Restrict to one skill
    pub skill: Option<String>,
}

/// Per-skill aggregate in a summary response
#[derive(Debug, Serialize)]
pub struct SkillSummary {
    /// Skill name
    pub skill: String,
    /// Most recent score
    pub latest_score: f64,
    /// Mean over the recorded history
    pub average_score: f64,
    /// Number of recorded evaluations
    pub count: u32,
}

/// Evaluation routes implementation
pub struct EvaluationRoutes;

impl EvaluationRoutes {
    /// Create all evaluation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/evaluations", post(Self::handle_create))
            .route("/api/evaluations/:id", delete(Self::handle_delete))
            .route("/api/sportifs/:id/evaluations", get(Self::handle_history))
            .route(
                "/api/sportifs/:id/evaluations/summary",
                get(Self::handle_summary),
            )
            .with_state(resources)
    }

    /// Handle recording one evaluation (staff only)
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateEvaluationRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let sportif_id = crate::utils::uuid::parse_uuid(&request.sportif_id)
            .map_err(|e| AppError::invalid_input(format!("Invalid sportif ID: {e}")))?;
        resources
            .database
            .get_sportif(auth.club_id, sportif_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load sportif: {e}")))?
            .ok_or_else(|| AppError::not_found("Sportif"))?;

        let evaluated_on = request
            .evaluated_on
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let evaluation = SkillEvaluation::new(
            auth.club_id,
            sportif_id,
            auth.user_id,
            request.skill.trim().to_owned(),
            request.score,
            request.comment,
            evaluated_on,
        )?;

        resources
            .database
            .create_evaluation(&evaluation)
            .await
            .map_err(|e| AppError::database(format!("Failed to record evaluation: {e}")))?;

        info!(
            club_id = %auth.club_id,
            sportif_id = %sportif_id,
            skill = %evaluation.skill,
            "Evaluation recorded"
        );

        Ok((StatusCode::CREATED, Json(EvaluationResponse::from(&evaluation))).into_response())
    }

    /// Handle evaluation deletion (author or admin)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let evaluation_id = crate::utils::uuid::parse_uuid(&id)
            .map_err(|e| AppError::invalid_input(format!("Invalid evaluation ID: {e}")))?;
        let evaluation = resources
            .database
            .get_evaluation(auth.club_id, evaluation_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load evaluation: {e}")))?
            .ok_or_else(|| AppError::not_found("Evaluation"))?;

        if evaluation.coach_id != auth.user_id && auth.role != UserRole::Admin {
            return Err(AppError::permission_denied(
                "Only the recording coach or an admin can delete an evaluation",
            ));
        }

        resources
            .database
            .delete_evaluation(auth.club_id, evaluation_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete evaluation: {e}")))?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle the per-athlete evaluation history
    async fn handle_history(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(query): Query<ListEvaluationsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let sportif_id = Self::check_sportif(&resources, &auth, &id).await?;

        let evaluations = resources
            .database
            .list_sportif_evaluations(sportif_id, query.skill.as_deref())
            .await
            .map_err(|e| AppError::database(format!("Failed to list evaluations: {e}")))?;

        let responses: Vec<EvaluationResponse> =
            evaluations.iter().map(EvaluationResponse::from).collect();
        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle the per-skill summary (latest and average score per skill)
    async fn handle_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let sportif_id = Self::check_sportif(&resources, &auth, &id).await?;

        // History arrives newest first, so the first sighting of a skill is
        // its latest score
        let evaluations = resources
            .database
            .list_sportif_evaluations(sportif_id, None)
            .await
            .map_err(|e| AppError::database(format!("Failed to list evaluations: {e}")))?;

        let mut aggregates: BTreeMap<String, (f64, f64, u32)> = BTreeMap::new();
        for evaluation in &evaluations {
            let entry = aggregates
                .entry(evaluation.skill.clone())
                .or_insert((evaluation.score, 0.0, 0));
            entry.1 += evaluation.score;
            entry.2 += 1;
        }

        let summaries: Vec<SkillSummary> = aggregates
            .into_iter()
            .map(|(skill, (latest, sum, count))| SkillSummary {
                skill,
                latest_score: latest,
                average_score: sum / f64::from(count),
                count,
            })
            .collect();

        Ok((StatusCode::OK, Json(summaries)).into_response())
    }

    /// Parse the sportif id and verify it belongs to the caller's club
    async fn check_sportif(
        resources: &Arc<ServerResources>,
        auth: &crate::auth::AuthContext,
        id: &str,
    ) -> Result<uuid::Uuid, AppError> {
        let sportif_id = crate::utils::uuid::parse_uuid(id)
            .map_err(|e| AppError::invalid_input(format!("Invalid sportif ID: {e}")))?;
        resources
            .database
            .get_sportif(auth.club_id, sportif_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load sportif: {e}")))?
            .ok_or_else(|| AppError::not_found("Sportif"))?;
        Ok(sportif_id)
    }
}
