// ABOUTME: Licence, stage, and installment route handlers
// ABOUTME: Plans are generated at creation; payment state is per installment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Payment routes
//!
//! Licences and stage enrollments carry installment plans generated at
//! creation: equal amounts spaced one month apart, remainder cents on the
//! first installment. Status (pending/partial/paid/overdue) is derived from
//! the installments, never stored.

use crate::{
    errors::AppError,
    models::{
        generate_installments, payment::StageParams, Installment, InstallmentParent, Licence,
        PaymentStatus, Stage, StageEnrollment,
    },
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request creating a licence with its installment plan
#[derive(Debug, Deserialize)]
pub struct CreateLicenceRequest {
    /// Athlete the licence is for
    pub sportif_id: String,
    /// Season label (e.g. "2026-2027")
    pub season: String,
    /// Total amount in cents
    pub amount_cents: i64,
    /// Number of installments (1..=12)
    pub installment_count: u32,
    /// Due date of the first installment
    pub first_due_date: NaiveDate,
}

/// Request creating a stage
#[derive(Debug, Deserialize)]
pub struct CreateStageRequest {
    /// Display title
    pub title: String,
    /// Category restriction, if any
    pub category_id: Option<String>,
    /// First day
    pub start_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
    /// Amount in cents per enrollment
    pub amount_cents: i64,
    /// Maximum enrollments, if capped
    pub capacity: Option<u32>,
}

/// Request enrolling an athlete in a stage
#[derive(Debug, Deserialize)]
pub struct EnrollStageRequest {
    /// Athlete to enroll
    pub sportif_id: String,
    /// Number of installments (1..=12)
    pub installment_count: u32,
    /// Due date of the first installment
    pub first_due_date: NaiveDate,
}

/// Query parameters for listing licences
#[derive(Debug, Deserialize, Default)]
pub struct ListLicencesQuery {
    /// Filter by season label
    pub season: Option<String>,
    /// Filter by athlete
    pub sportif_id: Option<String>,
}

/// One installment in a response
#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    /// Installment id
    pub id: String,
    /// Position in the plan, starting at 1
    pub seq: u32,
    /// Amount in cents
    pub amount_cents: i64,
    /// Due date
    pub due_date: NaiveDate,
    /// When it was paid, if it was
    pub paid_at: Option<String>,
}

impl From<&Installment> for InstallmentResponse {
    fn from(installment: &Installment) -> Self {
        Self {
            id: installment.id.to_string(),
            seq: installment.seq,
            amount_cents: installment.amount_cents,
            due_date: installment.due_date,
            paid_at: installment.paid_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Licence response with its plan and derived status
#[derive(Debug, Serialize)]
pub struct LicenceResponse {
    /// Licence id
    pub id: String,
    /// Athlete id
    pub sportif_id: String,
    /// Season label
    pub season: String,
    /// Total amount in cents
    pub amount_cents: i64,
    /// Derived payment status
    pub status: PaymentStatus,
    /// Installment plan
    pub installments: Vec<InstallmentResponse>,
}

/// Stage response with enrollment count
#[derive(Debug, Serialize)]
pub struct StageResponse {
    /// Stage id
    pub id: String,
    /// Display title
    pub title: String,
    /// Category restriction, if any
    pub category_id: Option<String>,
    /// First day
    pub start_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
    /// Amount in cents per enrollment
    pub amount_cents: i64,
    /// Maximum enrollments, if capped
    pub capacity: Option<u32>,
    /// Current enrollment count
    pub enrolled_count: i64,
}

/// One enrollment with its plan and derived status
#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    /// Enrollment id
    pub id: String,
    /// Stage id
    pub stage_id: String,
    /// Athlete id
    pub sportif_id: String,
    /// Derived payment status
    pub status: PaymentStatus,
    /// Installment plan
    pub installments: Vec<InstallmentResponse>,
}

/// Payment routes implementation
pub struct PaymentRoutes;

impl PaymentRoutes {
    /// Create all payment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/licences", post(Self::handle_create_licence))
            .route("/api/licences", get(Self::handle_list_licences))
            .route("/api/licences/:id", get(Self::handle_get_licence))
            .route("/api/licences/:id", delete(Self::handle_delete_licence))
            .route("/api/stages", post(Self::handle_create_stage))
            .route("/api/stages", get(Self::handle_list_stages))
            .route("/api/stages/:id", get(Self::handle_get_stage))
            .route("/api/stages/:id/enroll", post(Self::handle_enroll))
            .route("/api/installments/:id/pay", post(Self::handle_pay))
            .route("/api/payments/outstanding", get(Self::handle_outstanding))
            .with_state(resources)
    }

    /// Handle licence creation with plan generation (staff only)
    async fn handle_create_licence(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateLicenceRequest>,
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

        if request.season.trim().is_empty() {
            return Err(AppError::invalid_input("Season must not be empty"));
        }

        let licence = Licence::new(
            auth.club_id,
            sportif_id,
            request.season.trim().to_owned(),
            request.amount_cents,
        );
        let installments = generate_installments(
            auth.club_id,
            InstallmentParent::Licence,
            licence.id,
            request.amount_cents,
            request.installment_count,
            request.first_due_date,
        )?;

        resources
            .database
            .create_licence(&licence, &installments)
            .await
            .map_err(|e| AppError::database(format!("Failed to create licence: {e}")))?;

        info!(
            club_id = %auth.club_id,
            licence_id = %licence.id,
            installments = installments.len(),
            "Licence created"
        );

        Ok((
            StatusCode::CREATED,
            Json(Self::licence_response(&licence, &installments)),
        )
            .into_response())
    }

    /// Handle licence listing with filters
    async fn handle_list_licences(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListLicencesQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let sportif_id = query
            .sportif_id
            .as_deref()
            .map(crate::utils::uuid::parse_uuid)
            .transpose()
            .map_err(|e| AppError::invalid_input(format!("Invalid sportif ID: {e}")))?;

        let licences = resources
            .database
            .list_licences(auth.club_id, query.season.as_deref(), sportif_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to list licences: {e}")))?;

        let mut responses = Vec::with_capacity(licences.len());
        for licence in &licences {
            let installments = resources
                .database
                .list_installments(InstallmentParent::Licence, licence.id)
                .await
                .map_err(|e| AppError::database(format!("Failed to load plan: {e}")))?;
            responses.push(Self::licence_response(licence, &installments));
        }

        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle single licence lookup
    async fn handle_get_licence(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let licence = Self::load_licence(&resources, auth.club_id, &id).await?;
        let installments = resources
            .database
            .list_installments(InstallmentParent::Licence, licence.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load plan: {e}")))?;

        Ok((
            StatusCode::OK,
            Json(Self::licence_response(&licence, &installments)),
        )
            .into_response())
    }

    /// Handle licence deletion (admin only, refused once anything is paid)
    async fn handle_delete_licence(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let licence = Self::load_licence(&resources, auth.club_id, &id).await?;

        let paid = resources
            .database
            .count_paid_installments(InstallmentParent::Licence, licence.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to check payments: {e}")))?;
        if paid > 0 {
            return Err(AppError::conflict(
                "Licence has recorded payments and cannot be deleted",
            ));
        }

        resources
            .database
            .delete_licence(auth.club_id, licence.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete licence: {e}")))?;

        info!(club_id = %auth.club_id, licence_id = %licence.id, "Licence deleted");

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle stage creation (staff only)
    async fn handle_create_stage(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateStageRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let category_id = match request.category_id.as_deref() {
            None => None,
            Some(raw) => {
                let category_id = crate::utils::uuid::parse_uuid(raw)
                    .map_err(|e| AppError::invalid_input(format!("Invalid category ID: {e}")))?;
                resources
                    .database
                    .get_category(auth.club_id, category_id)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to load category: {e}")))?
                    .ok_or_else(|| AppError::not_found("Category"))?;
                Some(category_id)
            }
        };

        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("Title must not be empty"));
        }
        if request.amount_cents < 0 {
            return Err(AppError::invalid_input("Amount must not be negative"));
        }

        let stage = Stage::new(StageParams {
            club_id: auth.club_id,
            title: request.title.trim().to_owned(),
            category_id,
            start_date: request.start_date,
            end_date: request.end_date,
            amount_cents: request.amount_cents,
            capacity: request.capacity,
        })?;

        resources
            .database
            .create_stage(&stage)
            .await
            .map_err(|e| AppError::database(format!("Failed to create stage: {e}")))?;

        info!(club_id = %auth.club_id, stage_id = %stage.id, "Stage created");

        Ok((
            StatusCode::CREATED,
            Json(Self::stage_response(&stage, 0)),
        )
            .into_response())
    }

    /// Handle stage listing
    async fn handle_list_stages(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let stages = resources
            .database
            .list_stages(auth.club_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to list stages: {e}")))?;

        let mut responses = Vec::with_capacity(stages.len());
        for stage in &stages {
            let enrolled = resources
                .database
                .count_stage_enrollments(stage.id)
                .await
                .map_err(|e| AppError::database(format!("Failed to count enrollments: {e}")))?;
            responses.push(Self::stage_response(stage, enrolled));
        }

        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle single stage lookup with its enrollments
    async fn handle_get_stage(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let stage = Self::load_stage(&resources, auth.club_id, &id).await?;
        let enrollments = resources
            .database
            .list_stage_enrollments(stage.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to list enrollments: {e}")))?;

        let mut enrollment_responses = Vec::with_capacity(enrollments.len());
        for enrollment in &enrollments {
            let installments = resources
                .database
                .list_installments(InstallmentParent::StageEnrollment, enrollment.id)
                .await
                .map_err(|e| AppError::database(format!("Failed to load plan: {e}")))?;
            enrollment_responses.push(Self::enrollment_response(enrollment, &installments));
        }

        let count = i64::try_from(enrollments.len()).unwrap_or(i64::MAX);
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "stage": Self::stage_response(&stage, count),
                "enrollments": enrollment_responses,
            })),
        )
            .into_response())
    }

    /// Handle stage enrollment with plan generation (staff only)
    async fn handle_enroll(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(request): Json<EnrollStageRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let stage = Self::load_stage(&resources, auth.club_id, &id).await?;

        let sportif_id = crate::utils::uuid::parse_uuid(&request.sportif_id)
            .map_err(|e| AppError::invalid_input(format!("Invalid sportif ID: {e}")))?;
        resources
            .database
            .get_sportif(auth.club_id, sportif_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load sportif: {e}")))?
            .ok_or_else(|| AppError::not_found("Sportif"))?;

        if resources
            .database
            .get_stage_enrollment(stage.id, sportif_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to check enrollment: {e}")))?
            .is_some()
        {
            return Err(AppError::already_exists(
                "Sportif is already enrolled in this stage",
            ));
        }

        if let Some(capacity) = stage.capacity {
            let enrolled = resources
                .database
                .count_stage_enrollments(stage.id)
                .await
                .map_err(|e| AppError::database(format!("Failed to count enrollments: {e}")))?;
            if enrolled >= i64::from(capacity) {
                return Err(AppError::conflict("Stage is full"));
            }
        }

        let enrollment = StageEnrollment::new(auth.club_id, stage.id, sportif_id);
        let installments = generate_installments(
            auth.club_id,
            InstallmentParent::StageEnrollment,
            enrollment.id,
            stage.amount_cents,
            request.installment_count,
            request.first_due_date,
        )?;

        resources
            .database
            .create_stage_enrollment(&enrollment, &installments)
            .await
            .map_err(|e| AppError::database(format!("Failed to enroll: {e}")))?;

        info!(
            club_id = %auth.club_id,
            stage_id = %stage.id,
            sportif_id = %sportif_id,
            "Stage enrollment created"
        );

        Ok((
            StatusCode::CREATED,
            Json(Self::enrollment_response(&enrollment, &installments)),
        )
            .into_response())
    }

    /// Handle marking an installment paid (staff only)
    async fn handle_pay(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let installment_id = crate::utils::uuid::parse_uuid(&id)
            .map_err(|e| AppError::invalid_input(format!("Invalid installment ID: {e}")))?;
        resources
            .database
            .get_installment(auth.club_id, installment_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load installment: {e}")))?
            .ok_or_else(|| AppError::not_found("Installment"))?;

        let updated = resources
            .database
            .mark_installment_paid(installment_id, Utc::now())
            .await
            .map_err(|e| AppError::database(format!("Failed to record payment: {e}")))?;
        if !updated {
            return Err(AppError::conflict("Installment is already paid"));
        }

        let installment = resources
            .database
            .get_installment(auth.club_id, installment_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to reload installment: {e}")))?
            .ok_or_else(|| AppError::not_found("Installment"))?;

        info!(club_id = %auth.club_id, installment_id = %installment_id, "Installment paid");

        Ok((StatusCode::OK, Json(InstallmentResponse::from(&installment))).into_response())
    }

    /// Handle the outstanding-payments report (staff only)
    async fn handle_outstanding(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_staff()?;

        let outstanding = resources
            .database
            .list_outstanding_installments(auth.club_id, Utc::now().date_naive())
            .await
            .map_err(|e| AppError::database(format!("Failed to list outstanding: {e}")))?;

        let responses: Vec<InstallmentResponse> =
            outstanding.iter().map(InstallmentResponse::from).collect();
        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    fn licence_response(licence: &Licence, installments: &[Installment]) -> LicenceResponse {
        LicenceResponse {
            id: licence.id.to_string(),
            sportif_id: licence.sportif_id.to_string(),
            season: licence.season.clone(),
            amount_cents: licence.amount_cents,
            status: PaymentStatus::derive(installments, Utc::now().date_naive()),
            installments: installments.iter().map(InstallmentResponse::from).collect(),
        }
    }

    fn stage_response(stage: &Stage, enrolled_count: i64) -> StageResponse {
        StageResponse {
            id: stage.id.to_string(),
            title: stage.title.clone(),
            category_id: stage.category_id.map(|id| id.to_string()),
            start_date: stage.start_date,
            end_date: stage.end_date,
            amount_cents: stage.amount_cents,
            capacity: stage.capacity,
            enrolled_count,
        }
    }

    fn enrollment_response(
        enrollment: &StageEnrollment,
        installments: &[Installment],
    ) -> EnrollmentResponse {
        EnrollmentResponse {
            id: enrollment.id.to_string(),
            stage_id: enrollment.stage_id.to_string(),
            sportif_id: enrollment.sportif_id.to_string(),
            status: PaymentStatus::derive(installments, Utc::now().date_naive()),
            installments: installments.iter().map(InstallmentResponse::from).collect(),
        }
    }

    /// Load a licence and verify club ownership
    async fn load_licence(
        resources: &Arc<ServerResources>,
        club_id: Uuid,
        id: &str,
    ) -> Result<Licence, AppError> {
        let licence_id = crate::utils::uuid::parse_uuid(id)
            .map_err(|e| AppError::invalid_input(format!("Invalid licence ID: {e}")))?;

        resources
            .database
            .get_licence(club_id, licence_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load licence: {e}")))?
            .ok_or_else(|| AppError::not_found("Licence"))
    }

    /// Load a stage and verify club ownership
    async fn load_stage(
        resources: &Arc<ServerResources>,
        club_id: Uuid,
        id: &str,
    ) -> Result<Stage, AppError> {
        let stage_id = crate::utils::uuid::parse_uuid(id)
            .map_err(|e| AppError::invalid_input(format!("Invalid stage ID: {e}")))?;

        resources
            .database
            .get_stage(club_id, stage_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load stage: {e}")))?
            .ok_or_else(|| AppError::not_found("Stage"))
    }
}
