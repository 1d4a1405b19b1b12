// ABOUTME: Route module organization for the SportClub REST API
// ABOUTME: One domain per module, each exposing a Router built from shared resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Route modules for the SportClub REST API
//!
//! Each domain module contains its request/response types and thin handlers
//! that authenticate, enforce the caller's role, and delegate to the
//! database layer.

/// Attendance sheet and summary routes
pub mod attendance;
/// Authentication routes: club registration, login, refresh, profile
pub mod auth;
/// Category management routes
pub mod categories;
/// Club profile routes
pub mod clubs;
/// Skill evaluation routes
pub mod evaluations;
/// Health check and readiness routes
pub mod health;
/// Internal messaging routes
pub mod messages;
/// Licence, stage, and installment routes
pub mod payments;
/// Sportif (athlete profile) routes
pub mod sportifs;
/// Training and calendar routes
pub mod trainings;
/// User account management routes
pub mod users;

pub use attendance::AttendanceRoutes;
pub use auth::AuthRoutes;
pub use categories::CategoryRoutes;
pub use clubs::ClubRoutes;
pub use evaluations::EvaluationRoutes;
pub use health::HealthRoutes;
pub use messages::MessageRoutes;
pub use payments::PaymentRoutes;
pub use sportifs::SportifRoutes;
pub use trainings::TrainingRoutes;
pub use users::UserRoutes;
