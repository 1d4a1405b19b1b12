// ABOUTME: Common data models for the SportClub management platform
// ABOUTME: Re-exports club, user, category, sportif, training, payment, and messaging types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

/// Attendance records and per-athlete summaries
pub mod attendance;
/// Category (age/skill group) definitions
pub mod category;
/// Club tenant definitions
pub mod club;
/// Skill evaluation records
pub mod evaluation;
/// Internal messaging between club members
pub mod message;
/// Licence, stage, and installment payment tracking
pub mod payment;
/// Athlete profile definitions
pub mod sportif;
/// Training and event scheduling with occurrence expansion
pub mod training;
/// User accounts and roles
pub mod user;

pub use attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary};
pub use category::Category;
pub use club::Club;
pub use evaluation::SkillEvaluation;
pub use message::Message;
pub use payment::{
    generate_installments, Installment, InstallmentParent, Licence, PaymentStatus, Stage,
    StageEnrollment,
};
pub use sportif::Sportif;
pub use training::{Occurrence, Recurrence, Training, TrainingKind};
pub use user::{User, UserRole};
