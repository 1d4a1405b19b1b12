// ABOUTME: Licence, stage, and installment models for payment tracking
// ABOUTME: Installment generation splits a total into equal monthly amounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};

/// Maximum number of installments a payment plan may carry
pub const MAX_INSTALLMENTS: u32 = 12;

/// Paid registration for a season licence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Licence {
    /// Unique licence identifier
    pub id: Uuid,
    /// Club the licence belongs to
    pub club_id: Uuid,
    /// Athlete the licence is for
    pub sportif_id: Uuid,
    /// Season label (e.g. "2026-2027")
    pub season: String,
    /// Total amount in cents
    pub amount_cents: i64,
    /// When the licence was created
    pub created_at: DateTime<Utc>,
}

impl Licence {
    /// Create a new licence record
    #[must_use]
    pub fn new(club_id: Uuid, sportif_id: Uuid, season: String, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            club_id,
            sportif_id,
            season,
            amount_cents,
            created_at: Utc::now(),
        }
    }
}

/// Paid training camp with a date range and optional capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Unique stage identifier
    pub id: Uuid,
    /// Club the stage belongs to
    pub club_id: Uuid,
    /// Display title
    pub title: String,
    /// Category the stage targets, if restricted
    pub category_id: Option<Uuid>,
    /// First day of the stage
    pub start_date: NaiveDate,
    /// Last day of the stage (inclusive)
    pub end_date: NaiveDate,
    /// Total amount in cents per enrollment
    pub amount_cents: i64,
    /// Maximum number of enrollments, if capped
    pub capacity: Option<u32>,
    /// When the stage was created
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a stage
pub struct StageParams {
    /// Club the stage belongs to
    pub club_id: Uuid,
    /// Display title
    pub title: String,
    /// Category the stage targets, if restricted
    pub category_id: Option<Uuid>,
    /// First day of the stage
    pub start_date: NaiveDate,
    /// Last day of the stage (inclusive)
    pub end_date: NaiveDate,
    /// Total amount in cents per enrollment
    pub amount_cents: i64,
    /// Maximum number of enrollments, if capped
    pub capacity: Option<u32>,
}

impl Stage {
    /// Create a new stage, validating the date range
    ///
    /// # Errors
    ///
    /// Returns an error if the end date precedes the start date
    pub fn new(params: StageParams) -> Result<Self, AppError> {
        if params.end_date < params.start_date {
            return Err(AppError::invalid_input(
                "Stage end date must be on or after the start date",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            club_id: params.club_id,
            title: params.title,
            category_id: params.category_id,
            start_date: params.start_date,
            end_date: params.end_date,
            amount_cents: params.amount_cents,
            capacity: params.capacity,
            created_at: Utc::now(),
        })
    }
}

/// One athlete's enrollment in a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEnrollment {
    /// Unique enrollment identifier
    pub id: Uuid,
    /// Club the enrollment belongs to
    pub club_id: Uuid,
    /// Stage enrolled in
    pub stage_id: Uuid,
    /// Athlete enrolled
    pub sportif_id: Uuid,
    /// When the enrollment was created
    pub created_at: DateTime<Utc>,
}

impl StageEnrollment {
    /// Create a new enrollment record
    #[must_use]
    pub fn new(club_id: Uuid, stage_id: Uuid, sportif_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            club_id,
            stage_id,
            sportif_id,
            created_at: Utc::now(),
        }
    }
}

/// What a payment plan is attached to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentParent {
    /// Season licence
    Licence,
    /// Stage enrollment
    StageEnrollment,
}

impl InstallmentParent {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Licence => "licence",
            Self::StageEnrollment => "stage_enrollment",
        }
    }
}

impl Display for InstallmentParent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InstallmentParent {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "licence" => Ok(Self::Licence),
            "stage_enrollment" => Ok(Self::StageEnrollment),
            _ => Err(AppError::invalid_input(format!(
                "Invalid installment parent: {s}"
            ))),
        }
    }
}

/// One installment of a payment plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    /// Unique installment identifier
    pub id: Uuid,
    /// Club the installment belongs to
    pub club_id: Uuid,
    /// Kind of record the plan is attached to
    pub parent_kind: InstallmentParent,
    /// Licence or enrollment id
    pub parent_id: Uuid,
    /// Position in the plan, starting at 1
    pub seq: u32,
    /// Amount in cents
    pub amount_cents: i64,
    /// Date the installment falls due
    pub due_date: NaiveDate,
    /// When the installment was paid, if it was
    pub paid_at: Option<DateTime<Utc>>,
}

/// Derived payment status of a plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No installment paid, none past due
    Pending,
    /// Some installments paid, none past due
    Partial,
    /// Every installment paid
    Paid,
    /// At least one unpaid installment past its due date
    Overdue,
}

impl PaymentStatus {
    /// Derive the status of a plan from its installments as of `today`
    ///
    /// Overdue wins over partial; an empty plan is pending.
    #[must_use]
    pub fn derive(installments: &[Installment], today: NaiveDate) -> Self {
        if installments.is_empty() {
            return Self::Pending;
        }
        let all_paid = installments.iter().all(|i| i.paid_at.is_some());
        if all_paid {
            return Self::Paid;
        }
        let any_overdue = installments
            .iter()
            .any(|i| i.paid_at.is_none() && i.due_date < today);
        if any_overdue {
            return Self::Overdue;
        }
        if installments.iter().any(|i| i.paid_at.is_some()) {
            return Self::Partial;
        }
        Self::Pending
    }
}

/// Split a total into equal installments spaced one month apart
///
/// Amounts always sum exactly to `total_cents`; any remainder cents land on
/// the first installment. Due dates are `first_due + k months`, clamped to
/// month-end when the day does not exist (Jan 31 + 1 month = Feb 28/29).
///
/// # Errors
///
/// Returns an error if `count` is 0 or above [`MAX_INSTALLMENTS`], or if the
/// total is negative.
pub fn generate_installments(
    club_id: Uuid,
    parent_kind: InstallmentParent,
    parent_id: Uuid,
    total_cents: i64,
    count: u32,
    first_due: NaiveDate,
) -> Result<Vec<Installment>, AppError> {
    if count == 0 || count > MAX_INSTALLMENTS {
        return Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("Installment count must be between 1 and {MAX_INSTALLMENTS}, got {count}"),
        ));
    }
    if total_cents < 0 {
        return Err(AppError::invalid_input("Amount must not be negative"));
    }

    let count_i64 = i64::from(count);
    let base = total_cents / count_i64;
    let remainder = total_cents % count_i64;

    let mut installments = Vec::with_capacity(count as usize);
    for seq in 1..=count {
        let amount = if seq == 1 { base + remainder } else { base };
        let due_date = first_due + Months::new(seq - 1);
        installments.push(Installment {
            id: Uuid::new_v4(),
            club_id,
            parent_kind,
            parent_id,
            seq,
            amount_cents: amount,
            due_date,
            paid_at: None,
        });
    }
    Ok(installments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan(total: i64, count: u32, first_due: NaiveDate) -> Vec<Installment> {
        generate_installments(
            Uuid::new_v4(),
            InstallmentParent::Licence,
            Uuid::new_v4(),
            total,
            count,
            first_due,
        )
        .unwrap()
    }

    #[test]
    fn test_amounts_sum_to_total() {
        // 250.00 EUR over 3: remainder cent lands on the first installment
        let installments = plan(25_000, 3, date(2026, 9, 1));
        let amounts: Vec<i64> = installments.iter().map(|i| i.amount_cents).collect();
        assert_eq!(amounts, vec![8334, 8333, 8333]);
        assert_eq!(amounts.iter().sum::<i64>(), 25_000);
    }

    #[test]
    fn test_even_split_has_no_remainder() {
        let installments = plan(30_000, 4, date(2026, 9, 1));
        assert!(installments.iter().all(|i| i.amount_cents == 7500));
    }

    #[test]
    fn test_due_dates_spaced_by_month() {
        let installments = plan(9_000, 3, date(2026, 9, 15));
        let dues: Vec<NaiveDate> = installments.iter().map(|i| i.due_date).collect();
        assert_eq!(
            dues,
            vec![date(2026, 9, 15), date(2026, 10, 15), date(2026, 11, 15)]
        );
    }

    #[test]
    fn test_month_end_clamping() {
        // Jan 31 -> Feb 28 (2026 is not a leap year) -> Mar 31
        let installments = plan(9_000, 3, date(2026, 1, 31));
        let dues: Vec<NaiveDate> = installments.iter().map(|i| i.due_date).collect();
        assert_eq!(
            dues,
            vec![date(2026, 1, 31), date(2026, 2, 28), date(2026, 3, 31)]
        );
    }

    #[test]
    fn test_count_bounds() {
        let parent = Uuid::new_v4();
        let club = Uuid::new_v4();
        assert!(generate_installments(
            club,
            InstallmentParent::Licence,
            parent,
            1000,
            0,
            date(2026, 1, 1)
        )
        .is_err());
        assert!(generate_installments(
            club,
            InstallmentParent::Licence,
            parent,
            1000,
            13,
            date(2026, 1, 1)
        )
        .is_err());
    }

    #[test]
    fn test_status_derivation() {
        let today = date(2026, 10, 1);
        let mut installments = plan(9_000, 3, date(2026, 10, 15));
        assert_eq!(
            PaymentStatus::derive(&installments, today),
            PaymentStatus::Pending
        );

        installments[0].paid_at = Some(Utc::now());
        assert_eq!(
            PaymentStatus::derive(&installments, today),
            PaymentStatus::Partial
        );

        // An unpaid installment slips past its due date: overdue wins over partial
        assert_eq!(
            PaymentStatus::derive(&installments, date(2026, 11, 16)),
            PaymentStatus::Overdue
        );

        for installment in &mut installments {
            installment.paid_at = Some(Utc::now());
        }
        assert_eq!(
            PaymentStatus::derive(&installments, date(2027, 1, 1)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_empty_plan_is_pending() {
        assert_eq!(
            PaymentStatus::derive(&[], date(2026, 1, 1)),
            PaymentStatus::Pending
        );
    }
}
