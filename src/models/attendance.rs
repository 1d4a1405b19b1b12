// ABOUTME: Attendance models for per-occurrence presence tracking
// ABOUTME: AttendanceRecord, AttendanceStatus, and per-athlete summary computation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Presence status for one athlete at one training occurrence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Present on time
    Present,
    /// Absent without excuse
    Absent,
    /// Absence excused in advance
    Excused,
    /// Arrived late
    Late,
}

impl AttendanceStatus {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Excused => "excused",
            Self::Late => "late",
        }
    }

    /// Whether this status counts as attended for rate computation
    #[must_use]
    pub const fn counts_as_attended(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "excused" => Ok(Self::Excused),
            "late" => Ok(Self::Late),
            _ => Err(AppError::invalid_input(format!(
                "Invalid attendance status: {s}"
            ))),
        }
    }
}

/// One athlete's recorded presence at one training occurrence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique record identifier
    pub id: Uuid,
    /// Club the record belongs to
    pub club_id: Uuid,
    /// Training the occurrence belongs to
    pub training_id: Uuid,
    /// Athlete the record is about
    pub sportif_id: Uuid,
    /// Occurrence date
    pub date: NaiveDate,
    /// Recorded status
    pub status: AttendanceStatus,
    /// Staff user who recorded the sheet
    pub recorded_by: Uuid,
    /// When the record was written
    pub recorded_at: DateTime<Utc>,
}

/// Per-athlete attendance summary over a period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Athlete the summary is about
    pub sportif_id: Uuid,
    /// Total recorded occurrences
    pub total: u32,
    /// Occurrences marked present
    pub present: u32,
    /// Occurrences marked late
    pub late: u32,
    /// Occurrences marked excused
    pub excused: u32,
    /// Occurrences marked absent
    pub absent: u32,
    /// (present + late) / total, 0.0 when nothing is recorded
    pub attendance_rate: f64,
}

impl AttendanceSummary {
    /// Build a summary from the recorded statuses of one athlete
    #[must_use]
    pub fn from_statuses(sportif_id: Uuid, statuses: &[AttendanceStatus]) -> Self {
        let mut summary = Self {
            sportif_id,
            total: 0,
            present: 0,
            late: 0,
            excused: 0,
            absent: 0,
            attendance_rate: 0.0,
        };
        for status in statuses {
            summary.total += 1;
            match status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::Excused => summary.excused += 1,
                AttendanceStatus::Absent => summary.absent += 1,
            }
        }
        if summary.total > 0 {
            summary.attendance_rate =
                f64::from(summary.present + summary.late) / f64::from(summary.total);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_and_rate() {
        use AttendanceStatus::{Absent, Excused, Late, Present};
        let statuses = [Present, Present, Late, Excused, Absent];
        let summary = AttendanceSummary::from_statuses(Uuid::new_v4(), &statuses);

        assert_eq!(summary.total, 5);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.excused, 1);
        assert_eq!(summary.absent, 1);
        // Late counts as attended
        assert!((summary.attendance_rate - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_empty() {
        let summary = AttendanceSummary::from_statuses(Uuid::new_v4(), &[]);
        assert_eq!(summary.total, 0);
        assert!((summary.attendance_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Excused,
            AttendanceStatus::Late,
        ] {
            assert_eq!(status.as_str().parse::<AttendanceStatus>().unwrap(), status);
        }
        assert!("missing".parse::<AttendanceStatus>().is_err());
    }
}
