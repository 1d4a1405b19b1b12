// ABOUTME: Training and event models with weekly recurrence expansion
// ABOUTME: Training, TrainingKind, Recurrence, and dated Occurrence definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Kind of scheduled event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrainingKind {
    /// Regular training session, may recur weekly
    Session,
    /// One-off match against an opponent
    Match,
    /// One-off tournament
    Tournament,
}

impl TrainingKind {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Match => "match",
            Self::Tournament => "tournament",
        }
    }

    /// Whether this kind may carry a weekly recurrence rule
    #[must_use]
    pub const fn may_recur(&self) -> bool {
        matches!(self, Self::Session)
    }
}

impl Display for TrainingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrainingKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" => Ok(Self::Session),
            "match" => Ok(Self::Match),
            "tournament" => Ok(Self::Tournament),
            _ => Err(AppError::invalid_input(format!(
                "Invalid training kind: {s}"
            ))),
        }
    }
}

/// Recurrence rule for a training
///
/// Weekly trainings recur on the weekday of their `start_date`; the rule
/// carries only the inclusive end date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Recurrence {
    /// Single occurrence on the start date
    OneOff,
    /// Repeats every week from the start date through `until` (inclusive)
    Weekly {
        /// Last date on which an occurrence may fall
        until: NaiveDate,
    },
}

/// Scheduled training or event tied to a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
    /// Unique training identifier
    pub id: Uuid,
    /// Club this training belongs to
    pub club_id: Uuid,
    /// Category the training is scheduled for
    pub category_id: Uuid,
    /// Kind of event
    pub kind: TrainingKind,
    /// Display title
    pub title: String,
    /// Venue, if known
    pub location: Option<String>,
    /// First (or only) date of the event
    pub start_date: NaiveDate,
    /// Start time of each occurrence
    pub start_time: NaiveTime,
    /// Duration of each occurrence in minutes
    pub duration_minutes: u32,
    /// Recurrence rule
    pub recurrence: Recurrence,
    /// Opponent name for matches
    pub opponent: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the training was created
    pub created_at: DateTime<Utc>,
    /// When the training was last updated
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a training
pub struct TrainingParams {
    /// Club the training belongs to
    pub club_id: Uuid,
    /// Category the training is scheduled for
    pub category_id: Uuid,
    /// Kind of event
    pub kind: TrainingKind,
    /// Display title
    pub title: String,
    /// Venue, if known
    pub location: Option<String>,
    /// First (or only) date of the event
    pub start_date: NaiveDate,
    /// Start time of each occurrence
    pub start_time: NaiveTime,
    /// Duration of each occurrence in minutes
    pub duration_minutes: u32,
    /// Recurrence rule
    pub recurrence: Recurrence,
    /// Opponent name for matches
    pub opponent: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// One dated occurrence of a training
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occurrence {
    /// Training this occurrence belongs to
    pub training_id: Uuid,
    /// Date of the occurrence
    pub date: NaiveDate,
    /// Start time
    pub start_time: NaiveTime,
    /// Duration in minutes
    pub duration_minutes: u32,
}

impl Training {
    /// Create a new training from parameters
    #[must_use]
    pub fn new(params: TrainingParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            club_id: params.club_id,
            category_id: params.category_id,
            kind: params.kind,
            title: params.title,
            location: params.location,
            start_date: params.start_date,
            start_time: params.start_time,
            duration_minutes: params.duration_minutes,
            recurrence: params.recurrence,
            opponent: params.opponent,
            notes: params.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the recurrence rule against the kind and start date
    ///
    /// # Errors
    ///
    /// Returns an error if a weekly rule is attached to a match/tournament
    /// or ends before it starts.
    pub fn validate_recurrence(&self) -> Result<(), AppError> {
        if let Recurrence::Weekly { until } = self.recurrence {
            if !self.kind.may_recur() {
                return Err(AppError::invalid_input(format!(
                    "A {} cannot recur weekly",
                    self.kind
                )));
            }
            if until < self.start_date {
                return Err(AppError::invalid_input(
                    "Weekly recurrence must end on or after the start date",
                ));
            }
        }
        Ok(())
    }

    /// Whether the training has an occurrence on the given date
    #[must_use]
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        match self.recurrence {
            Recurrence::OneOff => date == self.start_date,
            Recurrence::Weekly { until } => {
                date >= self.start_date
                    && date <= until
                    && date.weekday() == self.start_date.weekday()
            }
        }
    }

    /// Expand the recurrence rule into dated occurrences inside `[from, to]`
    ///
    /// A one-off yields zero or one occurrence. A weekly rule starts on
    /// `start_date`, steps seven days at a time, and stops past `until` or
    /// past the window.
    #[must_use]
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Occurrence> {
        if from > to {
            return Vec::new();
        }
        match self.recurrence {
            Recurrence::OneOff => {
                if self.start_date >= from && self.start_date <= to {
                    vec![self.occurrence_on(self.start_date)]
                } else {
                    Vec::new()
                }
            }
            Recurrence::Weekly { until } => {
                let last = until.min(to);
                // Skip whole weeks to the first candidate on/after `from`
                let mut date = if from > self.start_date {
                    let days_behind = (from - self.start_date).num_days();
                    self.start_date + Duration::days((days_behind + 6) / 7 * 7)
                } else {
                    self.start_date
                };
                let mut occurrences = Vec::new();
                while date <= last {
                    occurrences.push(self.occurrence_on(date));
                    date += Duration::days(7);
                }
                occurrences
            }
        }
    }

    fn occurrence_on(&self, date: NaiveDate) -> Occurrence {
        Occurrence {
            training_id: self.id,
            date,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly_training(start: NaiveDate, until: NaiveDate) -> Training {
        Training::new(TrainingParams {
            club_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            kind: TrainingKind::Session,
            title: "U14 technique".into(),
            location: Some("Gymnase Jean Moulin".into()),
            start_date: start,
            start_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            duration_minutes: 90,
            recurrence: Recurrence::Weekly { until },
            opponent: None,
            notes: None,
        })
    }

    #[test]
    fn test_one_off_occurrence_in_window() {
        let mut t = weekly_training(date(2026, 9, 2), date(2026, 9, 2));
        t.kind = TrainingKind::Match;
        t.recurrence = Recurrence::OneOff;

        assert_eq!(t.occurrences_between(date(2026, 9, 1), date(2026, 9, 30)).len(), 1);
        assert!(t.occurrences_between(date(2026, 10, 1), date(2026, 10, 31)).is_empty());
    }

    #[test]
    fn test_weekly_expansion_full_window() {
        // 2026-09-02 is a Wednesday; four Wednesdays through 2026-09-23
        let t = weekly_training(date(2026, 9, 2), date(2026, 9, 23));
        let occ = t.occurrences_between(date(2026, 9, 1), date(2026, 9, 30));
        let dates: Vec<NaiveDate> = occ.iter().map(|o| o.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2026, 9, 2),
                date(2026, 9, 9),
                date(2026, 9, 16),
                date(2026, 9, 23)
            ]
        );
    }

    #[test]
    fn test_weekly_expansion_partial_window() {
        let t = weekly_training(date(2026, 9, 2), date(2026, 12, 16));
        // Window starting mid-stream lands on the next aligned Wednesday
        let occ = t.occurrences_between(date(2026, 9, 10), date(2026, 9, 24));
        let dates: Vec<NaiveDate> = occ.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2026, 9, 16), date(2026, 9, 23)]);
    }

    #[test]
    fn test_weekly_expansion_window_before_start() {
        let t = weekly_training(date(2026, 9, 2), date(2026, 12, 16));
        assert!(t.occurrences_between(date(2026, 8, 1), date(2026, 8, 31)).is_empty());
    }

    #[test]
    fn test_occurs_on() {
        let t = weekly_training(date(2026, 9, 2), date(2026, 9, 23));
        assert!(t.occurs_on(date(2026, 9, 9)));
        // Same weekday, past `until`
        assert!(!t.occurs_on(date(2026, 9, 30)));
        // Wrong weekday
        assert!(!t.occurs_on(date(2026, 9, 10)));
    }

    #[test]
    fn test_validate_recurrence() {
        let t = weekly_training(date(2026, 9, 2), date(2026, 9, 23));
        assert!(t.validate_recurrence().is_ok());

        let mut bad_kind = weekly_training(date(2026, 9, 2), date(2026, 9, 23));
        bad_kind.kind = TrainingKind::Match;
        assert!(bad_kind.validate_recurrence().is_err());

        let backwards = weekly_training(date(2026, 9, 23), date(2026, 9, 2));
        assert!(backwards.validate_recurrence().is_err());
    }
}
