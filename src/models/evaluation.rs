// ABOUTME: Skill evaluation model for coach assessments of athletes
// ABOUTME: Scores are bounded to [0, 10] and attached to a named skill
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Maximum score a skill evaluation can carry
pub const MAX_SCORE: f64 = 10.0;

/// One coach-recorded skill evaluation for an athlete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEvaluation {
    /// Unique evaluation identifier
    pub id: Uuid,
    /// Club the evaluation belongs to
    pub club_id: Uuid,
    /// Athlete being evaluated
    pub sportif_id: Uuid,
    /// Staff user who recorded the evaluation
    pub coach_id: Uuid,
    /// Skill name (e.g. "passing", "endurance")
    pub skill: String,
    /// Score in [0, 10]
    pub score: f64,
    /// Optional free-form comment
    pub comment: Option<String>,
    /// Date the evaluation was performed
    pub evaluated_on: NaiveDate,
    /// When the record was written
    pub created_at: DateTime<Utc>,
}

impl SkillEvaluation {
    /// Create a new evaluation, validating the score bounds
    ///
    /// # Errors
    ///
    /// Returns an error if the score is outside [0, 10] or the skill name
    /// is empty.
    pub fn new(
        club_id: Uuid,
        sportif_id: Uuid,
        coach_id: Uuid,
        skill: String,
        score: f64,
        comment: Option<String>,
        evaluated_on: NaiveDate,
    ) -> Result<Self, AppError> {
        if !(0.0..=MAX_SCORE).contains(&score) {
            return Err(AppError::new(
                crate::errors::ErrorCode::ValueOutOfRange,
                format!("Score must be between 0 and {MAX_SCORE}, got {score}"),
            ));
        }
        if skill.trim().is_empty() {
            return Err(AppError::invalid_input("Skill name must not be empty"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            club_id,
            sportif_id,
            coach_id,
            skill,
            score,
            comment,
            evaluated_on,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(score: f64, skill: &str) -> Result<SkillEvaluation, AppError> {
        SkillEvaluation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            skill.into(),
            score,
            None,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        )
    }

    #[test]
    fn test_score_bounds() {
        assert!(build(0.0, "passing").is_ok());
        assert!(build(10.0, "passing").is_ok());
        assert!(build(10.5, "passing").is_err());
        assert!(build(-0.1, "passing").is_err());
    }

    #[test]
    fn test_empty_skill_rejected() {
        assert!(build(5.0, "  ").is_err());
    }
}
