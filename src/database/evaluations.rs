// ABOUTME: Skill evaluation database operations
// ABOUTME: Handles evaluation inserts, per-athlete history, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::SkillEvaluation;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create evaluation tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_evaluations(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS evaluations (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                sportif_id TEXT NOT NULL REFERENCES sportifs(id) ON DELETE CASCADE,
                coach_id TEXT NOT NULL REFERENCES users(id),
                skill TEXT NOT NULL,
                score REAL NOT NULL,
                comment TEXT,
                evaluated_on DATE NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_evaluations_sportif ON evaluations(sportif_id, skill)",
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Record one skill evaluation
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_evaluation(&self, evaluation: &SkillEvaluation) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO evaluations (
                id, club_id, sportif_id, coach_id, skill, score, comment, evaluated_on, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(evaluation.id.to_string())
        .bind(evaluation.club_id.to_string())
        .bind(evaluation.sportif_id.to_string())
        .bind(evaluation.coach_id.to_string())
        .bind(&evaluation.skill)
        .bind(evaluation.score)
        .bind(&evaluation.comment)
        .bind(evaluation.evaluated_on)
        .bind(evaluation.created_at)
        .execute(self.pool())
        .await?;

        Ok(evaluation.id)
    }

    /// Get one evaluation scoped to a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_evaluation(
        &self,
        club_id: Uuid,
        evaluation_id: Uuid,
    ) -> Result<Option<SkillEvaluation>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, sportif_id, coach_id, skill, score, comment, evaluated_on, created_at
            FROM evaluations WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(evaluation_id.to_string())
        .bind(club_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_evaluation(&row)).transpose()
    }

    /// List one athlete's evaluations, newest first, optionally by skill
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_sportif_evaluations(
        &self,
        sportif_id: Uuid,
        skill: Option<&str>,
    ) -> Result<Vec<SkillEvaluation>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, sportif_id, coach_id, skill, score, comment, evaluated_on, created_at
            FROM evaluations
            WHERE sportif_id = $1 AND ($2 IS NULL OR skill = $2)
            ORDER BY evaluated_on DESC, created_at DESC
            ",
        )
        .bind(sportif_id.to_string())
        .bind(skill)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_evaluation).collect()
    }

    /// Delete one evaluation
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_evaluation(&self, club_id: Uuid, evaluation_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM evaluations WHERE id = $1 AND club_id = $2")
            .bind(evaluation_id.to_string())
            .bind(club_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    fn row_to_evaluation(row: &sqlx::sqlite::SqliteRow) -> Result<SkillEvaluation> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let sportif_id: String = row.get("sportif_id");
        let coach_id: String = row.get("coach_id");

        Ok(SkillEvaluation {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            sportif_id: Uuid::parse_str(&sportif_id)?,
            coach_id: Uuid::parse_str(&coach_id)?,
            skill: row.get("skill"),
            score: row.get("score"),
            comment: row.get("comment"),
            evaluated_on: row.get("evaluated_on"),
            created_at: row.get("created_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::sportif::SportifParams;
    use crate::models::{Category, Club, SkillEvaluation, Sportif, User, UserRole};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_evaluation_history_ordering_and_filter() {
        let db = create_test_db().await.unwrap();
        let club = Club::new("Test Club".into(), "test-club".into());
        db.create_club(&club).await.unwrap();
        let category = Category::new(club.id, "U14".into(), None, None, None);
        db.create_category(&category).await.unwrap();
        let coach = User::new(
            club.id,
            "coach@test.example".into(),
            "hash".into(),
            None,
            UserRole::Coach,
        );
        db.create_user(&coach).await.unwrap();
        let sportif = Sportif::new(SportifParams {
            club_id: club.id,
            category_id: category.id,
            user_id: None,
            first_name: "Lina".into(),
            last_name: "Moreau".into(),
            birth_date: NaiveDate::from_ymd_opt(2012, 4, 2).unwrap(),
            licence_number: None,
            emergency_contact: None,
        });
        db.create_sportif(&sportif).await.unwrap();

        for (skill, score, day) in [("passing", 6.0, 1), ("passing", 7.5, 15), ("endurance", 5.0, 10)]
        {
            let evaluation = SkillEvaluation::new(
                club.id,
                sportif.id,
                coach.id,
                skill.into(),
                score,
                None,
                NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            )
            .unwrap();
            db.create_evaluation(&evaluation).await.unwrap();
        }

        let all = db.list_sportif_evaluations(sportif.id, None).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].evaluated_on, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());

        let passing = db
            .list_sportif_evaluations(sportif.id, Some("passing"))
            .await
            .unwrap();
        assert_eq!(passing.len(), 2);
        assert!((passing[0].score - 7.5).abs() < f64::EPSILON);
    }
}
