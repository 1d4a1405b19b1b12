// ABOUTME: Training and event database operations
// ABOUTME: Handles training CRUD with kind/category filters and recurrence storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::{Recurrence, Training};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create training tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_trainings(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainings (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                category_id TEXT NOT NULL REFERENCES categories(id),
                kind TEXT NOT NULL CHECK (kind IN ('session', 'match', 'tournament')),
                title TEXT NOT NULL,
                location TEXT,
                start_date DATE NOT NULL,
                start_time TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                recurrence TEXT NOT NULL CHECK (recurrence IN ('one_off', 'weekly')),
                weekly_until DATE,
                opponent TEXT,
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trainings_club ON trainings(club_id)")
            .execute(self.pool())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trainings_category ON trainings(category_id)")
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Create a training
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_training(&self, training: &Training) -> Result<Uuid> {
        let (recurrence, weekly_until) = Self::recurrence_columns(training.recurrence);

        sqlx::query(
            r"
            INSERT INTO trainings (
                id, club_id, category_id, kind, title, location, start_date,
                start_time, duration_minutes, recurrence, weekly_until,
                opponent, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ",
        )
        .bind(training.id.to_string())
        .bind(training.club_id.to_string())
        .bind(training.category_id.to_string())
        .bind(training.kind.as_str())
        .bind(&training.title)
        .bind(&training.location)
        .bind(training.start_date)
        .bind(training.start_time)
        .bind(i64::from(training.duration_minutes))
        .bind(recurrence)
        .bind(weekly_until)
        .bind(&training.opponent)
        .bind(&training.notes)
        .bind(training.created_at)
        .bind(training.updated_at)
        .execute(self.pool())
        .await?;

        Ok(training.id)
    }

    /// Get a training scoped to a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_training(&self, club_id: Uuid, training_id: Uuid) -> Result<Option<Training>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, category_id, kind, title, location, start_date,
                   start_time, duration_minutes, recurrence, weekly_until,
                   opponent, notes, created_at, updated_at
            FROM trainings WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(training_id.to_string())
        .bind(club_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_training(&row)).transpose()
    }

    /// List trainings of a club with optional category and kind filters
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_trainings(
        &self,
        club_id: Uuid,
        category_id: Option<Uuid>,
        kind: Option<&str>,
    ) -> Result<Vec<Training>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, category_id, kind, title, location, start_date,
                   start_time, duration_minutes, recurrence, weekly_until,
                   opponent, notes, created_at, updated_at
            FROM trainings
            WHERE club_id = $1
              AND ($2 IS NULL OR category_id = $2)
              AND ($3 IS NULL OR kind = $3)
            ORDER BY start_date, start_time
            ",
        )
        .bind(club_id.to_string())
        .bind(category_id.map(|id| id.to_string()))
        .bind(kind)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_training).collect()
    }

    /// Update a training
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_training(&self, training: &Training) -> Result<()> {
        let (recurrence, weekly_until) = Self::recurrence_columns(training.recurrence);

        sqlx::query(
            r"
            UPDATE trainings SET
                category_id = $3,
                kind = $4,
                title = $5,
                location = $6,
                start_date = $7,
                start_time = $8,
                duration_minutes = $9,
                recurrence = $10,
                weekly_until = $11,
                opponent = $12,
                notes = $13,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(training.id.to_string())
        .bind(training.club_id.to_string())
        .bind(training.category_id.to_string())
        .bind(training.kind.as_str())
        .bind(&training.title)
        .bind(&training.location)
        .bind(training.start_date)
        .bind(training.start_time)
        .bind(i64::from(training.duration_minutes))
        .bind(recurrence)
        .bind(weekly_until)
        .bind(&training.opponent)
        .bind(&training.notes)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Delete a training and its attendance records
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_training(&self, club_id: Uuid, training_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM trainings WHERE id = $1 AND club_id = $2")
            .bind(training_id.to_string())
            .bind(club_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    const fn recurrence_columns(recurrence: Recurrence) -> (&'static str, Option<NaiveDate>) {
        match recurrence {
            Recurrence::OneOff => ("one_off", None),
            Recurrence::Weekly { until } => ("weekly", Some(until)),
        }
    }

    fn row_to_training(row: &sqlx::sqlite::SqliteRow) -> Result<Training> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let category_id: String = row.get("category_id");
        let kind: String = row.get("kind");
        let recurrence: String = row.get("recurrence");
        let weekly_until: Option<NaiveDate> = row.get("weekly_until");
        let duration_minutes: i64 = row.get("duration_minutes");

        let recurrence = match recurrence.as_str() {
            "one_off" => Recurrence::OneOff,
            "weekly" => Recurrence::Weekly {
                until: weekly_until
                    .ok_or_else(|| anyhow!("Weekly training is missing its end date"))?,
            },
            other => return Err(anyhow!("Unknown recurrence rule: {other}")),
        };

        Ok(Training {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            category_id: Uuid::parse_str(&category_id)?,
            kind: kind.parse().map_err(|e| anyhow!("{e}"))?,
            title: row.get("title"),
            location: row.get("location"),
            start_date: row.get("start_date"),
            start_time: row.get("start_time"),
            duration_minutes: u32::try_from(duration_minutes)?,
            recurrence,
            opponent: row.get("opponent"),
            notes: row.get("notes"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::training::TrainingParams;
    use crate::models::{Category, Club, Recurrence, Training, TrainingKind};
    use chrono::{NaiveDate, NaiveTime};

    async fn seed(db: &crate::database::Database) -> (Club, Category) {
        let club = Club::new("Test Club".into(), "test-club".into());
        db.create_club(&club).await.unwrap();
        let category = Category::new(club.id, "U14".into(), None, None, None);
        db.create_category(&category).await.unwrap();
        (club, category)
    }

    fn weekly(club: &Club, category: &Category) -> Training {
        Training::new(TrainingParams {
            club_id: club.id,
            category_id: category.id,
            kind: TrainingKind::Session,
            title: "U14 technique".into(),
            location: None,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            duration_minutes: 90,
            recurrence: Recurrence::Weekly {
                until: NaiveDate::from_ymd_opt(2026, 12, 16).unwrap(),
            },
            opponent: None,
            notes: None,
        })
    }

    #[tokio::test]
    async fn test_training_roundtrip_preserves_recurrence() {
        let db = create_test_db().await.unwrap();
        let (club, category) = seed(&db).await;
        let training = weekly(&club, &category);
        db.create_training(&training).await.unwrap();

        let fetched = db.get_training(club.id, training.id).await.unwrap().unwrap();
        assert_eq!(fetched.recurrence, training.recurrence);
        assert_eq!(fetched.start_time, training.start_time);
        assert_eq!(fetched.duration_minutes, 90);
    }

    #[tokio::test]
    async fn test_list_trainings_kind_filter() {
        let db = create_test_db().await.unwrap();
        let (club, category) = seed(&db).await;
        db.create_training(&weekly(&club, &category)).await.unwrap();

        let mut game = weekly(&club, &category);
        game.id = uuid::Uuid::new_v4();
        game.kind = TrainingKind::Match;
        game.recurrence = Recurrence::OneOff;
        game.opponent = Some("FC Lattes".into());
        db.create_training(&game).await.unwrap();

        let matches = db
            .list_trainings(club.id, None, Some("match"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].opponent.as_deref(), Some("FC Lattes"));

        let all = db.list_trainings(club.id, Some(category.id), None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
