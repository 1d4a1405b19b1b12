// ABOUTME: Attendance database operations for per-occurrence presence sheets
// ABOUTME: Upserts keyed on (training, sportif, date) and summary queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::{AttendanceRecord, AttendanceStatus};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create attendance tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_attendance(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS attendance (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                training_id TEXT NOT NULL REFERENCES trainings(id) ON DELETE CASCADE,
                sportif_id TEXT NOT NULL REFERENCES sportifs(id) ON DELETE CASCADE,
                date DATE NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('present', 'absent', 'excused', 'late')),
                recorded_by TEXT NOT NULL REFERENCES users(id),
                recorded_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (training_id, sportif_id, date)
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_attendance_sportif ON attendance(sportif_id, date)",
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Upsert one attendance record; a later write replaces the earlier one
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn upsert_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO attendance (
                id, club_id, training_id, sportif_id, date, status, recorded_by, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (training_id, sportif_id, date) DO UPDATE SET
                status = $6,
                recorded_by = $7,
                recorded_at = $8
            ",
        )
        .bind(record.id.to_string())
        .bind(record.club_id.to_string())
        .bind(record.training_id.to_string())
        .bind(record.sportif_id.to_string())
        .bind(record.date)
        .bind(record.status.as_str())
        .bind(record.recorded_by.to_string())
        .bind(record.recorded_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Get the attendance sheet of one training occurrence
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_attendance_sheet(
        &self,
        training_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, training_id, sportif_id, date, status, recorded_by, recorded_at
            FROM attendance WHERE training_id = $1 AND date = $2
            ORDER BY sportif_id
            ",
        )
        .bind(training_id.to_string())
        .bind(date)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_attendance).collect()
    }

    /// List one athlete's recorded statuses inside a date window
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_sportif_attendance(
        &self,
        sportif_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, training_id, sportif_id, date, status, recorded_by, recorded_at
            FROM attendance
            WHERE sportif_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date
            ",
        )
        .bind(sportif_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_attendance).collect()
    }

    fn row_to_attendance(row: &sqlx::sqlite::SqliteRow) -> Result<AttendanceRecord> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let training_id: String = row.get("training_id");
        let sportif_id: String = row.get("sportif_id");
        let status: String = row.get("status");
        let recorded_by: String = row.get("recorded_by");

        Ok(AttendanceRecord {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            training_id: Uuid::parse_str(&training_id)?,
            sportif_id: Uuid::parse_str(&sportif_id)?,
            date: row.get("date"),
            status: status
                .parse::<AttendanceStatus>()
                .map_err(|e| anyhow!("{e}"))?,
            recorded_by: Uuid::parse_str(&recorded_by)?,
            recorded_at: row.get("recorded_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::sportif::SportifParams;
    use crate::models::training::TrainingParams;
    use crate::models::{
        AttendanceRecord, AttendanceStatus, Category, Club, Recurrence, Sportif, Training,
        TrainingKind, User, UserRole,
    };
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    struct Fixture {
        club: Club,
        training: Training,
        sportif: Sportif,
        coach: User,
    }

    async fn seed(db: &crate::database::Database) -> Fixture {
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
        let training = Training::new(TrainingParams {
            club_id: club.id,
            category_id: category.id,
            kind: TrainingKind::Session,
            title: "Weekly session".into(),
            location: None,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            duration_minutes: 60,
            recurrence: Recurrence::Weekly {
                until: NaiveDate::from_ymd_opt(2026, 12, 16).unwrap(),
            },
            opponent: None,
            notes: None,
        });
        db.create_training(&training).await.unwrap();
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
        Fixture {
            club,
            training,
            sportif,
            coach,
        }
    }

    fn record(f: &Fixture, date: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            club_id: f.club.id,
            training_id: f.training.id,
            sportif_id: f.sportif.id,
            date,
            status,
            recorded_by: f.coach.id,
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_earlier_record() {
        let db = create_test_db().await.unwrap();
        let f = seed(&db).await;
        let date = NaiveDate::from_ymd_opt(2026, 9, 9).unwrap();

        db.upsert_attendance(&record(&f, date, AttendanceStatus::Absent))
            .await
            .unwrap();
        db.upsert_attendance(&record(&f, date, AttendanceStatus::Excused))
            .await
            .unwrap();

        let sheet = db.get_attendance_sheet(f.training.id, date).await.unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet[0].status, AttendanceStatus::Excused);
    }

    #[tokio::test]
    async fn test_sportif_attendance_window() {
        let db = create_test_db().await.unwrap();
        let f = seed(&db).await;

        for (day, status) in [
            (2, AttendanceStatus::Present),
            (9, AttendanceStatus::Late),
            (16, AttendanceStatus::Absent),
        ] {
            let date = NaiveDate::from_ymd_opt(2026, 9, day).unwrap();
            db.upsert_attendance(&record(&f, date, status)).await.unwrap();
        }

        let window = db
            .list_sportif_attendance(
                f.sportif.id,
                NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
                NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(window.len(), 2);
    }
}
