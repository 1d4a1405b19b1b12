// ABOUTME: Licence, stage, and installment database operations
// ABOUTME: Plans are written transactionally; payment state lives on installments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::{Installment, InstallmentParent, Licence, Stage, StageEnrollment};
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create payment tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_payments(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS licences (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                sportif_id TEXT NOT NULL REFERENCES sportifs(id) ON DELETE CASCADE,
                season TEXT NOT NULL,
                amount_cents INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS stages (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                category_id TEXT REFERENCES categories(id),
                start_date DATE NOT NULL,
                end_date DATE NOT NULL,
                amount_cents INTEGER NOT NULL,
                capacity INTEGER,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS stage_enrollments (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                stage_id TEXT NOT NULL REFERENCES stages(id) ON DELETE CASCADE,
                sportif_id TEXT NOT NULL REFERENCES sportifs(id) ON DELETE CASCADE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (stage_id, sportif_id)
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS installments (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                parent_kind TEXT NOT NULL CHECK (parent_kind IN ('licence', 'stage_enrollment')),
                parent_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                amount_cents INTEGER NOT NULL,
                due_date DATE NOT NULL,
                paid_at DATETIME,
                UNIQUE (parent_kind, parent_id, seq)
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_installments_parent ON installments(parent_kind, parent_id)",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_installments_due ON installments(club_id, due_date)",
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Create a licence together with its installment plan
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn create_licence(
        &self,
        licence: &Licence,
        installments: &[Installment],
    ) -> Result<Uuid> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r"
            INSERT INTO licences (id, club_id, sportif_id, season, amount_cents, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(licence.id.to_string())
        .bind(licence.club_id.to_string())
        .bind(licence.sportif_id.to_string())
        .bind(&licence.season)
        .bind(licence.amount_cents)
        .bind(licence.created_at)
        .execute(&mut *tx)
        .await?;

        for installment in installments {
            Self::insert_installment(&mut tx, installment).await?;
        }

        tx.commit().await?;
        Ok(licence.id)
    }

    /// Get a licence scoped to a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_licence(&self, club_id: Uuid, licence_id: Uuid) -> Result<Option<Licence>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, sportif_id, season, amount_cents, created_at
            FROM licences WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(licence_id.to_string())
        .bind(club_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_licence(&row)).transpose()
    }

    /// List licences with optional season and athlete filters
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_licences(
        &self,
        club_id: Uuid,
        season: Option<&str>,
        sportif_id: Option<Uuid>,
    ) -> Result<Vec<Licence>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, sportif_id, season, amount_cents, created_at
            FROM licences
            WHERE club_id = $1
              AND ($2 IS NULL OR season = $2)
              AND ($3 IS NULL OR sportif_id = $3)
            ORDER BY created_at DESC
            ",
        )
        .bind(club_id.to_string())
        .bind(season)
        .bind(sportif_id.map(|id| id.to_string()))
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_licence).collect()
    }

    /// Delete a licence and its installment plan
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn delete_licence(&self, club_id: Uuid, licence_id: Uuid) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM installments WHERE parent_kind = 'licence' AND parent_id = $1")
            .bind(licence_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM licences WHERE id = $1 AND club_id = $2")
            .bind(licence_id.to_string())
            .bind(club_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Create a stage
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_stage(&self, stage: &Stage) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO stages (
                id, club_id, title, category_id, start_date, end_date,
                amount_cents, capacity, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(stage.id.to_string())
        .bind(stage.club_id.to_string())
        .bind(&stage.title)
        .bind(stage.category_id.map(|id| id.to_string()))
        .bind(stage.start_date)
        .bind(stage.end_date)
        .bind(stage.amount_cents)
        .bind(stage.capacity.map(i64::from))
        .bind(stage.created_at)
        .execute(self.pool())
        .await?;

        Ok(stage.id)
    }

    /// Get a stage scoped to a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_stage(&self, club_id: Uuid, stage_id: Uuid) -> Result<Option<Stage>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, title, category_id, start_date, end_date,
                   amount_cents, capacity, created_at
            FROM stages WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(stage_id.to_string())
        .bind(club_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_stage(&row)).transpose()
    }

    /// List stages of a club, soonest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_stages(&self, club_id: Uuid) -> Result<Vec<Stage>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, title, category_id, start_date, end_date,
                   amount_cents, capacity, created_at
            FROM stages WHERE club_id = $1 ORDER BY start_date
            ",
        )
        .bind(club_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_stage).collect()
    }

    /// Count enrollments in a stage
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_stage_enrollments(&self, stage_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM stage_enrollments WHERE stage_id = $1")
            .bind(stage_id.to_string())
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Get one athlete's enrollment in a stage, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_stage_enrollment(
        &self,
        stage_id: Uuid,
        sportif_id: Uuid,
    ) -> Result<Option<StageEnrollment>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, stage_id, sportif_id, created_at
            FROM stage_enrollments WHERE stage_id = $1 AND sportif_id = $2
            ",
        )
        .bind(stage_id.to_string())
        .bind(sportif_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_enrollment(&row)).transpose()
    }

    /// List enrollments in a stage
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_stage_enrollments(&self, stage_id: Uuid) -> Result<Vec<StageEnrollment>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, stage_id, sportif_id, created_at
            FROM stage_enrollments WHERE stage_id = $1 ORDER BY created_at
            ",
        )
        .bind(stage_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_enrollment).collect()
    }

    /// Enroll an athlete in a stage together with the installment plan
    ///
    /// # Errors
    ///
    /// Returns an error if the athlete is already enrolled or the
    /// transaction fails
    pub async fn create_stage_enrollment(
        &self,
        enrollment: &StageEnrollment,
        installments: &[Installment],
    ) -> Result<Uuid> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r"
            INSERT INTO stage_enrollments (id, club_id, stage_id, sportif_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(enrollment.id.to_string())
        .bind(enrollment.club_id.to_string())
        .bind(enrollment.stage_id.to_string())
        .bind(enrollment.sportif_id.to_string())
        .bind(enrollment.created_at)
        .execute(&mut *tx)
        .await?;

        for installment in installments {
            Self::insert_installment(&mut tx, installment).await?;
        }

        tx.commit().await?;
        Ok(enrollment.id)
    }

    /// List the installment plan of a licence or enrollment
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_installments(
        &self,
        parent_kind: InstallmentParent,
        parent_id: Uuid,
    ) -> Result<Vec<Installment>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, parent_kind, parent_id, seq, amount_cents, due_date, paid_at
            FROM installments WHERE parent_kind = $1 AND parent_id = $2
            ORDER BY seq
            ",
        )
        .bind(parent_kind.as_str())
        .bind(parent_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_installment).collect()
    }

    /// Count paid installments of a plan
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_paid_installments(
        &self,
        parent_kind: InstallmentParent,
        parent_id: Uuid,
    ) -> Result<i64> {
        let count = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM installments
            WHERE parent_kind = $1 AND parent_id = $2 AND paid_at IS NOT NULL
            ",
        )
        .bind(parent_kind.as_str())
        .bind(parent_id.to_string())
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }

    /// Get one installment scoped to a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_installment(
        &self,
        club_id: Uuid,
        installment_id: Uuid,
    ) -> Result<Option<Installment>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, parent_kind, parent_id, seq, amount_cents, due_date, paid_at
            FROM installments WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(installment_id.to_string())
        .bind(club_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_installment(&row)).transpose()
    }

    /// Mark an installment paid; returns false when it was already paid
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_installment_paid(
        &self,
        installment_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE installments SET paid_at = $2 WHERE id = $1 AND paid_at IS NULL",
        )
        .bind(installment_id.to_string())
        .bind(paid_at)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List unpaid installments due on or before `as_of`, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_outstanding_installments(
        &self,
        club_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Vec<Installment>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, parent_kind, parent_id, seq, amount_cents, due_date, paid_at
            FROM installments
            WHERE club_id = $1 AND paid_at IS NULL AND due_date <= $2
            ORDER BY due_date, seq
            ",
        )
        .bind(club_id.to_string())
        .bind(as_of)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_installment).collect()
    }

    async fn insert_installment(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        installment: &Installment,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO installments (
                id, club_id, parent_kind, parent_id, seq, amount_cents, due_date, paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(installment.id.to_string())
        .bind(installment.club_id.to_string())
        .bind(installment.parent_kind.as_str())
        .bind(installment.parent_id.to_string())
        .bind(i64::from(installment.seq))
        .bind(installment.amount_cents)
        .bind(installment.due_date)
        .bind(installment.paid_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    fn row_to_licence(row: &sqlx::sqlite::SqliteRow) -> Result<Licence> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let sportif_id: String = row.get("sportif_id");

        Ok(Licence {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            sportif_id: Uuid::parse_str(&sportif_id)?,
            season: row.get("season"),
            amount_cents: row.get("amount_cents"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_stage(row: &sqlx::sqlite::SqliteRow) -> Result<Stage> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let category_id: Option<String> = row.get("category_id");
        let capacity: Option<i64> = row.get("capacity");

        Ok(Stage {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            title: row.get("title"),
            category_id: crate::utils::uuid::parse_optional_uuid(category_id.as_deref())?,
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            amount_cents: row.get("amount_cents"),
            capacity: capacity.and_then(|v| u32::try_from(v).ok()),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_enrollment(row: &sqlx::sqlite::SqliteRow) -> Result<StageEnrollment> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let stage_id: String = row.get("stage_id");
        let sportif_id: String = row.get("sportif_id");

        Ok(StageEnrollment {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            stage_id: Uuid::parse_str(&stage_id)?,
            sportif_id: Uuid::parse_str(&sportif_id)?,
            created_at: row.get("created_at"),
        })
    }

    fn row_to_installment(row: &sqlx::sqlite::SqliteRow) -> Result<Installment> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let parent_kind: String = row.get("parent_kind");
        let parent_id: String = row.get("parent_id");
        let seq: i64 = row.get("seq");

        Ok(Installment {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            parent_kind: parent_kind
                .parse::<InstallmentParent>()
                .map_err(|e| anyhow!("{e}"))?,
            parent_id: Uuid::parse_str(&parent_id)?,
            seq: u32::try_from(seq)?,
            amount_cents: row.get("amount_cents"),
            due_date: row.get("due_date"),
            paid_at: row.get("paid_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::sportif::SportifParams;
    use crate::models::{
        generate_installments, Category, Club, InstallmentParent, Licence, Sportif,
    };
    use chrono::{NaiveDate, Utc};

    async fn seed(db: &crate::database::Database) -> (Club, Sportif) {
        let club = Club::new("Test Club".into(), "test-club".into());
        db.create_club(&club).await.unwrap();
        let category = Category::new(club.id, "U14".into(), None, None, None);
        db.create_category(&category).await.unwrap();
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
        (club, sportif)
    }

    #[tokio::test]
    async fn test_licence_with_plan_roundtrip() {
        let db = create_test_db().await.unwrap();
        let (club, sportif) = seed(&db).await;

        let licence = Licence::new(club.id, sportif.id, "2026-2027".into(), 25_000);
        let plan = generate_installments(
            club.id,
            InstallmentParent::Licence,
            licence.id,
            licence.amount_cents,
            3,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        )
        .unwrap();

        db.create_licence(&licence, &plan).await.unwrap();

        let stored = db
            .list_installments(InstallmentParent::Licence, licence.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.iter().map(|i| i.amount_cents).sum::<i64>(), 25_000);
        assert!(stored.iter().all(|i| i.paid_at.is_none()));
    }

    #[tokio::test]
    async fn test_mark_installment_paid_is_single_shot() {
        let db = create_test_db().await.unwrap();
        let (club, sportif) = seed(&db).await;

        let licence = Licence::new(club.id, sportif.id, "2026-2027".into(), 10_000);
        let plan = generate_installments(
            club.id,
            InstallmentParent::Licence,
            licence.id,
            10_000,
            2,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        )
        .unwrap();
        db.create_licence(&licence, &plan).await.unwrap();

        assert!(db.mark_installment_paid(plan[0].id, Utc::now()).await.unwrap());
        // Second attempt reports nothing updated
        assert!(!db.mark_installment_paid(plan[0].id, Utc::now()).await.unwrap());

        assert_eq!(
            db.count_paid_installments(InstallmentParent::Licence, licence.id)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_outstanding_installments_ordering() {
        let db = create_test_db().await.unwrap();
        let (club, sportif) = seed(&db).await;

        let licence = Licence::new(club.id, sportif.id, "2026-2027".into(), 30_000);
        let plan = generate_installments(
            club.id,
            InstallmentParent::Licence,
            licence.id,
            30_000,
            3,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        )
        .unwrap();
        db.create_licence(&licence, &plan).await.unwrap();

        // As of mid-October the first two installments are due
        let outstanding = db
            .list_outstanding_installments(club.id, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap())
            .await
            .unwrap();
        assert_eq!(outstanding.len(), 2);
        assert!(outstanding[0].due_date < outstanding[1].due_date);

        db.mark_installment_paid(plan[0].id, Utc::now()).await.unwrap();
        let outstanding = db
            .list_outstanding_installments(club.id, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap())
            .await
            .unwrap();
        assert_eq!(outstanding.len(), 1);
    }
}
