// ABOUTME: Sportif (athlete profile) database operations
// ABOUTME: Handles profile CRUD with category and name search filters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::Sportif;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create sportif tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_sportifs(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sportifs (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                category_id TEXT NOT NULL REFERENCES categories(id),
                user_id TEXT UNIQUE REFERENCES users(id),
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                birth_date DATE NOT NULL,
                licence_number TEXT,
                emergency_contact TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sportifs_club ON sportifs(club_id)")
            .execute(self.pool())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sportifs_category ON sportifs(category_id)")
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Create a sportif profile
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_sportif(&self, sportif: &Sportif) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO sportifs (
                id, club_id, category_id, user_id, first_name, last_name,
                birth_date, licence_number, emergency_contact, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(sportif.id.to_string())
        .bind(sportif.club_id.to_string())
        .bind(sportif.category_id.to_string())
        .bind(sportif.user_id.map(|id| id.to_string()))
        .bind(&sportif.first_name)
        .bind(&sportif.last_name)
        .bind(sportif.birth_date)
        .bind(&sportif.licence_number)
        .bind(&sportif.emergency_contact)
        .bind(sportif.created_at)
        .bind(sportif.updated_at)
        .execute(self.pool())
        .await?;

        Ok(sportif.id)
    }

    /// Get a sportif scoped to a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_sportif(&self, club_id: Uuid, sportif_id: Uuid) -> Result<Option<Sportif>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, category_id, user_id, first_name, last_name,
                   birth_date, licence_number, emergency_contact, created_at, updated_at
            FROM sportifs WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(sportif_id.to_string())
        .bind(club_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_sportif(&row)).transpose()
    }

    /// List sportifs of a club with optional category and name filters
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_sportifs(
        &self,
        club_id: Uuid,
        category_id: Option<Uuid>,
        search: Option<&str>,
    ) -> Result<Vec<Sportif>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, category_id, user_id, first_name, last_name,
                   birth_date, licence_number, emergency_contact, created_at, updated_at
            FROM sportifs
            WHERE club_id = $1
              AND ($2 IS NULL OR category_id = $2)
              AND ($3 IS NULL OR first_name LIKE $3 OR last_name LIKE $3)
            ORDER BY last_name, first_name
            ",
        )
        .bind(club_id.to_string())
        .bind(category_id.map(|id| id.to_string()))
        .bind(search.map(|term| format!("%{term}%")))
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_sportif).collect()
    }

    /// Update a sportif profile
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_sportif(&self, sportif: &Sportif) -> Result<()> {
        sqlx::query(
            r"
            UPDATE sportifs SET
                category_id = $3,
                user_id = $4,
                first_name = $5,
                last_name = $6,
                birth_date = $7,
                licence_number = $8,
                emergency_contact = $9,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(sportif.id.to_string())
        .bind(sportif.club_id.to_string())
        .bind(sportif.category_id.to_string())
        .bind(sportif.user_id.map(|id| id.to_string()))
        .bind(&sportif.first_name)
        .bind(&sportif.last_name)
        .bind(sportif.birth_date)
        .bind(&sportif.licence_number)
        .bind(&sportif.emergency_contact)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Delete a sportif profile and its dependent records
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_sportif(&self, club_id: Uuid, sportif_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM sportifs WHERE id = $1 AND club_id = $2")
            .bind(sportif_id.to_string())
            .bind(club_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    fn row_to_sportif(row: &sqlx::sqlite::SqliteRow) -> Result<Sportif> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let category_id: String = row.get("category_id");
        let user_id: Option<String> = row.get("user_id");

        Ok(Sportif {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            category_id: Uuid::parse_str(&category_id)?,
            user_id: crate::utils::uuid::parse_optional_uuid(user_id.as_deref())?,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            birth_date: row.get("birth_date"),
            licence_number: row.get("licence_number"),
            emergency_contact: row.get("emergency_contact"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::sportif::SportifParams;
    use crate::models::{Category, Club, Sportif};
    use chrono::NaiveDate;

    async fn seed(db: &crate::database::Database) -> (Club, Category) {
        let club = Club::new("Test Club".into(), "test-club".into());
        db.create_club(&club).await.unwrap();
        let category = Category::new(club.id, "U14".into(), None, None, None);
        db.create_category(&category).await.unwrap();
        (club, category)
    }

    fn sportif(club: &Club, category: &Category, first: &str, last: &str) -> Sportif {
        Sportif::new(SportifParams {
            club_id: club.id,
            category_id: category.id,
            user_id: None,
            first_name: first.into(),
            last_name: last.into(),
            birth_date: NaiveDate::from_ymd_opt(2012, 4, 2).unwrap(),
            licence_number: None,
            emergency_contact: None,
        })
    }

    #[tokio::test]
    async fn test_sportif_crud() {
        let db = create_test_db().await.unwrap();
        let (club, category) = seed(&db).await;

        let mut s = sportif(&club, &category, "Lina", "Moreau");
        db.create_sportif(&s).await.unwrap();

        s.licence_number = Some("FR-12345".into());
        db.update_sportif(&s).await.unwrap();

        let fetched = db.get_sportif(club.id, s.id).await.unwrap().unwrap();
        assert_eq!(fetched.licence_number.as_deref(), Some("FR-12345"));

        db.delete_sportif(club.id, s.id).await.unwrap();
        assert!(db.get_sportif(club.id, s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sportifs_filters() {
        let db = create_test_db().await.unwrap();
        let (club, category) = seed(&db).await;
        let other = Category::new(club.id, "U16".into(), None, None, None);
        db.create_category(&other).await.unwrap();

        for (first, last, cat) in [
            ("Lina", "Moreau", &category),
            ("Hugo", "Moreau", &category),
            ("Emma", "Petit", &other),
        ] {
            let s = sportif(&club, cat, first, last);
            db.create_sportif(&s).await.unwrap();
        }

        let in_category = db
            .list_sportifs(club.id, Some(category.id), None)
            .await
            .unwrap();
        assert_eq!(in_category.len(), 2);

        let by_name = db
            .list_sportifs(club.id, None, Some("Moreau"))
            .await
            .unwrap();
        assert_eq!(by_name.len(), 2);

        let narrowed = db
            .list_sportifs(club.id, Some(other.id), Some("Petit"))
            .await
            .unwrap();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].first_name, "Emma");
    }
}
