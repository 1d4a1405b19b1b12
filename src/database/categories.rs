// ABOUTME: Category database operations including coach assignments
// ABOUTME: Handles category CRUD and the category_coaches junction table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::Category;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create category tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_categories(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                min_age INTEGER,
                max_age INTEGER,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (club_id, name)
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS category_coaches (
                category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                coach_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                PRIMARY KEY (category_id, coach_id)
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_categories_club ON categories(club_id)")
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Create a category
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken within the club or the insert fails
    pub async fn create_category(&self, category: &Category) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO categories (id, club_id, name, description, min_age, max_age, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(category.id.to_string())
        .bind(category.club_id.to_string())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.min_age.map(i64::from))
        .bind(category.max_age.map(i64::from))
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(self.pool())
        .await?;

        Ok(category.id)
    }

    /// Get a category scoped to a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_category(&self, club_id: Uuid, category_id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, name, description, min_age, max_age, created_at, updated_at
            FROM categories WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(category_id.to_string())
        .bind(club_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_category(&row)).transpose()
    }

    /// List categories of a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_categories(&self, club_id: Uuid) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, name, description, min_age, max_age, created_at, updated_at
            FROM categories WHERE club_id = $1 ORDER BY name
            ",
        )
        .bind(club_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_category).collect()
    }

    /// Update a category's fields
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r"
            UPDATE categories SET
                name = $3,
                description = $4,
                min_age = $5,
                max_age = $6,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND club_id = $2
            ",
        )
        .bind(category.id.to_string())
        .bind(category.club_id.to_string())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.min_age.map(i64::from))
        .bind(category.max_age.map(i64::from))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Delete a category
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_category(&self, club_id: Uuid, category_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1 AND club_id = $2")
            .bind(category_id.to_string())
            .bind(club_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Count sportifs and trainings still referencing a category
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn category_reference_count(&self, category_id: Uuid) -> Result<i64> {
        let sportifs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sportifs WHERE category_id = $1")
                .bind(category_id.to_string())
                .fetch_one(self.pool())
                .await?;
        let trainings: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM trainings WHERE category_id = $1")
                .bind(category_id.to_string())
                .fetch_one(self.pool())
                .await?;
        Ok(sportifs + trainings)
    }

    /// Replace the set of coaches assigned to a category
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn set_category_coaches(&self, category_id: Uuid, coach_ids: &[Uuid]) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM category_coaches WHERE category_id = $1")
            .bind(category_id.to_string())
            .execute(&mut *tx)
            .await?;

        for coach_id in coach_ids {
            sqlx::query("INSERT INTO category_coaches (category_id, coach_id) VALUES ($1, $2)")
                .bind(category_id.to_string())
                .bind(coach_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// List coach ids assigned to a category
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_category_coaches(&self, category_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query(
            "SELECT coach_id FROM category_coaches WHERE category_id = $1 ORDER BY coach_id",
        )
        .bind(category_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("coach_id");
                Ok(Uuid::parse_str(&id)?)
            })
            .collect()
    }

    fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let min_age: Option<i64> = row.get("min_age");
        let max_age: Option<i64> = row.get("max_age");

        Ok(Category {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            name: row.get("name"),
            description: row.get("description"),
            min_age: min_age.and_then(|v| u8::try_from(v).ok()),
            max_age: max_age.and_then(|v| u8::try_from(v).ok()),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::{Category, Club, User, UserRole};

    #[tokio::test]
    async fn test_category_crud_and_coaches() {
        let db = create_test_db().await.unwrap();
        let club = Club::new("Test Club".into(), "test-club".into());
        db.create_club(&club).await.unwrap();

        let category = Category::new(club.id, "U14".into(), None, Some(12), Some(14));
        db.create_category(&category).await.unwrap();

        // Name is unique within a club
        let duplicate = Category::new(club.id, "U14".into(), None, None, None);
        assert!(db.create_category(&duplicate).await.is_err());

        let coach = User::new(
            club.id,
            "coach@test.example".into(),
            "hash".into(),
            None,
            UserRole::Coach,
        );
        db.create_user(&coach).await.unwrap();

        db.set_category_coaches(category.id, &[coach.id]).await.unwrap();
        assert_eq!(db.list_category_coaches(category.id).await.unwrap(), vec![coach.id]);

        // Replacing with an empty set clears the assignment
        db.set_category_coaches(category.id, &[]).await.unwrap();
        assert!(db.list_category_coaches(category.id).await.unwrap().is_empty());

        db.delete_category(club.id, category.id).await.unwrap();
        assert!(db.get_category(club.id, category.id).await.unwrap().is_none());
    }
}
