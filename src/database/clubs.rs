// ABOUTME: Club tenant database operations
// ABOUTME: Handles club creation, lookup by slug, renames, and member counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::Club;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create club tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_clubs(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS clubs (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT UNIQUE NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_clubs_slug ON clubs(slug)")
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Create a new club
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is already taken or the insert fails
    pub async fn create_club(&self, club: &Club) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO clubs (id, name, slug, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(club.id.to_string())
        .bind(&club.name)
        .bind(&club.slug)
        .bind(club.created_at)
        .bind(club.updated_at)
        .execute(self.pool())
        .await?;

        Ok(club.id)
    }

    /// Get a club by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_club(&self, club_id: Uuid) -> Result<Option<Club>> {
        let row = sqlx::query(
            "SELECT id, name, slug, created_at, updated_at FROM clubs WHERE id = $1",
        )
        .bind(club_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_club(&row)).transpose()
    }

    /// Get a club by slug
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_club_by_slug(&self, slug: &str) -> Result<Option<Club>> {
        let row = sqlx::query(
            "SELECT id, name, slug, created_at, updated_at FROM clubs WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_club(&row)).transpose()
    }

    /// Rename a club (the slug is immutable)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_club_name(&self, club_id: Uuid, name: &str) -> Result<()> {
        sqlx::query("UPDATE clubs SET name = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(club_id.to_string())
            .bind(name)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Count active user accounts in a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_club_members(&self, club_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE club_id = $1 AND is_active = 1",
        )
        .bind(club_id.to_string())
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }

    /// Count athlete profiles in a club
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_club_sportifs(&self, club_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM sportifs WHERE club_id = $1")
            .bind(club_id.to_string())
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    fn row_to_club(row: &sqlx::sqlite::SqliteRow) -> Result<Club> {
        let id: String = row.get("id");
        Ok(Club {
            id: Uuid::parse_str(&id)?,
            name: row.get("name"),
            slug: row.get("slug"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::Club;

    #[tokio::test]
    async fn test_create_and_fetch_club() {
        let db = create_test_db().await.unwrap();
        let club = Club::new("AS Montpellier Judo".into(), "as-montpellier-judo".into());

        db.create_club(&club).await.unwrap();

        let fetched = db.get_club(club.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "AS Montpellier Judo");

        let by_slug = db
            .get_club_by_slug("as-montpellier-judo")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_slug.id, club.id);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let db = create_test_db().await.unwrap();
        let first = Club::new("Club A".into(), "club".into());
        let second = Club::new("Club B".into(), "club".into());

        db.create_club(&first).await.unwrap();
        assert!(db.create_club(&second).await.is_err());
    }

    #[tokio::test]
    async fn test_rename_club() {
        let db = create_test_db().await.unwrap();
        let club = Club::new("Old Name".into(), "old-name".into());
        db.create_club(&club).await.unwrap();

        db.update_club_name(club.id, "New Name").await.unwrap();

        let fetched = db.get_club(club.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "New Name");
        assert_eq!(fetched.slug, "old-name");
    }
}
