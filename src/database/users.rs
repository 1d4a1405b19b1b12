// ABOUTME: User account database operations
// ABOUTME: Handles account creation, lookup, role filtering, and soft deactivation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::{User, UserRole};
use anyhow::{anyhow, Result};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create user tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                email TEXT UNIQUE NOT NULL,
                display_name TEXT,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('admin', 'coach', 'athlete')),
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                last_active DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(self.pool())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_club ON users(club_id)")
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Create a user account
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already in use or the insert fails
    pub async fn create_user(&self, user: &User) -> Result<Uuid> {
        if let Some(existing) = self.get_user_by_email(&user.email).await? {
            if existing.id != user.id {
                return Err(anyhow!("Email already in use by another account"));
            }
        }

        sqlx::query(
            r"
            INSERT INTO users (
                id, club_id, email, display_name, password_hash, role,
                is_active, created_at, last_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.to_string())
        .bind(user.club_id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(self.pool())
        .await?;

        Ok(user.id)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, email, display_name, password_hash, role,
                   is_active, created_at, last_active
            FROM users WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_user(&row)).transpose()
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, email, display_name, password_hash, role,
                   is_active, created_at, last_active
            FROM users WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_user(&row)).transpose()
    }

    /// Get a user by email, returning an error if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the user is not found
    pub async fn get_user_by_email_required(&self, email: &str) -> Result<User> {
        self.get_user_by_email(email)
            .await?
            .ok_or_else(|| anyhow!("User not found with email: {email}"))
    }

    /// List users of a club, optionally filtered by role
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_users(&self, club_id: Uuid, role: Option<UserRole>) -> Result<Vec<User>> {
        let rows = match role {
            Some(role) => {
                sqlx::query(
                    r"
                    SELECT id, club_id, email, display_name, password_hash, role,
                           is_active, created_at, last_active
                    FROM users WHERE club_id = $1 AND role = $2
                    ORDER BY display_name, email
                    ",
                )
                .bind(club_id.to_string())
                .bind(role.as_str())
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, club_id, email, display_name, password_hash, role,
                           is_active, created_at, last_active
                    FROM users WHERE club_id = $1
                    ORDER BY display_name, email
                    ",
                )
                .bind(club_id.to_string())
                .fetch_all(self.pool())
                .await?
            }
        };

        rows.iter().map(Self::row_to_user).collect()
    }

    /// Update a user's profile fields
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_user(
        &self,
        user_id: Uuid,
        display_name: Option<&str>,
        role: UserRole,
        is_active: bool,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE users SET display_name = $2, role = $3, is_active = $4
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .bind(display_name)
        .bind(role.as_str())
        .bind(is_active)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Deactivate a user account (soft delete; history keeps its references)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn deactivate_user(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET is_active = 0 WHERE id = $1")
            .bind(user_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Update user's last active timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_last_active(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_active = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(user_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let role: String = row.get("role");

        Ok(User {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            role: role.parse().map_err(|e| anyhow!("{e}"))?,
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            last_active: row.get("last_active"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::{Club, User, UserRole};

    async fn seeded_club(db: &crate::database::Database) -> Club {
        let club = Club::new("Test Club".into(), "test-club".into());
        db.create_club(&club).await.unwrap();
        club
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let db = create_test_db().await.unwrap();
        let club = seeded_club(&db).await;
        let user = User::new(
            club.id,
            "admin@test-club.example".into(),
            "hash".into(),
            Some("Admin".into()),
            UserRole::Admin,
        );

        db.create_user(&user).await.unwrap();

        let fetched = db.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, user.email);
        assert_eq!(fetched.role, UserRole::Admin);
        assert_eq!(fetched.club_id, club.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = create_test_db().await.unwrap();
        let club = seeded_club(&db).await;
        let first = User::new(
            club.id,
            "dup@test.example".into(),
            "hash".into(),
            None,
            UserRole::Coach,
        );
        let second = User::new(
            club.id,
            "dup@test.example".into(),
            "hash".into(),
            None,
            UserRole::Athlete,
        );

        db.create_user(&first).await.unwrap();
        assert!(db.create_user(&second).await.is_err());
    }

    #[tokio::test]
    async fn test_list_users_role_filter() {
        let db = create_test_db().await.unwrap();
        let club = seeded_club(&db).await;
        for (email, role) in [
            ("a@t.example", UserRole::Admin),
            ("b@t.example", UserRole::Coach),
            ("c@t.example", UserRole::Coach),
            ("d@t.example", UserRole::Athlete),
        ] {
            let user = User::new(club.id, email.into(), "hash".into(), None, role);
            db.create_user(&user).await.unwrap();
        }

        let coaches = db.list_users(club.id, Some(UserRole::Coach)).await.unwrap();
        assert_eq!(coaches.len(), 2);

        let all = db.list_users(club.id, None).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_deactivate_user() {
        let db = create_test_db().await.unwrap();
        let club = seeded_club(&db).await;
        let user = User::new(
            club.id,
            "coach@test.example".into(),
            "hash".into(),
            None,
            UserRole::Coach,
        );
        db.create_user(&user).await.unwrap();

        db.deactivate_user(user.id).await.unwrap();

        let fetched = db.get_user(user.id).await.unwrap().unwrap();
        assert!(!fetched.is_active);
    }
}
