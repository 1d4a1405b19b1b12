// ABOUTME: Database management for the multi-tenant SportClub server
// ABOUTME: Owns the SQLite pool and fans out per-domain schema migrations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! # Database Management
//!
//! This module provides database functionality for the multi-tenant
//! SportClub server. Each domain keeps its operations in its own file as an
//! `impl Database` block; the schema is created here at startup with
//! idempotent migrations.

mod attendance;
mod categories;
mod clubs;
mod evaluations;
mod messages;
mod payments;
mod sportifs;
mod trainings;
mod users;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Database manager for club, member, and scheduling storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let is_memory = database_url.contains(":memory:");

        // Foreign keys are off by default in SQLite and the setting is
        // per-connection, so it must live in the connect options
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database exists per connection; a single-connection
        // pool keeps the schema visible to every query
        let max_connections = if is_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_clubs().await?;
        self.migrate_users().await?;
        self.migrate_categories().await?;
        self.migrate_sportifs().await?;
        self.migrate_trainings().await?;
        self.migrate_attendance().await?;
        self.migrate_evaluations().await?;
        self.migrate_payments().await?;
        self.migrate_messages().await?;

        Ok(())
    }

    /// Check database connectivity for health reporting
    ///
    /// # Errors
    ///
    /// Returns an error if the probe query fails
    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;
    use anyhow::Result;

    /// In-memory database for unit tests; each connection is isolated
    pub(crate) async fn create_test_db() -> Result<Database> {
        Database::new("sqlite::memory:").await
    }
}
