// ABOUTME: Shared helpers for integration tests
// ABOUTME: Builds in-memory databases, seeded clubs, and server resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

#![allow(dead_code, clippy::unwrap_used)]

use sportclub_server::auth::AuthManager;
use sportclub_server::config::environment::{
    AuthConfig, CorsConfig, DatabaseConfig, DatabaseUrl, Environment, ServerConfig,
};
use sportclub_server::database::Database;
use sportclub_server::models::{Club, User, UserRole};
use sportclub_server::server::ServerResources;
use std::sync::Arc;

/// Test JWT secret; stable across a test run
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Create an isolated in-memory database with the full schema
pub async fn create_test_db() -> Database {
    Database::new("sqlite::memory:").await.unwrap()
}

/// Create an auth manager with the test secret and 24h expiry
pub fn create_auth_manager() -> AuthManager {
    AuthManager::new(TEST_JWT_SECRET.as_bytes(), 24)
}

/// Test server configuration (never read from the environment)
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        environment: Environment::Testing,
        database: DatabaseConfig {
            url: DatabaseUrl::Memory,
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.into(),
            jwt_expiry_hours: 24,
        },
        cors: CorsConfig {
            allowed_origins: vec![],
        },
    }
}

/// Build server resources around a fresh in-memory database
pub async fn create_test_resources() -> Arc<ServerResources> {
    let database = create_test_db().await;
    Arc::new(ServerResources::new(
        database,
        create_auth_manager(),
        Arc::new(test_config()),
    ))
}

/// Seed a club with one active user of the given role and return both
pub async fn seed_club_with_user(
    db: &Database,
    slug: &str,
    email: &str,
    role: UserRole,
) -> (Club, User) {
    let club = Club::new(format!("Club {slug}"), slug.to_owned());
    db.create_club(&club).await.unwrap();

    let password_hash = bcrypt::hash("test-password-123", 4).unwrap();
    let user = User::new(
        club.id,
        email.to_owned(),
        password_hash,
        Some("Test User".into()),
        role,
    );
    db.create_user(&user).await.unwrap();

    (club, user)
}
