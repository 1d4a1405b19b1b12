// ABOUTME: Integration tests for auth functionality
// ABOUTME: Validates token lifecycle, middleware checks, and tenant pinning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::http::HeaderMap;
use chrono::Utc;
use sportclub_server::middleware::AuthMiddleware;
use sportclub_server::models::UserRole;
use std::sync::Arc;

#[tokio::test]
async fn test_generate_and_validate_token() {
    let db = common::create_test_db().await;
    let (_club, user) =
        common::seed_club_with_user(&db, "auth-club", "admin@auth-club.example", UserRole::Admin)
            .await;

    let auth_manager = common::create_auth_manager();
    let token = auth_manager.generate_token(&user).unwrap();
    assert!(!token.is_empty());

    let claims = auth_manager.validate_token(&token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.email, user.email);
    assert_eq!(claims.club_id, user.club_id.to_string());
    assert!(claims.exp > Utc::now().timestamp());
}

#[tokio::test]
async fn test_middleware_accepts_bearer_token() {
    let db = common::create_test_db().await;
    let (club, user) =
        common::seed_club_with_user(&db, "bearer-club", "coach@bearer.example", UserRole::Coach)
            .await;

    let auth_manager = Arc::new(common::create_auth_manager());
    let token = auth_manager.generate_token(&user).unwrap();
    let middleware = AuthMiddleware::new(auth_manager, Arc::new(db));

    let mut headers = HeaderMap::new();
    headers.insert("authorization", format!("Bearer {token}").parse().unwrap());

    let context = middleware.authenticate_request(&headers).await.unwrap();
    assert_eq!(context.user_id, user.id);
    assert_eq!(context.club_id, club.id);
    assert_eq!(context.role, UserRole::Coach);
    assert!(context.require_staff().is_ok());
    assert!(context.require_admin().is_err());
}

#[tokio::test]
async fn test_middleware_rejects_bad_headers() {
    let db = common::create_test_db().await;
    let auth_manager = Arc::new(common::create_auth_manager());
    let middleware = AuthMiddleware::new(auth_manager, Arc::new(db));

    // Missing header
    let headers = HeaderMap::new();
    assert!(middleware.authenticate_request(&headers).await.is_err());

    // Not a bearer scheme
    let mut headers = HeaderMap::new();
    headers.insert("authorization", "Basic dXNlcjpwdw==".parse().unwrap());
    assert!(middleware.authenticate_request(&headers).await.is_err());

    // Garbage token
    let mut headers = HeaderMap::new();
    headers.insert("authorization", "Bearer not.a.jwt".parse().unwrap());
    assert!(middleware.authenticate_request(&headers).await.is_err());
}

#[tokio::test]
async fn test_middleware_rejects_deactivated_account() {
    let db = common::create_test_db().await;
    let (_club, user) = common::seed_club_with_user(
        &db,
        "inactive-club",
        "coach@inactive.example",
        UserRole::Coach,
    )
    .await;

    let auth_manager = Arc::new(common::create_auth_manager());
    let token = auth_manager.generate_token(&user).unwrap();

    db.deactivate_user(user.id).await.unwrap();
    let middleware = AuthMiddleware::new(auth_manager, Arc::new(db));

    let mut headers = HeaderMap::new();
    headers.insert("authorization", format!("Bearer {token}").parse().unwrap());

    // The token is still cryptographically valid, but the account is gone
    assert!(middleware.authenticate_request(&headers).await.is_err());
}

#[tokio::test]
async fn test_refresh_rechecks_account() {
    let db = common::create_test_db().await;
    let (_club, user) = common::seed_club_with_user(
        &db,
        "refresh-club",
        "admin@refresh.example",
        UserRole::Admin,
    )
    .await;

    let auth_manager = common::create_auth_manager();
    let token = auth_manager.generate_token(&user).unwrap();

    let refreshed = auth_manager.refresh_token(&token, &user).unwrap();
    let claims = auth_manager.validate_token(&refreshed).unwrap();
    assert_eq!(claims.sub, user.id.to_string());

    // A token minted for another user cannot be refreshed against this one
    let (_other_club, other_user) = common::seed_club_with_user(
        &db,
        "other-refresh-club",
        "admin@other-refresh.example",
        UserRole::Admin,
    )
    .await;
    assert!(auth_manager.refresh_token(&token, &other_user).is_err());
}
