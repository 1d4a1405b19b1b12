// ABOUTME: End-to-end tests driving the assembled axum router
// ABOUTME: Covers registration, login, tenant-scoped CRUD, and role enforcement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sportclub_server::server::ClubServer;
use tower::ServiceExt;

async fn build_router() -> Router {
    let resources = common::create_test_resources().await;
    ClubServer::new(resources).router()
}

/// Fire one request and return (status, parsed JSON body)
async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register a club and log its admin in, returning the bearer token
async fn register_and_login(router: &Router, club: &str, email: &str) -> String {
    let (status, _) = send(
        router,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "club_name": club,
            "email": email,
            "password": "test-password-123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "test-password-123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["jwt_token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_health_endpoint_is_public() {
    let router = build_router().await;
    let (status, body) = send(&router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    let router = build_router().await;
    let (status, _) = send(&router, "GET", "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let router = build_router().await;
    let token = register_and_login(&router, "AS Montpellier", "admin@asm.example").await;

    let (status, body) = send(&router, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "admin@asm.example");
    assert_eq!(body["role"], "admin");

    // Duplicate club name produces a conflict
    let (status, _) = send(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "club_name": "AS Montpellier",
            "email": "second@asm.example",
            "password": "test-password-123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_category_sportif_and_training_flow() {
    let router = build_router().await;
    let token = register_and_login(&router, "FC Lattes", "admin@lattes.example").await;

    let (status, category) = send(
        &router,
        "POST",
        "/api/categories",
        Some(&token),
        Some(serde_json::json!({
            "name": "U14",
            "min_age": 12,
            "max_age": 14,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_owned();

    let (status, sportif) = send(
        &router,
        "POST",
        "/api/sportifs",
        Some(&token),
        Some(serde_json::json!({
            "category_id": category_id,
            "first_name": "Lina",
            "last_name": "Moreau",
            "birth_date": "2012-04-02",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let sportif_id = sportif["id"].as_str().unwrap().to_owned();

    // Weekly Wednesday session through mid-December
    let (status, training) = send(
        &router,
        "POST",
        "/api/trainings",
        Some(&token),
        Some(serde_json::json!({
            "category_id": category_id,
            "kind": "session",
            "title": "U14 technique",
            "start_date": "2026-09-02",
            "start_time": "18:30:00",
            "duration_minutes": 90,
            "weekly_until": "2026-12-16",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let training_id = training["id"].as_str().unwrap().to_owned();

    let (status, occurrences) = send(
        &router,
        "GET",
        &format!("/api/trainings/{training_id}/occurrences?from=2026-09-01&to=2026-09-30"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(occurrences.as_array().unwrap().len(), 5); // five Wednesdays in Sep 2026

    // A weekly rule on a match is rejected
    let (status, _) = send(
        &router,
        "POST",
        "/api/trainings",
        Some(&token),
        Some(serde_json::json!({
            "category_id": category_id,
            "kind": "match",
            "title": "Derby",
            "start_date": "2026-10-03",
            "start_time": "15:00:00",
            "duration_minutes": 80,
            "weekly_until": "2026-12-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Record a sheet on a real occurrence
    let (status, recorded) = send(
        &router,
        "PUT",
        &format!("/api/trainings/{training_id}/attendance"),
        Some(&token),
        Some(serde_json::json!({
            "date": "2026-09-09",
            "entries": [{ "sportif_id": sportif_id, "status": "late" }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recorded["recorded"], 1);

    // A date that is not an occurrence is rejected
    let (status, _) = send(
        &router,
        "PUT",
        &format!("/api/trainings/{training_id}/attendance"),
        Some(&token),
        Some(serde_json::json!({
            "date": "2026-09-10",
            "entries": [{ "sportif_id": sportif_id, "status": "present" }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, summary) = send(
        &router,
        "GET",
        &format!("/api/sportifs/{sportif_id}/attendance?from=2026-09-01&to=2026-09-30"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total"], 1);
    assert_eq!(summary["late"], 1);

    // Calendar merges expanded occurrences
    let (status, calendar) = send(
        &router,
        "GET",
        "/api/trainings/calendar?from=2026-09-01&to=2026-09-30",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calendar.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_licence_payment_flow_over_http() {
    let router = build_router().await;
    let token = register_and_login(&router, "Judo Club", "admin@judo.example").await;

    let (_, category) = send(
        &router,
        "POST",
        "/api/categories",
        Some(&token),
        Some(serde_json::json!({ "name": "Seniors" })),
    )
    .await;
    let (_, sportif) = send(
        &router,
        "POST",
        "/api/sportifs",
        Some(&token),
        Some(serde_json::json!({
            "category_id": category["id"],
            "first_name": "Hugo",
            "last_name": "Petit",
            "birth_date": "2001-11-20",
        })),
    )
    .await;

    let (status, licence) = send(
        &router,
        "POST",
        "/api/licences",
        Some(&token),
        Some(serde_json::json!({
            "sportif_id": sportif["id"],
            "season": "2026-2027",
            "amount_cents": 25000,
            "installment_count": 3,
            "first_due_date": "2026-09-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let installments = licence["installments"].as_array().unwrap();
    assert_eq!(installments.len(), 3);
    assert_eq!(installments[0]["amount_cents"], 8334);

    let first_id = installments[0]["id"].as_str().unwrap();
    let (status, paid) = send(
        &router,
        "POST",
        &format!("/api/installments/{first_id}/pay"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(paid["paid_at"].is_string());

    // Paying twice conflicts
    let (status, _) = send(
        &router,
        "POST",
        &format!("/api/installments/{first_id}/pay"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Deleting a licence with payments recorded is refused
    let licence_id = licence["id"].as_str().unwrap();
    let (status, _) = send(
        &router,
        "DELETE",
        &format!("/api/licences/{licence_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_tenant_isolation_between_clubs() {
    let router = build_router().await;
    let token_a = register_and_login(&router, "Club Alpha", "admin@alpha.example").await;
    let token_b = register_and_login(&router, "Club Beta", "admin@beta.example").await;

    let (_, category) = send(
        &router,
        "POST",
        "/api/categories",
        Some(&token_a),
        Some(serde_json::json!({ "name": "U16" })),
    )
    .await;
    let category_id = category["id"].as_str().unwrap();

    // Club B sees none of club A's categories
    let (status, listing) = send(&router, "GET", "/api/categories", Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listing.as_array().unwrap().is_empty());

    // Direct access by id from the other tenant reads as not-found
    let (status, _) = send(
        &router,
        "GET",
        &format!("/api/categories/{category_id}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_athlete_role_is_read_only_for_admin_surfaces() {
    let router = build_router().await;
    let token = register_and_login(&router, "Role Club", "admin@roleclub.example").await;

    // Admin creates an athlete account
    let (status, _) = send(
        &router,
        "POST",
        "/api/users",
        Some(&token),
        Some(serde_json::json!({
            "email": "athlete@roleclub.example",
            "password": "test-password-123",
            "role": "athlete",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = send(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "athlete@roleclub.example",
            "password": "test-password-123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let athlete_token = login["jwt_token"].as_str().unwrap();

    // Athletes cannot create categories
    let (status, _) = send(
        &router,
        "POST",
        "/api/categories",
        Some(athlete_token),
        Some(serde_json::json!({ "name": "U18" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // But they can read the club profile
    let (status, club) = send(&router, "GET", "/api/club", Some(athlete_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(club["name"], "Role Club");
}

#[tokio::test]
async fn test_messaging_flow() {
    let router = build_router().await;
    let token = register_and_login(&router, "Mail Club", "admin@mailclub.example").await;

    send(
        &router,
        "POST",
        "/api/users",
        Some(&token),
        Some(serde_json::json!({
            "email": "coach@mailclub.example",
            "password": "test-password-123",
            "role": "coach",
        })),
    )
    .await;
    let (_, login) = send(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "coach@mailclub.example",
            "password": "test-password-123",
        })),
    )
    .await;
    let coach_token = login["jwt_token"].as_str().unwrap().to_owned();
    let coach_id = login["user"]["user_id"].as_str().unwrap().to_owned();

    let (status, message) = send(
        &router,
        "POST",
        "/api/messages",
        Some(&token),
        Some(serde_json::json!({
            "recipient_id": coach_id,
            "subject": "Planning",
            "body": "Can you cover the U14 session on Wednesday?",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let message_id = message["id"].as_str().unwrap();

    let (status, inbox) = send(
        &router,
        "GET",
        "/api/messages/inbox?unread_only=true",
        Some(&coach_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox.as_array().unwrap().len(), 1);

    // Reading as the recipient marks it read
    let (status, read) = send(
        &router,
        "GET",
        &format!("/api/messages/{message_id}"),
        Some(&coach_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(read["read_at"].is_string());

    let (_, unread) = send(
        &router,
        "GET",
        "/api/messages/inbox?unread_only=true",
        Some(&coach_token),
        None,
    )
    .await;
    assert!(unread.as_array().unwrap().is_empty());

    // Only the recipient can delete
    let (status, _) = send(
        &router,
        "DELETE",
        &format!("/api/messages/{message_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &router,
        "DELETE",
        &format!("/api/messages/{message_id}"),
        Some(&coach_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
