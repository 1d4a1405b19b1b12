// ABOUTME: Integration tests for training scheduling and attendance
// ABOUTME: Covers recurrence roundtrips, occurrence windows, and sheet summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{NaiveDate, NaiveTime, Utc};
use sportclub_server::database::Database;
use sportclub_server::models::sportif::SportifParams;
use sportclub_server::models::training::TrainingParams;
use sportclub_server::models::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, Category, Recurrence, Sportif,
    Training, TrainingKind, UserRole,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_training(db: &Database) -> (Training, Sportif, Uuid) {
    let (club, coach) =
        common::seed_club_with_user(db, "sched-club", "coach@sched.example", UserRole::Coach).await;

    let category = Category::new(club.id, "U14".into(), None, Some(12), Some(14));
    db.create_category(&category).await.unwrap();

    // Wednesdays from Sep 2 through Dec 16
    let training = Training::new(TrainingParams {
        club_id: club.id,
        category_id: category.id,
        kind: TrainingKind::Session,
        title: "U14 technique".into(),
        location: Some("Gymnase Jean Moulin".into()),
        start_date: date(2026, 9, 2),
        start_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        duration_minutes: 90,
        recurrence: Recurrence::Weekly {
            until: date(2026, 12, 16),
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
        birth_date: date(2012, 4, 2),
        licence_number: Some("FR-12345".into()),
        emergency_contact: None,
    });
    db.create_sportif(&sportif).await.unwrap();

    (training, sportif, coach.id)
}

#[tokio::test]
async fn test_stored_training_expands_into_occurrences() {
    let db = common::create_test_db().await;
    let (training, _sportif, _coach) = seed_training(&db).await;

    let stored = db
        .get_training(training.club_id, training.id)
        .await
        .unwrap()
        .unwrap();

    // October 2026 has four Wednesdays from the 7th
    let occurrences = stored.occurrences_between(date(2026, 10, 1), date(2026, 10, 31));
    let dates: Vec<NaiveDate> = occurrences.iter().map(|o| o.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2026, 10, 7),
            date(2026, 10, 14),
            date(2026, 10, 21),
            date(2026, 10, 28)
        ]
    );

    // Nothing past the recurrence end
    assert!(stored
        .occurrences_between(date(2027, 1, 1), date(2027, 1, 31))
        .is_empty());
}

#[tokio::test]
async fn test_attendance_sheet_and_summary() {
    let db = common::create_test_db().await;
    let (training, sportif, coach_id) = seed_training(&db).await;

    let statuses = [
        (date(2026, 9, 2), AttendanceStatus::Present),
        (date(2026, 9, 9), AttendanceStatus::Late),
        (date(2026, 9, 16), AttendanceStatus::Excused),
        (date(2026, 9, 23), AttendanceStatus::Absent),
    ];
    for (day, status) in statuses {
        assert!(training.occurs_on(day));
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            club_id: training.club_id,
            training_id: training.id,
            sportif_id: sportif.id,
            date: day,
            status,
            recorded_by: coach_id,
            recorded_at: Utc::now(),
        };
        db.upsert_attendance(&record).await.unwrap();
    }

    let records = db
        .list_sportif_attendance(sportif.id, date(2026, 9, 1), date(2026, 9, 30))
        .await
        .unwrap();
    let summary = AttendanceSummary::from_statuses(
        sportif.id,
        &records.iter().map(|r| r.status).collect::<Vec<_>>(),
    );

    assert_eq!(summary.total, 4);
    assert_eq!(summary.present, 1);
    assert_eq!(summary.late, 1);
    // Present and late both count as attended
    assert!((summary.attendance_rate - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_deleting_training_drops_attendance() {
    let db = common::create_test_db().await;
    let (training, sportif, coach_id) = seed_training(&db).await;

    let record = AttendanceRecord {
        id: Uuid::new_v4(),
        club_id: training.club_id,
        training_id: training.id,
        sportif_id: sportif.id,
        date: date(2026, 9, 2),
        status: AttendanceStatus::Present,
        recorded_by: coach_id,
        recorded_at: Utc::now(),
    };
    db.upsert_attendance(&record).await.unwrap();

    db.delete_training(training.club_id, training.id)
        .await
        .unwrap();

    let remaining = db
        .list_sportif_attendance(sportif.id, date(2026, 9, 1), date(2026, 12, 31))
        .await
        .unwrap();
    assert!(remaining.is_empty());
}
