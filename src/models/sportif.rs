// ABOUTME: Sportif (athlete profile) model, optionally linked to a login account
// ABOUTME: Carries identity, category membership, and licence/contact details
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Athlete profile within a club
///
/// A sportif is a managed profile, not a login: young athletes commonly have
/// no account of their own. When the athlete does log in, `user_id` links the
/// profile to their `athlete` account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sportif {
    /// Unique sportif identifier
    pub id: Uuid,
    /// Club this profile belongs to
    pub club_id: Uuid,
    /// Category the athlete trains in
    pub category_id: Uuid,
    /// Linked login account, if any
    pub user_id: Option<Uuid>,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Federation licence number, if issued
    pub licence_number: Option<String>,
    /// Emergency contact (free-form phone/name)
    pub emergency_contact: Option<String>,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a sportif profile
pub struct SportifParams {
    /// Club the profile belongs to
    pub club_id: Uuid,
    /// Category the athlete trains in
    pub category_id: Uuid,
    /// Linked login account, if any
    pub user_id: Option<Uuid>,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Federation licence number, if issued
    pub licence_number: Option<String>,
    /// Emergency contact
    pub emergency_contact: Option<String>,
}

impl Sportif {
    /// Create a new sportif profile from parameters
    #[must_use]
    pub fn new(params: SportifParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            club_id: params.club_id,
            category_id: params.category_id,
            user_id: params.user_id,
            first_name: params.first_name,
            last_name: params.last_name,
            birth_date: params.birth_date,
            licence_number: params.licence_number,
            emergency_contact: params.emergency_contact,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full display name
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years on the given date
    #[must_use]
    pub fn age_on(&self, date: NaiveDate) -> i32 {
        let mut age = date.year() - self.birth_date.year();
        if (date.month(), date.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(birth: NaiveDate) -> Sportif {
        Sportif::new(SportifParams {
            club_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            user_id: None,
            first_name: "Lina".into(),
            last_name: "Moreau".into(),
            birth_date: birth,
            licence_number: None,
            emergency_contact: None,
        })
    }

    #[test]
    fn test_age_on() {
        let s = sample(NaiveDate::from_ymd_opt(2012, 6, 15).unwrap());
        // Day before the birthday
        assert_eq!(s.age_on(NaiveDate::from_ymd_opt(2026, 6, 14).unwrap()), 13);
        // On the birthday
        assert_eq!(s.age_on(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()), 14);
    }

    #[test]
    fn test_full_name() {
        let s = sample(NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert_eq!(s.full_name(), "Lina Moreau");
    }
}
