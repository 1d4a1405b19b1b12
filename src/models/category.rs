// ABOUTME: Category model for age/skill group organization within a club
// ABOUTME: Categories group sportifs and trainings and carry coach assignments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Age/skill group within a club (e.g. "U14")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique category identifier
    pub id: Uuid,
    /// Club this category belongs to
    pub club_id: Uuid,
    /// Category name, unique within the club
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Minimum athlete age (inclusive), if bounded
    pub min_age: Option<u8>,
    /// Maximum athlete age (inclusive), if bounded
    pub max_age: Option<u8>,
    /// When the category was created
    pub created_at: DateTime<Utc>,
    /// When the category was last updated
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Creates a new category in the given club
    #[must_use]
    pub fn new(
        club_id: Uuid,
        name: String,
        description: Option<String>,
        min_age: Option<u8>,
        max_age: Option<u8>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            club_id,
            name,
            description,
            min_age,
            max_age,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check that the age bounds are coherent
    #[must_use]
    pub fn age_bounds_valid(&self) -> bool {
        match (self.min_age, self.max_age) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }
}
