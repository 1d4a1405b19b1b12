// ABOUTME: User models for the multi-tenant authentication system
// ABOUTME: User accounts and the admin/coach/athlete role hierarchy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// User role for the permission system
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Club administrator: full access to the club's data
    Admin,
    /// Coach: manages trainings, attendance, and evaluations
    Coach,
    /// Athlete: read access to their own data and messaging
    Athlete,
}

impl UserRole {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coach => "coach",
            Self::Athlete => "athlete",
        }
    }

    /// Check whether this role is staff (admin or coach)
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Coach)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "coach" => Ok(Self::Coach),
            "athlete" => Ok(Self::Athlete),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}

/// Represents a login account in the multi-tenant system
///
/// A user belongs to exactly one club; the club id is pinned into every
/// JWT minted for the user, which is how all queries are tenant-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Club this account belongs to
    pub club_id: Uuid,
    /// User email address, globally unique (used for login)
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Hashed password for authentication
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role in the club
    pub role: UserRole,
    /// Whether the account can log in; deactivated accounts keep their history
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last time the user accessed the system
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new user account in the given club
    #[must_use]
    pub fn new(
        club_id: Uuid,
        email: String,
        password_hash: String,
        display_name: Option<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            club_id,
            email,
            display_name,
            password_hash,
            role,
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }

    /// Update last active timestamp
    pub fn update_last_active(&mut self) {
        self.last_active = Utc::now();
    }
}
