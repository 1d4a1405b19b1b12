// ABOUTME: Club tenant model for multi-tenant data isolation
// ABOUTME: Every other aggregate in the system is scoped by a club id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Club tenant in the multi-tenant setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    /// Unique club identifier
    pub id: Uuid,
    /// Club display name
    pub name: String,
    /// URL-safe slug for the club, unique across tenants
    pub slug: String,
    /// When the club was created
    pub created_at: DateTime<Utc>,
    /// When the club was last updated
    pub updated_at: DateTime<Utc>,
}

impl Club {
    /// Creates a new club with the given name and slug
    #[must_use]
    pub fn new(name: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive a URL-safe slug from a club name
    ///
    /// Lowercases, maps runs of non-alphanumeric characters to single
    /// hyphens, and trims leading/trailing hyphens.
    #[must_use]
    pub fn slugify(name: &str) -> String {
        let mut slug = String::with_capacity(name.len());
        let mut last_was_hyphen = true;
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
                last_was_hyphen = false;
            } else if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(Club::slugify("AS Montpellier Judo"), "as-montpellier-judo");
        assert_eq!(Club::slugify("  Étoile FC  "), "toile-fc");
        assert_eq!(Club::slugify("U14 -- Élite!"), "u14-lite");
    }
}
