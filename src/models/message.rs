// ABOUTME: Internal message model for member-to-member mail inside a club
// ABOUTME: Tracks sender, recipient, and read state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One internal message between two members of the same club
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier
    pub id: Uuid,
    /// Club both parties belong to
    pub club_id: Uuid,
    /// Sending user
    pub sender_id: Uuid,
    /// Receiving user
    pub recipient_id: Uuid,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
    /// When the message was sent
    pub sent_at: DateTime<Utc>,
    /// When the recipient first read it, if they have
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a new unread message
    #[must_use]
    pub fn new(
        club_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        subject: String,
        body: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            club_id,
            sender_id,
            recipient_id,
            subject,
            body,
            sent_at: Utc::now(),
            read_at: None,
        }
    }

    /// Whether the recipient has read the message
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
