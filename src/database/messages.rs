// ABOUTME: Internal messaging database operations
// ABOUTME: Handles sending, inbox/sent listings, read tracking, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

use super::Database;
use crate::models::Message;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create message tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_messages(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                club_id TEXT NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
                sender_id TEXT NOT NULL REFERENCES users(id),
                recipient_id TEXT NOT NULL REFERENCES users(id),
                subject TEXT NOT NULL,
                body TEXT NOT NULL,
                sent_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                read_at DATETIME
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages(recipient_id, sent_at)",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender_id, sent_at)",
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Store a new message
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_message(&self, message: &Message) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO messages (
                id, club_id, sender_id, recipient_id, subject, body, sent_at, read_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(message.id.to_string())
        .bind(message.club_id.to_string())
        .bind(message.sender_id.to_string())
        .bind(message.recipient_id.to_string())
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.sent_at)
        .bind(message.read_at)
        .execute(self.pool())
        .await?;

        Ok(message.id)
    }

    /// Get one message by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_message(&self, message_id: Uuid) -> Result<Option<Message>> {
        let row = sqlx::query(
            r"
            SELECT id, club_id, sender_id, recipient_id, subject, body, sent_at, read_at
            FROM messages WHERE id = $1
            ",
        )
        .bind(message_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::row_to_message(&row)).transpose()
    }

    /// List a user's received messages, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_inbox(&self, recipient_id: Uuid, unread_only: bool) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, sender_id, recipient_id, subject, body, sent_at, read_at
            FROM messages
            WHERE recipient_id = $1 AND ($2 = 0 OR read_at IS NULL)
            ORDER BY sent_at DESC
            ",
        )
        .bind(recipient_id.to_string())
        .bind(unread_only)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_message).collect()
    }

    /// List a user's sent messages, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_sent(&self, sender_id: Uuid) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            r"
            SELECT id, club_id, sender_id, recipient_id, subject, body, sent_at, read_at
            FROM messages WHERE sender_id = $1 ORDER BY sent_at DESC
            ",
        )
        .bind(sender_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::row_to_message).collect()
    }

    /// Set the read timestamp if not already set
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_message_read(
        &self,
        message_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE messages SET read_at = $2 WHERE id = $1 AND read_at IS NULL")
            .bind(message_id.to_string())
            .bind(read_at)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Delete a message
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_message(&self, message_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(message_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message> {
        let id: String = row.get("id");
        let club_id: String = row.get("club_id");
        let sender_id: String = row.get("sender_id");
        let recipient_id: String = row.get("recipient_id");

        Ok(Message {
            id: Uuid::parse_str(&id)?,
            club_id: Uuid::parse_str(&club_id)?,
            sender_id: Uuid::parse_str(&sender_id)?,
            recipient_id: Uuid::parse_str(&recipient_id)?,
            subject: row.get("subject"),
            body: row.get("body"),
            sent_at: row.get("sent_at"),
            read_at: row.get("read_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::database::test_support::create_test_db;
    use crate::models::{Club, Message, User, UserRole};
    use chrono::Utc;

    async fn seed(db: &crate::database::Database) -> (Club, User, User) {
        let club = Club::new("Test Club".into(), "test-club".into());
        db.create_club(&club).await.unwrap();
        let coach = User::new(
            club.id,
            "coach@test.example".into(),
            "hash".into(),
            None,
            UserRole::Coach,
        );
        let athlete = User::new(
            club.id,
            "athlete@test.example".into(),
            "hash".into(),
            None,
            UserRole::Athlete,
        );
        db.create_user(&coach).await.unwrap();
        db.create_user(&athlete).await.unwrap();
        (club, coach, athlete)
    }

    #[tokio::test]
    async fn test_inbox_and_read_tracking() {
        let db = create_test_db().await.unwrap();
        let (club, coach, athlete) = seed(&db).await;

        let message = Message::new(
            club.id,
            coach.id,
            athlete.id,
            "Training moved".into(),
            "Wednesday session starts at 19:00 this week.".into(),
        );
        db.create_message(&message).await.unwrap();

        let inbox = db.list_inbox(athlete.id, false).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(!inbox[0].is_read());

        db.mark_message_read(message.id, Utc::now()).await.unwrap();
        let unread = db.list_inbox(athlete.id, true).await.unwrap();
        assert!(unread.is_empty());

        // read_at is set at most once
        let first_read = db.get_message(message.id).await.unwrap().unwrap().read_at;
        db.mark_message_read(message.id, Utc::now()).await.unwrap();
        let second_read = db.get_message(message.id).await.unwrap().unwrap().read_at;
        assert_eq!(first_read, second_read);

        let sent = db.list_sent(coach.id).await.unwrap();
        assert_eq!(sent.len(), 1);
    }
}
