// ABOUTME: Internal messaging route handlers
// ABOUTME: Member-to-member mail with inbox/sent listings and read tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! Messaging routes
//!
//! Messages stay inside a club. Reading a message as its recipient marks it
//! read; only the recipient can delete it from their inbox.

use crate::{errors::AppError, models::Message, server::ServerResources};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Request sending a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Receiving account id (must be in the caller's club)
    pub recipient_id: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
}

/// Query parameters for the inbox
#[derive(Debug, Deserialize, Default)]
pub struct InboxQuery {
    /// Only return unread messages
    #[serde(default)]
    pub unread_only: bool,
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Message id
    pub id: String,
    /// Sending account id
    pub sender_id: String,
    /// Receiving account id
    pub recipient_id: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
    /// When it was sent
    pub sent_at: String,
    /// When the recipient first read it
    pub read_at: Option<String>,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender_id.to_string(),
            recipient_id: message.recipient_id.to_string(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            sent_at: message.sent_at.to_rfc3339(),
            read_at: message.read_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Messaging routes implementation
pub struct MessageRoutes;

impl MessageRoutes {
    /// Create all messaging routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/messages", post(Self::handle_send))
            .route("/api/messages/inbox", get(Self::handle_inbox))
            .route("/api/messages/sent", get(Self::handle_sent))
            .route("/api/messages/:id", get(Self::handle_get))
            .route("/api/messages/:id", delete(Self::handle_delete))
            .route("/api/messages/:id/read", post(Self::handle_mark_read))
            .with_state(resources)
    }

    /// Handle sending a message inside the club
    async fn handle_send(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<SendMessageRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let recipient_id = crate::utils::uuid::parse_uuid(&request.recipient_id)
            .map_err(|e| AppError::invalid_input(format!("Invalid recipient ID: {e}")))?;
        let recipient = resources
            .database
            .get_user(recipient_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load recipient: {e}")))?
            .ok_or_else(|| AppError::not_found("Recipient"))?;

        if recipient.club_id != auth.club_id {
            // Cross-club recipients are indistinguishable from unknown ones
            return Err(AppError::not_found("Recipient"));
        }
        if recipient.id == auth.user_id {
            return Err(AppError::invalid_input("You cannot message yourself"));
        }
        if request.subject.trim().is_empty() || request.body.trim().is_empty() {
            return Err(AppError::invalid_input(
                "Subject and body must not be empty",
            ));
        }

        let message = Message::new(
            auth.club_id,
            auth.user_id,
            recipient_id,
            request.subject.trim().to_owned(),
            request.body,
        );
        resources
            .database
            .create_message(&message)
            .await
            .map_err(|e| AppError::database(format!("Failed to send message: {e}")))?;

        info!(
            club_id = %auth.club_id,
            sender_id = %auth.user_id,
            recipient_id = %recipient_id,
            "Message sent"
        );

        Ok((StatusCode::CREATED, Json(MessageResponse::from(&message))).into_response())
    }

    /// Handle the inbox listing
    async fn handle_inbox(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<InboxQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let messages = resources
            .database
            .list_inbox(auth.user_id, query.unread_only)
            .await
            .map_err(|e| AppError::database(format!("Failed to list inbox: {e}")))?;

        let responses: Vec<MessageResponse> = messages.iter().map(MessageResponse::from).collect();
        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle the sent listing
    async fn handle_sent(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let messages = resources
            .database
            .list_sent(auth.user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to list sent messages: {e}")))?;

        let responses: Vec<MessageResponse> = messages.iter().map(MessageResponse::from).collect();
        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle reading one message; the recipient's first read marks it read
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let message = Self::load_for_participant(&resources, &auth, &id).await?;

        if message.recipient_id == auth.user_id && !message.is_read() {
            resources
                .database
                .mark_message_read(message.id, Utc::now())
                .await
                .map_err(|e| AppError::database(format!("Failed to mark read: {e}")))?;
        }

        let reloaded = resources
            .database
            .get_message(message.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to reload message: {e}")))?
            .ok_or_else(|| AppError::not_found("Message"))?;

        Ok((StatusCode::OK, Json(MessageResponse::from(&reloaded))).into_response())
    }

    /// Handle explicit mark-read (recipient only)
    async fn handle_mark_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let message = Self::load_for_participant(&resources, &auth, &id).await?;

        if message.recipient_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the recipient can mark a message read",
            ));
        }

        resources
            .database
            .mark_message_read(message.id, Utc::now())
            .await
            .map_err(|e| AppError::database(format!("Failed to mark read: {e}")))?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle deletion from the recipient's inbox
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let message = Self::load_for_participant(&resources, &auth, &id).await?;

        if message.recipient_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the recipient can delete a message",
            ));
        }

        resources
            .database
            .delete_message(message.id)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete message: {e}")))?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Load a message and verify the caller is sender or recipient
    async fn load_for_participant(
        resources: &Arc<ServerResources>,
        auth: &crate::auth::AuthContext,
        id: &str,
    ) -> Result<Message, AppError> {
        let message_id = crate::utils::uuid::parse_uuid(id)
            .map_err(|e| AppError::invalid_input(format!("Invalid message ID: {e}")))?;

        let message = resources
            .database
            .get_message(message_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load message: {e}")))?
            .ok_or_else(|| AppError::not_found("Message"))?;

        if message.club_id != auth.club_id
            || (message.sender_id != auth.user_id && message.recipient_id != auth.user_id)
        {
            return Err(AppError::not_found("Message"));
        }

        Ok(message)
    }
}
