// ABOUTME: Server assembly: shared resource container and HTTP entry point
// ABOUTME: Builds the axum router from domain routers and serves it with CORS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! # Server Module
//!
//! Centralized resource container for dependency injection plus the HTTP
//! server entry point. Route handlers share one `Arc<ServerResources>`
//! instead of cloning the database and auth manager per domain.

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::middleware::{setup_cors, AuthMiddleware};
use crate::routes::{
    AttendanceRoutes, AuthRoutes, CategoryRoutes, ClubRoutes, EvaluationRoutes, HealthRoutes,
    MessageRoutes, PaymentRoutes, SportifRoutes, TrainingRoutes, UserRoutes,
};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tracing::info;

/// Centralized resource container for dependency injection
///
/// Holds all shared server resources so route handlers can share one Arc
/// instead of recreating expensive objects.
pub struct ServerResources {
    /// Database handle shared by every route
    pub database: Arc<Database>,
    /// JWT manager for token minting and validation
    pub auth_manager: Arc<AuthManager>,
    /// Bearer-token authentication middleware
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Runtime configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(auth_manager);
        let auth_middleware = Arc::new(AuthMiddleware::new(
            auth_manager.clone(),
            database.clone(),
        ));

        Self {
            database,
            auth_manager,
            auth_middleware,
            config,
        }
    }
}

/// The SportClub HTTP server
pub struct ClubServer {
    resources: Arc<ServerResources>,
}

impl ClubServer {
    /// Create a new server around shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Assemble the full application router
    #[must_use]
    pub fn router(&self) -> Router {
        let cors = setup_cors(&self.resources.config);

        Router::new()
            .merge(HealthRoutes::routes(self.resources.clone()))
            .merge(AuthRoutes::routes(self.resources.clone()))
            .merge(ClubRoutes::routes(self.resources.clone()))
            .merge(UserRoutes::routes(self.resources.clone()))
            .merge(CategoryRoutes::routes(self.resources.clone()))
            .merge(SportifRoutes::routes(self.resources.clone()))
            .merge(TrainingRoutes::routes(self.resources.clone()))
            .merge(AttendanceRoutes::routes(self.resources.clone()))
            .merge(EvaluationRoutes::routes(self.resources.clone()))
            .merge(PaymentRoutes::routes(self.resources.clone()))
            .merge(MessageRoutes::routes(self.resources.clone()))
            .layer(cors)
    }

    /// Run the HTTP server on the given port until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails
    pub async fn run(self, port: u16) -> Result<()> {
        let router = self.router();

        let addr = format!("0.0.0.0:{port}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("HTTP server listening on http://{addr}");

        axum::serve(listener, router).await?;

        Ok(())
    }
}
