// ABOUTME: Server binary for the SportClub management platform
// ABOUTME: Loads configuration, runs migrations, and serves the REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

//! # SportClub Server Binary
//!
//! Starts the multi-tenant SportClub REST API with JWT authentication and
//! SQLite storage.

use anyhow::Result;
use clap::Parser;
use sportclub_server::{
    auth::AuthManager,
    config::environment::ServerConfig,
    database::Database,
    logging,
    server::{ClubServer, ServerResources},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sportclub-server")]
#[command(about = "SportClub API - Multi-tenant sports club management platform")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (sqlite path or sqlite::memory:)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging before anything that might warn
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = &args.database_url {
        config.database.url =
            sportclub_server::config::environment::DatabaseUrl::parse_url(database_url);
    }

    info!("Starting SportClub API");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url.to_connection_string()).await?;
    info!("Database initialized: {}", config.database.url);

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.jwt_expiry_hours,
    );
    info!("Authentication manager initialized");

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(config),
    ));
    let server = ClubServer::new(resources);

    display_available_endpoints(port);
    info!("Ready to serve club data");

    server.run(port).await
}

/// Display the API surface at startup
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());

    info!("=== Available API Endpoints ===");
    info!("Authentication:");
    info!("   Register Club:   POST http://{host}:{port}/api/auth/register");
    info!("   Login:           POST http://{host}:{port}/api/auth/login");
    info!("   Refresh Token:   POST http://{host}:{port}/api/auth/refresh");
    info!("   Profile:         GET  http://{host}:{port}/api/auth/me");
    info!("Club & Members:");
    info!("   Club Profile:    GET  http://{host}:{port}/api/club");
    info!("   Accounts:        CRUD http://{host}:{port}/api/users");
    info!("   Categories:      CRUD http://{host}:{port}/api/categories");
    info!("   Sportifs:        CRUD http://{host}:{port}/api/sportifs");
    info!("Scheduling:");
    info!("   Trainings:       CRUD http://{host}:{port}/api/trainings");
    info!("   Occurrences:     GET  http://{host}:{port}/api/trainings/{{id}}/occurrences");
    info!("   Calendar:        GET  http://{host}:{port}/api/trainings/calendar");
    info!("   Attendance:      PUT  http://{host}:{port}/api/trainings/{{id}}/attendance");
    info!("Evaluations & Payments:");
    info!("   Evaluations:     POST http://{host}:{port}/api/evaluations");
    info!("   Licences:        CRUD http://{host}:{port}/api/licences");
    info!("   Stages:          CRUD http://{host}:{port}/api/stages");
    info!("   Pay Installment: POST http://{host}:{port}/api/installments/{{id}}/pay");
    info!("   Outstanding:     GET  http://{host}:{port}/api/payments/outstanding");
    info!("Messaging:");
    info!("   Send:            POST http://{host}:{port}/api/messages");
    info!("   Inbox:           GET  http://{host}:{port}/api/messages/inbox");
    info!("Monitoring:");
    info!("   Health:          GET  http://{host}:{port}/health");
    info!("=== End of Endpoint List ===");
}
