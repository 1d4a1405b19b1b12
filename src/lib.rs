// ABOUTME: Main library entry point for the SportClub management platform
// ABOUTME: Provides the REST API for clubs, members, trainings, payments, and messaging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

#![deny(unsafe_code)]

//! # SportClub Server
//!
//! A multi-tenant management backend for sports clubs. Every club is a
//! tenant; categories, members, athletes, trainings, payments, and messages
//! are all scoped to the club that owns them.
//!
//! ## Features
//!
//! - **Club registration**: one call creates the club and its first admin
//! - **Role-based access**: `admin`, `coach`, and `athlete` accounts
//! - **Scheduling**: weekly recurring sessions and one-off matches expanded
//!   into dated occurrences
//! - **Attendance & evaluations**: per-occurrence attendance sheets and
//!   coach-recorded skill evaluations
//! - **Payment tracking**: licences and stages with monthly installments
//! - **Internal messaging**: member-to-member mail inside a club
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sportclub_server::config::environment::ServerConfig;
//! use sportclub_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("SportClub server configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Authentication and session management
pub mod auth;

/// Configuration management
pub mod config;

/// Multi-tenant database management
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for authentication and CORS
pub mod middleware;

/// Common data models for club management
pub mod models;

/// `HTTP` routes for the REST API, organized by domain
pub mod routes;

/// Server assembly: shared resources and the HTTP entry point
pub mod server;

/// Utility functions and helpers
pub mod utils;
