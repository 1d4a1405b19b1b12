// ABOUTME: HTTP middleware for request authentication and CORS
// ABOUTME: Provides the Bearer-token auth middleware and CORS layer setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

pub mod auth;
pub mod cors;

// Authentication middleware
pub use auth::AuthMiddleware;

// CORS configuration
pub use cors::setup_cors;
