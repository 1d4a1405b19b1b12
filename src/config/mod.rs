// ABOUTME: Configuration module organization for the SportClub server
// ABOUTME: Groups environment-driven runtime configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

/// Environment-based server configuration
pub mod environment;
