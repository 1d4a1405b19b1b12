// ABOUTME: Utility module organization for shared helpers
// ABOUTME: Re-exports small helpers used across route and database layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportClub Contributors

/// UUID parsing helpers with consistent error messages
pub mod uuid;
