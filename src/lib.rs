// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Leep Gateway - Backend-for-frontend for the Leep Audio platform
//!
//! Sits between the Leep clients and Supabase. Validates Supabase-issued
//! JWTs, rate limits per client, and forwards each call to the Supabase
//! Auth, REST and RPC endpoints with either the caller's own token or, for
//! admin operations only, the service-role key.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers and router (Axum)
//! - `auth` - JWT validation, identity extraction and the admin gate
//! - `middleware` - CORS, access logging and rate limiting
//! - `shutdown` - SIGINT/SIGTERM handling
//! - `supabase` - Dual-credential upstream client

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod shutdown;
pub mod state;
pub mod supabase;
