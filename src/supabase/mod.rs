// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Supabase Forwarding
//!
//! Outbound calls to the Supabase REST, RPC and auth surfaces.
//!
//! ## Credentials
//!
//! Every call carries the public anon key as `apikey`. The `Authorization`
//! header depends on which client issued the call:
//!
//! - [`SupabaseClient`] forwards the caller's own token (or none), so
//!   row-level security evaluates the caller. It never holds the service-role
//!   key.
//! - [`ServiceRoleClient`] always sends the service-role key, ignoring any
//!   user identity. Handlers only obtain one through the admin gate.

pub mod client;

pub use client::{
    eq, ForwardError, ForwardRequest, ServiceRoleClient, SupabaseClient, UpstreamResponse,
    HEAVY_TIMEOUT, LIGHT_TIMEOUT,
};
