// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cross-cutting HTTP middleware.
//!
//! Applied in this order, outermost first: CORS, request id, access log,
//! rate limit. Authentication is applied per route by the API router.

pub mod cors;
pub mod logging;
pub mod rate_limit;

pub use cors::cors_layer;
pub use logging::{log_requests, REQUEST_ID_HEADER};
pub use rate_limit::{rate_limit, Admission, RateLimiter};
