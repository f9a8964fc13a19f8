// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Validates Supabase-issued JWTs and exposes the caller's identity to
//! handlers.
//!
//! ## Auth Flow
//!
//! 1. Frontend signs the user in through `/api/v1/auth/login` (Supabase Auth)
//! 2. Frontend sends `Authorization: Bearer <access token>`
//! 3. Gateway:
//!    - Verifies the HMAC signature with the project JWT secret
//!    - Enforces expiry with no clock-skew leeway
//!    - Extracts `sub` → canonical `user_id`
//!    - Keeps the raw token to re-forward to Supabase
//!
//! ## Security
//!
//! - Only HS256/HS384/HS512 tokens are accepted
//! - Every token failure renders the same 401 body
//! - Admin routes additionally require `profiles.role == "admin"`

pub mod admin;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod roles;
pub mod validator;

pub use admin::AdminGate;
pub use claims::{AuthenticatedSubject, AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, OptionalAuth};
pub use middleware::{optional_auth, require_auth};
pub use roles::Role;
pub use validator::TokenValidator;
