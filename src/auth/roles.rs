// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Platform roles stored in the `profiles` table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform role of a user.
///
/// This is the application role from `profiles.role`, not the token role
/// (`anon` / `authenticated`) carried in the JWT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Listener; the role every new profile starts with
    #[default]
    Fan,
    /// Publishes songs
    Artist,
    /// Collaborates on projects and stems
    Producer,
    /// Moderation and user management
    Admin,
}

impl Role {
    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "fan" => Some(Role::Fan),
            "artist" => Some(Role::Artist),
            "producer" => Some(Role::Producer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Fan => "fan",
            Role::Artist => "artist",
            Role::Producer => "producer",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("Producer"), Some(Role::Producer));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn only_admin_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Fan.is_admin());
        assert!(!Role::Artist.is_admin());
        assert!(!Role::Producer.is_admin());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Artist).unwrap(), r#""artist""#);
        let parsed: Role = serde_json::from_str(r#""producer""#).unwrap();
        assert_eq!(parsed, Role::Producer);
    }

    #[test]
    fn default_role_is_fan() {
        assert_eq!(Role::default(), Role::Fan);
    }
}
