// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. The gateway owns no data
//! model: rows coming back from Supabase are relayed as [`Record`]s, and only
//! request bodies are typed and validated here.
//!
//! ## Model Categories
//!
//! - **Auth**: signup, login and the session returned by Supabase Auth
//! - **Songs**: creation, updates and publishing
//! - **Projects**: collaboration projects, invitations and stems
//! - **Engagement**: comments, reviews, tips and analytics events
//! - **Admin**: role changes and moderation acknowledgements

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::Role;

/// Minimum accepted password length at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Request bodies checked before anything is forwarded.
pub trait Validate {
    /// Describe the first problem found, if any.
    fn validate(&self) -> Result<(), String>;
}

fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}

fn require_email(value: &str) -> Result<(), String> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err("email must be a valid email address".to_string())
    }
}

// =============================================================================
// Relayed Rows
// =============================================================================

/// A row or object exactly as returned by Supabase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Record(pub Value);

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Auth Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    /// At least 6 characters.
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), String> {
        require_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        require_email(&self.email)?;
        require_non_empty("password", &self.password)
    }
}

/// Session issued by Supabase Auth.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub user: Value,
}

// =============================================================================
// Song Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSongRequest {
    pub title: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default)]
    pub artwork_url: String,
}

impl Validate for CreateSongRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("title", &self.title)
    }
}

/// Partial song update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSongRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
}

impl Validate for UpdateSongRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.is_none() && self.audio_url.is_none() && self.artwork_url.is_none() {
            return Err("at least one field must be provided".to_string());
        }
        if let Some(title) = &self.title {
            require_non_empty("title", title)?;
        }
        Ok(())
    }
}

/// Body of `POST /songs/{id}/publish`. A missing or unreadable body publishes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublishSongRequest {
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl Default for PublishSongRequest {
    fn default() -> Self {
        Self { is_published: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SongActionResponse {
    pub message: String,
    pub song_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

// =============================================================================
// Project Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub title: String,
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("title", &self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteRequest {
    /// User ID of the collaborator being invited.
    pub invitee_id: String,
}

impl Validate for InviteRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("invitee_id", &self.invitee_id)
    }
}

/// Stem metadata. The audio itself is uploaded to storage by the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateStemRequest {
    pub name: String,
    pub file_url: String,
}

impl Validate for CreateStemRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)?;
        require_non_empty("file_url", &self.file_url)
    }
}

// =============================================================================
// Engagement Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub song_id: String,
    pub body: String,
}

impl Validate for CreateCommentRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("song_id", &self.song_id)?;
        require_non_empty("body", &self.body)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub song_id: String,
    /// 1 to 5.
    pub rating: i32,
    #[serde(default)]
    pub body: String,
}

impl Validate for CreateReviewRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("song_id", &self.song_id)?;
        if !(1..=5).contains(&self.rating) {
            return Err("rating must be between 1 and 5".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTipRequest {
    pub song_id: String,
    /// Tip amount in cents, at least 1.
    pub amount_cents: i64,
}

impl Validate for CreateTipRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("song_id", &self.song_id)?;
        if self.amount_cents < 1 {
            return Err("amount_cents must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Analytics event such as a play or a view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub song_id: String,
    pub event_type: String,
}

impl Validate for CreateEventRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("song_id", &self.song_id)?;
        require_non_empty("event_type", &self.event_type)
    }
}

// =============================================================================
// Admin Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// One of `fan`, `artist`, `producer`, `admin`.
    pub role: String,
}

impl UpdateRoleRequest {
    /// The requested role, if it names a known one.
    pub fn parsed_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

impl Validate for UpdateRoleRequest {
    fn validate(&self) -> Result<(), String> {
        match self.parsed_role() {
            Some(_) => Ok(()),
            None => Err(format!("unknown role '{}'", self.role)),
        }
    }
}

/// Acknowledgement of a comment or review removal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ModerationResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleUpdatedResponse {
    pub message: String,
    pub user_id: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_requires_email_shape_and_password_length() {
        let ok = SignupRequest {
            email: "fan@example.com".into(),
            password: "secret1".into(),
            display_name: String::new(),
        };
        assert!(ok.validate().is_ok());

        for email in ["", "fan", "@example.com", "fan@", "fan@example", "fan @example.com"] {
            let bad = SignupRequest {
                email: email.into(),
                ..ok.clone()
            };
            assert!(bad.validate().is_err(), "accepted {email:?}");
        }

        let short = SignupRequest {
            password: "12345".into(),
            ..ok
        };
        assert!(short.validate().unwrap_err().contains("at least 6"));
    }

    #[test]
    fn review_rating_bounds() {
        let review = |rating| CreateReviewRequest {
            song_id: "s1".into(),
            rating,
            body: String::new(),
        };
        assert!(review(1).validate().is_ok());
        assert!(review(5).validate().is_ok());
        assert!(review(0).validate().is_err());
        assert!(review(6).validate().is_err());
    }

    #[test]
    fn tip_requires_positive_amount() {
        let tip = |amount_cents| CreateTipRequest {
            song_id: "s1".into(),
            amount_cents,
        };
        assert!(tip(1).validate().is_ok());
        assert!(tip(0).validate().is_err());
        assert!(tip(-5).validate().is_err());
    }

    #[test]
    fn update_song_needs_a_field() {
        assert!(UpdateSongRequest::default().validate().is_err());
        let rename = UpdateSongRequest {
            title: Some("New".into()),
            ..Default::default()
        };
        assert!(rename.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&rename).unwrap(),
            serde_json::json!({"title": "New"})
        );
    }

    #[test]
    fn publish_defaults_to_true() {
        let parsed: PublishSongRequest = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_published);
        assert!(PublishSongRequest::default().is_published);
    }

    #[test]
    fn role_update_accepts_known_roles_only() {
        let request = |role: &str| UpdateRoleRequest { role: role.into() };
        assert_eq!(request("artist").parsed_role(), Some(Role::Artist));
        assert!(request("Admin").validate().is_ok());
        assert!(request("root").validate().is_err());
    }

    #[test]
    fn record_is_transparent() {
        let record: Record = serde_json::from_str(r#"{"id":"s1"}"#).unwrap();
        assert_eq!(record.0["id"], "s1");
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"id":"s1"}"#);
    }
}
