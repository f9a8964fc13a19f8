// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin authorization and custody of the service-role client.

use serde::Deserialize;
use tracing::warn;

use super::{AuthError, AuthenticatedUser, Role};
use crate::supabase::{eq, ServiceRoleClient, SupabaseClient};

#[derive(Debug, Deserialize)]
struct ProfileRole {
    #[serde(default)]
    role: Option<String>,
}

/// Grants the service-role client to callers whose profile role is `admin`.
///
/// The role is read with the caller's own token, so row-level security
/// applies to the lookup itself.
pub struct AdminGate {
    service_role: ServiceRoleClient,
}

impl AdminGate {
    pub fn new(service_role: ServiceRoleClient) -> Self {
        Self { service_role }
    }

    /// Look up the caller's platform role.
    pub async fn role_of(
        &self,
        user: &AuthenticatedUser,
        supabase: &SupabaseClient,
    ) -> Result<Option<Role>, AuthError> {
        let path = format!("/rest/v1/profiles?id={}&select=role", eq(&user.user_id));
        let response = supabase
            .get(path)
            .as_user(Some(user))
            .send()
            .await
            .map_err(|e| AuthError::RoleLookupFailed(e.to_string()))?;

        if !response.is_success() {
            return Err(AuthError::RoleLookupFailed(format!(
                "profiles lookup returned {}",
                response.status
            )));
        }

        let rows: Vec<ProfileRole> = response
            .json()
            .map_err(|e| AuthError::RoleLookupFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.role)
            .and_then(|role| Role::parse(&role)))
    }

    /// Hand out the service-role client if the caller is an admin.
    pub async fn authorize(
        &self,
        user: &AuthenticatedUser,
        supabase: &SupabaseClient,
    ) -> Result<ServiceRoleClient, AuthError> {
        match self.role_of(user, supabase).await? {
            Some(role) if role.is_admin() => Ok(self.service_role.clone()),
            role => {
                warn!(
                    user_id = %user.user_id,
                    role = ?role,
                    "Admin access denied"
                );
                Err(AuthError::InsufficientPermissions)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::BearerToken;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn caller() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            token_role: "authenticated".to_string(),
            token: BearerToken::new("user.jwt"),
        }
    }

    async fn gate_with_profile(status: u16, body: serde_json::Value) -> (MockServer, AdminGate, SupabaseClient) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.u1"))
            .and(query_param("select", "role"))
            .and(header("authorization", "Bearer user.jwt"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(server.uri(), "anon-key").unwrap();
        let gate = AdminGate::new(ServiceRoleClient::new(&client, SecretString::from("service-key")));
        (server, gate, client)
    }

    #[tokio::test]
    async fn admin_profile_is_granted() {
        let (_server, gate, client) = gate_with_profile(200, json!([{"role": "admin"}])).await;
        assert!(gate.authorize(&caller(), &client).await.is_ok());
    }

    #[tokio::test]
    async fn other_roles_are_denied() {
        for role in ["fan", "artist", "producer"] {
            let (_server, gate, client) = gate_with_profile(200, json!([{"role": role}])).await;
            assert!(matches!(
                gate.authorize(&caller(), &client).await,
                Err(AuthError::InsufficientPermissions)
            ));
        }
    }

    #[tokio::test]
    async fn missing_profile_is_denied() {
        let (_server, gate, client) = gate_with_profile(200, json!([])).await;
        assert!(matches!(
            gate.authorize(&caller(), &client).await,
            Err(AuthError::InsufficientPermissions)
        ));
    }

    #[tokio::test]
    async fn failed_lookup_is_not_a_grant() {
        let (_server, gate, client) = gate_with_profile(500, json!({"message": "boom"})).await;
        assert!(matches!(
            gate.authorize(&caller(), &client).await,
            Err(AuthError::RoleLookupFailed(_))
        ));
    }
}
