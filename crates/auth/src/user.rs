//! User profile and login wire types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use ironmonger_core::UserId;

use crate::Role;

/// The authenticated user as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "userId", alias = "id", alias = "user_id")]
    pub id: UserId,
    pub email: String,
    #[serde(
        default,
        alias = "fullName",
        alias = "full_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl UserProfile {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }

    /// Name to greet the user with; falls back to the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(rename = "accessToken", alias = "token")]
    pub token: String,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_deserializes_with_missing_optional_fields() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"userId":3,"email":"ana@ferre.gt","roles":["ADMIN"]}"#)
                .unwrap();

        assert_eq!(profile.id, UserId::new(3));
        assert!(profile.is_admin());
        assert_eq!(profile.display_name(), "ana@ferre.gt");
    }

    #[test]
    fn login_response_reads_access_token_and_user_id() {
        let body = r#"{"accessToken":"abc","user":{"userId":1,"email":"x@y.z","roles":["ADMIN"]}}"#;
        let resp: LoginResponse = serde_json::from_str(body).unwrap();

        assert_eq!(resp.token, "abc");
        assert_eq!(resp.user.id, UserId::new(1));
        assert!(resp.user.is_admin());
    }

    #[test]
    fn login_response_without_roles_is_not_admin() {
        let body = r#"{"accessToken":"abc","user":{"userId":1,"email":"x@y.z"}}"#;
        let resp: LoginResponse = serde_json::from_str(body).unwrap();

        assert!(resp.user.roles.is_empty());
        assert!(!resp.user.is_admin());
    }

    #[test]
    fn profile_serializes_with_user_id_key() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id":4,"email":"a@b.c","full_name":"Ana"}"#).unwrap();
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["userId"], 4);
        assert_eq!(json["name"], "Ana");
        assert!(json.get("id").is_none());
    }
}
