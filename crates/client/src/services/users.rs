use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ironmonger_auth::Role;
use ironmonger_core::UserId;

use crate::http::{ApiClient, ApiError};

/// Account as listed by the user administration endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl UserDto {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub roles: BTreeSet<Role>,
}

/// Partial update; absent fields are left unchanged and an empty password
/// is never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "blank_password")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<Role>>,
}

fn blank_password(password: &Option<String>) -> bool {
    password.as_deref().is_none_or(str::is_empty)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Deleted {
    pub ok: bool,
}

/// Entry of `GET /roles`: either `{"name": "ADMIN"}` or a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoleEntry {
    Named { name: String },
    Bare(String),
}

/// Roles offered when the server has no role listing.
pub fn fallback_roles() -> Vec<Role> {
    vec![Role::ADMIN, Role::CLIENT]
}

fn role_names(entries: Vec<RoleEntry>) -> Vec<Role> {
    let mut seen = BTreeSet::new();
    entries
        .into_iter()
        .map(|entry| match entry {
            RoleEntry::Named { name } | RoleEntry::Bare(name) => name,
        })
        .filter(|name| !name.trim().is_empty() && seen.insert(name.clone()))
        .map(Role::new)
        .collect()
}

/// User administration endpoints (admin only).
#[derive(Debug, Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<UserDto>, ApiError> {
        self.api.get("/users").await
    }

    pub async fn get(&self, id: UserId) -> Result<UserDto, ApiError> {
        self.api.get(&format!("/users/{id}")).await
    }

    pub async fn create(&self, user: &NewUser) -> Result<UserDto, ApiError> {
        self.api.post("/users", user).await
    }

    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<UserDto, ApiError> {
        self.api.put(&format!("/users/{id}"), update).await
    }

    pub async fn delete(&self, id: UserId) -> Result<Deleted, ApiError> {
        self.api.delete_json(&format!("/users/{id}")).await
    }

    /// Role names from `GET /roles`, or [`fallback_roles`] when the listing
    /// is missing or unreadable.
    pub async fn roles(&self) -> Vec<Role> {
        match self.api.get::<Vec<RoleEntry>>("/roles").await {
            Ok(entries) => role_names(entries),
            Err(err) => {
                tracing::debug!(error = %err, "role listing unavailable; using defaults");
                fallback_roles()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_omits_unset_fields_and_blank_password() {
        let update = UserUpdate {
            full_name: Some("Luis".into()),
            password: Some(String::new()),
            ..UserUpdate::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"fullName":"Luis"}"#);

        let update = UserUpdate {
            password: Some("s3creta".into()),
            is_active: Some(false),
            ..UserUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"password": "s3creta", "isActive": false})
        );
    }

    #[test]
    fn user_dto_reads_snake_case_rows() {
        let body = r#"{"user_id":5,"full_name":"Ana Lopez","email":"ana@ferre.gt",
                       "is_active":true,"created_at":"2026-02-01T10:00:00Z","roles":["ADMIN"]}"#;
        let user: UserDto = serde_json::from_str(body).unwrap();
        assert_eq!(user.user_id, UserId::new(5));
        assert!(user.is_admin());
    }

    #[test]
    fn role_listing_accepts_objects_and_strings() {
        let entries: Vec<RoleEntry> =
            serde_json::from_str(r#"[{"name":"ADMIN"},"CLIENT",{"name":"ADMIN"},""]"#).unwrap();
        assert_eq!(role_names(entries), vec![Role::ADMIN, Role::CLIENT]);
    }
}
