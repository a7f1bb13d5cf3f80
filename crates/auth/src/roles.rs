use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier as handed out by the API.
///
/// Roles are opaque strings; the only one the client interprets is the
/// administrator role, which gates the back-office routes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));
    pub const CLIENT: Role = Role(Cow::Borrowed("CLIENT"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the administrator role.
    ///
    /// The API is not consistent about casing or the `ROLE_` prefix, so
    /// `admin`, `ADMIN` and `ROLE_ADMIN` all count.
    pub fn is_admin(&self) -> bool {
        let name = self.as_str();
        let name = name
            .strip_prefix("ROLE_")
            .or_else(|| name.strip_prefix("role_"))
            .unwrap_or(name);
        name.eq_ignore_ascii_case(Self::ADMIN.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_matches_common_spellings() {
        assert!(Role::ADMIN.is_admin());
        assert!(Role::new("admin").is_admin());
        assert!(Role::new("ROLE_ADMIN").is_admin());
        assert!(!Role::CLIENT.is_admin());
        assert!(!Role::new("ADMINISTRATIVE").is_admin());
    }
}
