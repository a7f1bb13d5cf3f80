//! In-memory session state.
//!
//! # Invariants
//! - `user` is only present while a token is present.
//! - An empty token string is the same as no token.

use ironmonger_core::{DomainError, DomainResult};

use crate::UserProfile;

/// Token and profile of the current client.
///
/// This is a plain state container; loading and persisting the token is the
/// job of the session store in the client crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.is_logged_in() && self.user.as_ref().is_some_and(UserProfile::is_admin)
    }

    /// Replace the whole session after a successful login.
    pub fn sign_in(&mut self, token: String, user: UserProfile) {
        if token.is_empty() {
            self.clear();
            return;
        }
        self.token = Some(token);
        self.user = Some(user);
    }

    /// Adopt a token read back from durable storage. The profile is dropped
    /// because it belonged to whatever token was there before.
    pub fn restore_token(&mut self, token: String) {
        self.user = None;
        self.token = if token.is_empty() { None } else { Some(token) };
    }

    /// Overwrite the loaded profile. Fails when there is no token to own it.
    pub fn set_user(&mut self, user: UserProfile) -> DomainResult<()> {
        if !self.is_logged_in() {
            return Err(DomainError::invariant("cannot attach a profile without a token"));
        }
        self.user = Some(user);
        Ok(())
    }

    /// Token present but no profile loaded yet.
    pub fn needs_profile(&self) -> bool {
        self.is_logged_in() && self.user.is_none()
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}
