//! Session store: the authenticated identity of the running client.
//!
//! The in-memory [`Session`] is shared (see [`SharedSession`]) so the HTTP
//! layer's invalidator can clear it on a 401. The token is also persisted so
//! a later process can pick it up again through [`SessionStore::ensure_session`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ironmonger_auth::{Credentials, LoginResponse, Session, UserProfile};

use crate::error::StoreError;
use crate::http::ApiError;
use crate::storage::{self, keys, ClientStorage};

pub type SharedSession = Arc<Mutex<Session>>;

/// The two auth endpoints the session store depends on.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    async fn profile(&self) -> Result<UserProfile, ApiError>;
}

pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn ClientStorage>,
    session: SharedSession,
    last_error: Option<String>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn ClientStorage>, session: SharedSession) -> Self {
        Self {
            api,
            storage,
            session,
            last_error: None,
        }
    }

    pub fn shared(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.lock().await.is_logged_in()
    }

    pub async fn is_admin(&self) -> bool {
        self.session.lock().await.is_admin()
    }

    /// Message of the most recent failed login, cleared by a successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Exchange credentials for a token and profile.
    ///
    /// On failure the session is left as it was, the readable message is
    /// kept in [`last_error`](Self::last_error) and the error is returned.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserProfile, StoreError> {
        let credentials = Credentials::new(email.trim(), password);
        let response = match self.api.login(&credentials).await {
            Ok(response) => response,
            Err(err) => {
                tracing::info!(email = %credentials.email, error = %err, "login failed");
                self.last_error = Some(err.user_message());
                return Err(err.into());
            }
        };

        self.last_error = None;
        let LoginResponse { token, user } = response;

        self.storage.set(keys::TOKEN, &token).await?;
        storage::save_json(self.storage.as_ref(), keys::PROFILE, &user).await?;
        self.session.lock().await.sign_in(token, user.clone());

        tracing::info!(user_id = %user.id, admin = user.is_admin(), "logged in");
        Ok(user)
    }

    /// Drop the token and profile, in memory and in storage. Idempotent.
    pub async fn logout(&mut self) {
        self.session.lock().await.clear();
        for key in [keys::TOKEN, keys::PROFILE] {
            if let Err(err) = self.storage.remove(key).await {
                tracing::warn!(key, error = %err, "failed to clear stored session data");
            }
        }
        tracing::info!("logged out");
    }

    /// Fetch the profile for the current token and attach it.
    pub async fn fetch_profile(&mut self) -> Result<UserProfile, StoreError> {
        let profile = self.api.profile().await?;
        self.session.lock().await.set_user(profile.clone())?;
        storage::save_json(self.storage.as_ref(), keys::PROFILE, &profile).await?;
        Ok(profile)
    }

    /// Bring the in-memory session up to date before a routing decision.
    ///
    /// Restores a persisted token when none is held, then loads the profile
    /// if it is missing. A profile that cannot be loaded ends the session.
    pub async fn ensure_session(&mut self) -> Session {
        let has_token = self.session.lock().await.token().is_some();
        if !has_token {
            match self.storage.get(keys::TOKEN).await {
                Ok(Some(token)) if !token.is_empty() => {
                    self.session.lock().await.restore_token(token);
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "could not read stored token"),
            }
        }

        let needs_profile = self.session.lock().await.needs_profile();
        if needs_profile {
            if let Err(err) = self.fetch_profile().await {
                tracing::warn!(error = %err, "could not restore profile; logging out");
                self.logout().await;
            }
        }

        self.snapshot().await
    }
}
