use async_trait::async_trait;

use ironmonger_auth::{Credentials, LoginResponse, UserProfile};

use crate::http::{ApiClient, ApiError};
use crate::session_store::AuthApi;

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthApi for AuthService {
    /// `POST /auth/login`. Sent without a token; a 401 here is a bad
    /// password, not an expired session.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.api.post_public("/auth/login", credentials).await
    }

    /// `GET /auth/profile`
    async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.api.get("/auth/profile").await
    }
}
