//! Authentication configuration

use std::env;

use crate::error::AuthError;
use crate::session::AuthSession;

/// Static session settings used when the app runs without an interactive sign-in
#[derive(Clone)]
pub struct AuthConfig {
    pub user_id: String,
    pub id_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("user_id", &self.user_id)
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    /// Load from `AUTH_USER_ID` (required) and `AUTH_ID_TOKEN` (optional)
    pub fn from_env() -> Result<Self, AuthError> {
        dotenvy::dotenv().ok();

        let user_id = env::var("AUTH_USER_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AuthError::Configuration("AUTH_USER_ID is required".to_string()))?;

        Ok(Self {
            user_id,
            id_token: env::var("AUTH_ID_TOKEN").ok().filter(|t| !t.is_empty()),
        })
    }

    pub fn session(&self) -> AuthSession {
        AuthSession::new(self.user_id.clone(), self.id_token.clone())
    }
}
