//! Session layer over the auth collaborator

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::auth::{AuthIdentity, AuthProvider, Credentials, RegisterData};
use crate::error::{AppError, Result};
use crate::library::ImageLibrary;

/// Tracks the current authenticated identity and normalizes every provider
/// outcome into either an `AuthIdentity` or a fixed per-operation message.
/// Drives the router's gating decisions.
pub struct AuthSession {
    provider: Arc<dyn AuthProvider>,
    library: Arc<ImageLibrary>,
    identity: RwLock<Option<AuthIdentity>>,
}

impl AuthSession {
    pub fn new(provider: Arc<dyn AuthProvider>, library: Arc<ImageLibrary>) -> Self {
        Self {
            provider,
            library,
            identity: RwLock::new(None),
        }
    }

    /// Establish whether a valid session already exists. Called at startup
    /// and after an OAuth-style redirect callback; "no session" resolves to
    /// `None` rather than an error.
    pub async fn restore(&self) -> Result<Option<AuthIdentity>> {
        let identity = self.provider.current_identity().await.map_err(|e| {
            warn!(error = %e, "Session restore failed");
            AppError::Auth("Authentication failed. Please check your credentials.".to_string())
        })?;

        if let Some(identity) = &identity {
            self.ensure_profile(identity).await;
        }
        *self.identity.write() = identity.clone();
        Ok(identity)
    }

    /// Re-resolve the session after an OAuth-style redirect. Only acts when
    /// the redirect actually carried the callback parameters.
    pub async fn complete_oauth_redirect(
        &self,
        user_id: Option<&str>,
        secret: Option<&str>,
    ) -> Result<Option<AuthIdentity>> {
        if user_id.is_none() || secret.is_none() {
            return Ok(self.current());
        }
        self.restore().await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthIdentity> {
        let identity = self.provider.login(credentials).await.map_err(|e| {
            warn!(error = %e, "Login failed");
            AppError::Auth("Invalid email or password".to_string())
        })?;

        self.ensure_profile(&identity).await;
        *self.identity.write() = Some(identity.clone());
        debug!(user_id = %identity.id, "Signed in");
        Ok(identity)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<AuthIdentity> {
        let identity = self.provider.register(data).await.map_err(|e| {
            warn!(error = %e, "Registration failed");
            AppError::Auth("Failed to create account. Please try again.".to_string())
        })?;

        self.ensure_profile(&identity).await;
        *self.identity.write() = Some(identity.clone());
        Ok(identity)
    }

    pub async fn logout(&self) -> Result<()> {
        self.provider.logout().await.map_err(|e| {
            warn!(error = %e, "Logout failed");
            AppError::Auth("Failed to log out".to_string())
        })?;

        *self.identity.write() = None;
        Ok(())
    }

    pub async fn request_password_recovery(&self, email: &str) -> Result<()> {
        self.provider
            .request_password_recovery(email)
            .await
            .map_err(|e| {
                warn!(error = %e, "Password recovery failed");
                AppError::Auth("Failed to send recovery email".to_string())
            })
    }

    pub fn current(&self) -> Option<AuthIdentity> {
        self.identity.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.read().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.identity
            .read()
            .as_ref()
            .map(AuthIdentity::is_admin)
            .unwrap_or(false)
    }

    /// First sign-in creates the owner's profile document; a failure here is
    /// logged and does not block the sign-in itself.
    async fn ensure_profile(&self, identity: &AuthIdentity) {
        if let Err(e) = self
            .library
            .ensure_user_profile(&identity.id, &identity.email, &identity.name)
            .await
        {
            warn!(user_id = %identity.id, error = %e, "Failed to ensure user profile");
        }
    }
}
