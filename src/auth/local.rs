//! Process-local auth provider

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{AuthIdentity, AuthProvider, Credentials, RegisterData};
use crate::error::{AppError, Result};

struct Account {
    identity: AuthIdentity,
    password: String,
}

/// In-process account registry with a single active session. The default
/// provider when no hosted auth collaborator is configured; also the test
/// substrate for the session layer.
#[derive(Default)]
pub struct LocalAuthProvider {
    accounts: DashMap<String, Account>,
    active: RwLock<Option<AuthIdentity>>,
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account, optionally with labels (used for admin bootstrap)
    pub fn seed_account(&self, data: &RegisterData, labels: Vec<String>) -> AuthIdentity {
        let identity = AuthIdentity {
            id: Uuid::new_v4().to_string(),
            email: data.email.clone(),
            name: data.name.clone(),
            labels,
        };
        self.accounts.insert(
            data.email.clone(),
            Account {
                identity: identity.clone(),
                password: data.password.clone(),
            },
        );
        identity
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn login(&self, credentials: &Credentials) -> Result<AuthIdentity> {
        let account = self
            .accounts
            .get(&credentials.email)
            .ok_or_else(|| AppError::Auth("unknown account".to_string()))?;

        if account.password != credentials.password {
            return Err(AppError::Auth("password mismatch".to_string()));
        }

        let identity = account.identity.clone();
        *self.active.write() = Some(identity.clone());
        debug!(user_id = %identity.id, "Opened local session");
        Ok(identity)
    }

    async fn register(&self, data: &RegisterData) -> Result<AuthIdentity> {
        if self.accounts.contains_key(&data.email) {
            return Err(AppError::Auth("account already exists".to_string()));
        }

        let identity = self.seed_account(data, Vec::new());
        *self.active.write() = Some(identity.clone());
        Ok(identity)
    }

    async fn logout(&self) -> Result<()> {
        *self.active.write() = None;
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<AuthIdentity>> {
        Ok(self.active.read().clone())
    }

    async fn request_password_recovery(&self, email: &str) -> Result<()> {
        if !self.accounts.contains_key(email) {
            return Err(AppError::Auth("unknown account".to_string()));
        }
        debug!(email, "Password recovery requested");
        Ok(())
    }
}
