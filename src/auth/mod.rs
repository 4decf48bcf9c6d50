//! Authentication module - identity, the provider seam and the session layer

pub mod local;
pub mod session;

pub use local::LocalAuthProvider;
pub use session::AuthSession;

use async_trait::async_trait;

use crate::error::Result;

/// The authenticated user's minimal identity record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub labels: Vec<String>,
}

impl AuthIdentity {
    /// Admin-gated routes are permitted iff an "admin" label is present
    pub fn is_admin(&self) -> bool {
        self.labels.iter().any(|label| label == "admin")
    }
}

/// Email/password login credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// New-account registration data
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// External auth collaborator. `current_identity` resolves to `Ok(None)` when
/// no session exists - absence is not an error.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthIdentity>;

    async fn register(&self, data: &RegisterData) -> Result<AuthIdentity>;

    async fn logout(&self) -> Result<()>;

    async fn current_identity(&self) -> Result<Option<AuthIdentity>>;

    async fn request_password_recovery(&self, email: &str) -> Result<()>;
}
