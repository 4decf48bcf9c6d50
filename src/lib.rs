//! In-situ product placement studio
//!
//! Core of an AI product-placement application: an upload-validate-encode-
//! generate pipeline against a generative-image collaborator, a typed
//! persistence layer over a document/file store, and a client-side style
//! router with authentication and admin gating.

pub mod auth;
pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod generation;
pub mod library;
pub mod routing;
pub mod store;
pub mod tags;
pub mod upload;

pub use error::{AppError, Result};

use std::sync::Arc;

use auth::{AuthProvider, AuthSession};
use backend::{GeminiBackend, GenerationBackend};
use generation::GenerationOrchestrator;
use library::{Collections, ImageLibrary};
use routing::{default_routes, LocationSink, Router};
use store::{DiskFileStore, DocumentStore, MemoryStore, RemoteStore};

/// Application-wide context, created at startup and passed down explicitly.
/// Replaces ambient module-level auth/navigation state.
pub struct AppContext {
    pub settings: config::Settings,
    pub session: Arc<AuthSession>,
    pub library: Arc<ImageLibrary>,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub router: Arc<Router>,
}

impl AppContext {
    /// Wire the collaborators together. The document store is remote when an
    /// endpoint is configured, in-memory otherwise.
    pub fn build(
        settings: config::Settings,
        provider: Arc<dyn AuthProvider>,
        location: Arc<dyn LocationSink>,
        initial_path: &str,
    ) -> Result<Self> {
        let documents: Arc<dyn DocumentStore> = if settings.persistence.endpoint.is_some() {
            Arc::new(RemoteStore::new(&settings.persistence)?)
        } else {
            Arc::new(MemoryStore::new())
        };

        let files = Arc::new(DiskFileStore::new(
            settings.persistence.storage_path.clone(),
            settings.persistence.url_prefix.clone(),
        ));

        let library = Arc::new(ImageLibrary::new(
            documents,
            files,
            Collections::from(&settings.persistence),
        ));

        let session = Arc::new(AuthSession::new(provider, library.clone()));

        let gemini: Arc<dyn GenerationBackend> =
            Arc::new(GeminiBackend::new(&settings.generation)?);

        let orchestrator = Arc::new(GenerationOrchestrator::new(
            gemini,
            session.clone(),
            Some(library.clone()),
            &settings.uploads,
            &settings.generation,
        ));

        let router = Arc::new(Router::new(
            default_routes(),
            session.clone(),
            location,
            initial_path,
        ));

        Ok(Self {
            settings,
            session,
            library,
            orchestrator,
            router,
        })
    }
}
