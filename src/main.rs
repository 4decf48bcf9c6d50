//! Main entry point: boot sequence for the placement studio core

use std::sync::Arc;

use insitu_studio::{
    auth::LocalAuthProvider,
    config::Settings,
    routing::NullLocation,
    AppContext,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    info!("Starting placement studio");
    info!(
        model = %settings.generation.model,
        max_files = settings.uploads.max_files,
        remote_persistence = settings.persistence.endpoint.is_some(),
        "Loaded configuration"
    );

    // Mount the application context
    let provider = Arc::new(LocalAuthProvider::new());
    let context = AppContext::build(settings, provider, Arc::new(NullLocation), "/")?;

    // Establish whether a valid session already exists
    let identity = context.session.restore().await?;
    info!(
        authenticated = identity.is_some(),
        "Session restore complete"
    );

    // Initial render decision
    let decision = context.router.resolve();
    info!(path = %context.router.current_path(), ?decision, "Mounted");

    Ok(())
}
