//! Common error types for the placement studio

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Too many files: a batch holds at most {0} images")]
    TooManyFiles(usize),

    #[error("No images in the batch")]
    NoImages,

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("A generation request is already in flight")]
    GenerationInProgress,

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Image generation failed")]
    Generation,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Fixed inline copy shown to the user. Provider/internal detail stays in
    /// the logs; this is the only text that crosses the UI boundary.
    pub fn user_message(&self) -> String {
        match self {
            AppError::TooManyFiles(max) => {
                format!("You can upload a maximum of {} images", max)
            }
            AppError::NoImages => "Please upload at least one product image".to_string(),
            AppError::EmptyPrompt => {
                "Please describe the environment for your products".to_string()
            }
            AppError::GenerationInProgress => {
                "An image is already being generated. Please wait for it to finish".to_string()
            }
            AppError::Unauthenticated => {
                "You must be logged in to generate images".to_string()
            }
            AppError::Generation => {
                "Failed to generate image. Please try a different prompt or image.".to_string()
            }
            AppError::Auth(msg) => msg.clone(),
            AppError::NotFound(_) => "The requested item could not be found".to_string(),
            AppError::Unauthorized(_) => "You do not have access to this item".to_string(),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }

    /// True for errors raised by input validation rather than a collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::TooManyFiles(_)
                | AppError::NoImages
                | AppError::EmptyPrompt
                | AppError::GenerationInProgress
                | AppError::Unauthenticated
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
