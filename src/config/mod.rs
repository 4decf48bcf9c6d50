//! Configuration management

pub mod settings;

pub use settings::{
    GenerationConfig, LoggingConfig, PersistenceConfig, Settings, UploadConfig,
};
