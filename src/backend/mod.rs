//! Generation backend module - trait and the Gemini HTTP client

pub mod gemini;
pub mod traits;

pub use gemini::GeminiBackend;
pub use traits::{GeneratedScene, GenerationBackend};
