//! Generation pipeline module - the orchestrating state machine

pub mod orchestrator;

pub use orchestrator::{GenerationOrchestrator, GenerationPhase, GenerationSnapshot};
