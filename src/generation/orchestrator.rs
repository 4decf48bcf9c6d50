//! Generation orchestrator: validation, encoding, the gateway call and the
//! persistence side effects, driven as an explicit state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use tracing::{debug, error, warn};

use crate::auth::AuthSession;
use crate::backend::{GeneratedScene, GenerationBackend};
use crate::codec::{self, EncodedImage};
use crate::config::{GenerationConfig, UploadConfig};
use crate::error::{AppError, Result};
use crate::library::ImageLibrary;
use crate::store::records::{
    Dimensions, GeneratedImageRecord, GenerationSettings, ImageMetadata,
};
use crate::tags;
use crate::upload::{SourceImage, UploadBatch, UploadValidator};

/// Messages rotated while a generation call is pending
const LOADING_MESSAGES: &[&str] = &[
    "Placing your products in a new world...",
    "AI is getting creative with your items...",
    "Composing the perfect scene...",
    "Rendering pixels of perfection...",
    "Hold tight, magic is happening...",
];

/// Named states of the generation flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    Validating,
    AwaitingResult,
    Succeeded,
    Failed,
}

/// Observable state for the rendering layer
#[derive(Debug, Clone)]
pub struct GenerationSnapshot {
    pub phase: GenerationPhase,
    pub loading_message: Option<String>,
    pub result_url: Option<String>,
    pub error: Option<String>,
    pub previews: Vec<String>,
    pub prompt: String,
}

struct OrchestratorState {
    batch: UploadBatch,
    prompt: String,
    phase: GenerationPhase,
    loading_message: Option<String>,
    result_url: Option<String>,
    error: Option<String>,
}

/// Releases the in-flight guard however the generation call exits
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Coordinates the upload batch, the generation gateway and the library.
///
/// `Idle -> Validating -> AwaitingResult -> Succeeded | Failed`; batch
/// mutations return the machine to `Idle`. A second `generate` while one is
/// pending is rejected outright by the in-flight guard.
pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    session: Arc<AuthSession>,
    /// Persistence side effects are skipped when no library is attached
    library: Option<Arc<ImageLibrary>>,
    validator: UploadValidator,
    model_name: String,
    state: RwLock<OrchestratorState>,
    in_flight: AtomicBool,
}

impl GenerationOrchestrator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        session: Arc<AuthSession>,
        library: Option<Arc<ImageLibrary>>,
        uploads: &UploadConfig,
        generation: &GenerationConfig,
    ) -> Self {
        Self {
            backend,
            session,
            library,
            validator: UploadValidator::new(uploads),
            model_name: generation.model.clone(),
            state: RwLock::new(OrchestratorState {
                batch: UploadBatch::new(uploads.max_files),
                prompt: String::new(),
                phase: GenerationPhase::Idle,
                loading_message: None,
                result_url: None,
                error: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> GenerationSnapshot {
        let state = self.state.read();
        GenerationSnapshot {
            phase: state.phase,
            loading_message: state.loading_message.clone(),
            result_url: state.result_url.clone(),
            error: state.error.clone(),
            previews: state.batch.previews(),
            prompt: state.prompt.clone(),
        }
    }

    /// Stage prompt text for the next generation call
    pub fn set_prompt(&self, prompt: &str) {
        self.state.write().prompt = prompt.to_string();
    }

    /// Validate candidates and merge the survivors into the batch. The merge
    /// is all-or-nothing against the batch cap: an over-cap addition is
    /// dropped whole and surfaced as an inline error.
    pub fn add_images(&self, candidates: Vec<SourceImage>) -> Result<usize> {
        let accepted = self.validator.filter(candidates);
        let count = accepted.len();

        let mut state = self.state.write();
        match state.batch.merge(accepted) {
            Ok(()) => {
                state.phase = GenerationPhase::Idle;
                state.result_url = None;
                state.error = None;
                Ok(count)
            }
            Err(e) => {
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Remove one image, releasing its preview immediately. Removing the
    /// last image clears the staged prompt and returns to the
    /// pre-generation state.
    pub fn remove_image(&self, index: usize) {
        let mut state = self.state.write();
        if state.batch.remove(index) {
            state.prompt.clear();
            state.phase = GenerationPhase::Idle;
            state.result_url = None;
            state.error = None;
        }
    }

    /// Release the batch and return to a pre-generation state
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.batch.clear();
        state.prompt.clear();
        state.phase = GenerationPhase::Idle;
        state.loading_message = None;
        state.result_url = None;
        state.error = None;
    }

    pub fn batch_len(&self) -> usize {
        self.state.read().batch.len()
    }

    /// Run one generation attempt with the staged prompt and batch.
    ///
    /// Returns the displayable data URL on success. Exactly one gateway
    /// attempt is made; a persistence failure after a successful generation
    /// is logged and does not revert the displayed result.
    pub async fn generate(&self) -> Result<String> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::GenerationInProgress);
        }
        let _guard = FlightGuard(&self.in_flight);

        // Entry guards: batch, prompt, then identity when persistence is on.
        let (images, prompt, first_preview) = {
            let mut state = self.state.write();
            state.phase = GenerationPhase::Validating;

            if state.batch.is_empty() {
                return Err(self.fail(&mut state, AppError::NoImages));
            }
            let prompt = state.prompt.trim().to_string();
            if prompt.is_empty() {
                return Err(self.fail(&mut state, AppError::EmptyPrompt));
            }
            if self.library.is_some() && !self.session.is_authenticated() {
                return Err(self.fail(&mut state, AppError::Unauthenticated));
            }

            let images: Vec<SourceImage> = state.batch.images().cloned().collect();
            let first_preview = state.batch.first_preview();

            state.phase = GenerationPhase::AwaitingResult;
            state.loading_message = LOADING_MESSAGES
                .choose(&mut rand::thread_rng())
                .map(|m| m.to_string());
            state.result_url = None;
            state.error = None;
            (images, prompt, first_preview)
        };

        // All encodes are issued together and awaited as a unit; results are
        // recombined by original index. The gateway call only starts once
        // every encode has resolved.
        let encoded: Vec<EncodedImage> =
            futures::future::try_join_all(images.iter().map(encode_source)).await?;

        let outcome = self.backend.generate(&encoded, &prompt).await;

        match outcome {
            Ok(Some(scene)) => {
                let result_url = scene.data_url();
                {
                    let mut state = self.state.write();
                    state.phase = GenerationPhase::Succeeded;
                    state.loading_message = None;
                    state.result_url = Some(result_url.clone());
                }

                self.persist(&scene, &prompt, first_preview).await;
                Ok(result_url)
            }
            Ok(None) => {
                let mut state = self.state.write();
                Err(self.fail(&mut state, AppError::Generation))
            }
            Err(e) => {
                let mut state = self.state.write();
                Err(self.fail(&mut state, e))
            }
        }
    }

    fn fail(&self, state: &mut OrchestratorState, error: AppError) -> AppError {
        debug!(error = %error, "Generation attempt failed");
        state.phase = GenerationPhase::Failed;
        state.loading_message = None;
        state.error = Some(error.user_message());
        error
    }

    /// Store the generated record and bump the owner's counter. Failures are
    /// logged only: the user already has the result on screen.
    async fn persist(&self, scene: &GeneratedScene, prompt: &str, first_preview: Option<String>) {
        let Some(library) = &self.library else {
            return;
        };
        let Some(identity) = self.session.current() else {
            warn!("Identity disappeared before the generated image was persisted");
            return;
        };

        let result_url = scene.data_url();
        let record = GeneratedImageRecord {
            user_id: identity.id.clone(),
            title: format!("Generated Image - {}", Utc::now().format("%Y-%m-%d")),
            description: Some(format!("Generated with prompt: {}", prompt)),
            prompt: prompt.to_string(),
            image_url: result_url.clone(),
            thumbnail_url: Some(result_url),
            original_image_url: first_preview.unwrap_or_default(),
            settings: GenerationSettings {
                model: self.model_name.clone(),
                style: None,
                quality: Some("standard".to_string()),
                size: Some("auto".to_string()),
            },
            metadata: ImageMetadata {
                file_size: codec::estimated_byte_size(&scene.data) as u64,
                dimensions: Dimensions {
                    width: 1024,
                    height: 1024,
                },
                format: scene
                    .mime_type
                    .strip_prefix("image/")
                    .unwrap_or("png")
                    .to_string(),
            },
            is_public: false,
            tags: tags::extract_tags(prompt),
            favorite_count: 0,
            share_count: 0,
        };

        if let Err(e) = library.save_generated_image(&record).await {
            error!(user_id = %identity.id, error = %e, "Failed to persist generated image");
        }
    }
}

async fn encode_source(image: &SourceImage) -> Result<EncodedImage> {
    Ok(EncodedImage::from_bytes(&image.bytes, image.mime_type.clone()))
}
