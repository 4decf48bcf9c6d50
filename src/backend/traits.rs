//! Common traits and types for image generation backends

use async_trait::async_trait;

use crate::codec::EncodedImage;
use crate::error::Result;

/// One inline image produced by the generative service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScene {
    /// Base64 encoded image bytes
    pub data: String,

    /// MIME type declared by the service
    pub mime_type: String,
}

impl GeneratedScene {
    /// Displayable locator for the generated image
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Trait for generative-image backends.
///
/// A single attempt per call: no retries, no cancellation. `Ok(None)` means
/// the service executed but returned no inline image part.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Composite the ordered source images into a scene described by `prompt`
    async fn generate(
        &self,
        images: &[EncodedImage],
        prompt: &str,
    ) -> Result<Option<GeneratedScene>>;
}
