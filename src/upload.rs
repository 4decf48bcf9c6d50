//! Upload validation and the accepted-image batch

use tracing::warn;

use crate::codec::EncodedImage;
use crate::config::UploadConfig;
use crate::error::{AppError, Result};

/// A candidate source file: raw bytes plus its declared MIME type.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Per-file constraint checks. Does not enforce the batch cap; that happens
/// at merge time so an over-cap addition can be rejected whole.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_bytes: usize,
    allowed_mime_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_file_bytes: config.max_file_bytes,
            allowed_mime_types: config.allowed_mime_types.clone(),
        }
    }

    /// Filter candidates down to those passing size and type constraints.
    /// Rejected candidates are dropped silently apart from a log line.
    pub fn filter(&self, candidates: Vec<SourceImage>) -> Vec<SourceImage> {
        candidates
            .into_iter()
            .filter(|candidate| {
                if candidate.byte_size() > self.max_file_bytes {
                    warn!(
                        file = %candidate.file_name,
                        size = candidate.byte_size(),
                        max = self.max_file_bytes,
                        "Dropped oversize upload candidate"
                    );
                    return false;
                }
                if !self.allowed_mime_types.iter().any(|m| m == &candidate.mime_type) {
                    warn!(
                        file = %candidate.file_name,
                        mime_type = %candidate.mime_type,
                        "Dropped upload candidate with unsupported type"
                    );
                    return false;
                }
                true
            })
            .collect()
    }
}

/// One accepted batch entry together with its transient preview locator.
#[derive(Debug, Clone)]
struct BatchEntry {
    image: SourceImage,
    preview_url: String,
}

/// Ordered batch of accepted source images, capped at `max_files`.
///
/// Insertion order is preserved; the first entry is the thumbnailing
/// convention throughout the crate.
#[derive(Debug)]
pub struct UploadBatch {
    max_files: usize,
    entries: Vec<BatchEntry>,
}

impl UploadBatch {
    pub fn new(max_files: usize) -> Self {
        Self {
            max_files,
            entries: Vec::new(),
        }
    }

    /// Merge already-validated images into the batch. All-or-nothing: if the
    /// addition would push the batch past the cap the whole merge is rejected
    /// and the batch is left untouched.
    pub fn merge(&mut self, accepted: Vec<SourceImage>) -> Result<()> {
        if self.entries.len() + accepted.len() > self.max_files {
            return Err(AppError::TooManyFiles(self.max_files));
        }

        for image in accepted {
            let preview_url =
                EncodedImage::from_bytes(&image.bytes, image.mime_type.clone()).data_url();
            self.entries.push(BatchEntry { image, preview_url });
        }
        Ok(())
    }

    /// Remove one entry, releasing its preview resource. Returns whether the
    /// batch is now empty (the caller resets staged prompt state on true).
    pub fn remove(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            // Dropping the entry releases both the bytes and the preview.
            self.entries.remove(index);
        }
        self.entries.is_empty()
    }

    /// Release every entry (used after a successful generation).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn images(&self) -> impl Iterator<Item = &SourceImage> {
        self.entries.iter().map(|e| &e.image)
    }

    pub fn previews(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.preview_url.clone()).collect()
    }

    /// Preview locator of the first image, the thumbnail convention.
    pub fn first_preview(&self) -> Option<String> {
        self.entries.first().map(|e| e.preview_url.clone())
    }
}
