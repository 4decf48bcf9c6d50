//! Image payload encoding - base64 transport form and data URLs

use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;
use tokio::fs;

use crate::error::{AppError, Result};

/// Transport-safe representation of image bytes plus declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64 encoded image bytes
    pub data: String,
    /// Declared MIME type (e.g. "image/png")
    pub mime_type: String,
}

impl EncodedImage {
    /// Encode raw bytes with a declared MIME type
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Read a file from disk and encode it, sniffing the MIME type from the
    /// leading bytes. Propagates the underlying read error.
    pub async fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref()).await.map_err(AppError::Io)?;
        let format = detect_image_format(&bytes).unwrap_or("png");
        Ok(Self::from_bytes(&bytes, format_to_mime(format)))
    }

    /// Decode back to raw bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode(&self.data)
    }

    /// Displayable locator: a MIME-typed data URL in front of the payload
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Decode a base64 string to binary data, accepting bare payloads and full
/// data URLs alike.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let data = if encoded.contains(',') {
        encoded.split(',').last().unwrap_or(encoded)
    } else {
        encoded
    };

    STANDARD
        .decode(data.trim())
        .map_err(|e| AppError::Internal(format!("Invalid base64 data: {}", e)))
}

/// Get the image format from a data URL prefix
pub fn format_from_data_url(data_url: &str) -> Option<&str> {
    if data_url.starts_with("data:image/") {
        let end = data_url.find(';')?;
        Some(&data_url[11..end])
    } else {
        None
    }
}

/// Create a data URL from binary image data
pub fn data_url_from_bytes(data: &[u8], format: &str) -> String {
    format!("data:image/{};base64,{}", format, STANDARD.encode(data))
}

/// Map a sniffed format to its MIME type
pub fn format_to_mime(format: &str) -> String {
    format!("image/{}", format)
}

/// Detect image format from binary data using magic bytes
pub fn detect_image_format(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpeg");
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("gif");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("webp");
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Some("bmp");
    }

    None
}

/// Approximate decoded byte size of a base64 payload
pub fn estimated_byte_size(b64_data: &str) -> usize {
    b64_data.len() * 3 / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let original = b"Hello, World!";
        let encoded = EncodedImage::from_bytes(original, "image/png");
        let decoded = encoded.decode().unwrap();
        assert_eq!(original.as_slice(), decoded.as_slice());
    }

    #[test]
    fn test_data_url_round_trip() {
        let original = b"some image bytes";
        let encoded = EncodedImage::from_bytes(original, "image/webp");
        let url = encoded.data_url();
        assert!(url.starts_with("data:image/webp;base64,"));
        assert_eq!(decode(&url).unwrap(), original.to_vec());
    }

    #[test]
    fn test_decode_data_url() {
        let data_url = "data:image/png;base64,SGVsbG8sIFdvcmxkIQ==";
        let decoded = decode(data_url).unwrap();
        assert_eq!(b"Hello, World!", decoded.as_slice());
    }

    #[test]
    fn test_format_from_data_url() {
        assert_eq!(format_from_data_url("data:image/png;base64,abc"), Some("png"));
        assert_eq!(
            format_from_data_url("data:image/jpeg;base64,abc"),
            Some("jpeg")
        );
        assert_eq!(format_from_data_url("not a data url"), None);
    }

    #[test]
    fn test_detect_png() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_image_format(&png_header), Some("png"));
    }

    #[test]
    fn test_detect_jpeg() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_image_format(&jpeg_header), Some("jpeg"));
    }

    #[test]
    fn test_detect_webp() {
        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0, 0, 0, 0]);
        webp.extend_from_slice(b"WEBP");
        assert_eq!(detect_image_format(&webp), Some("webp"));
    }

    #[test]
    fn test_estimated_byte_size() {
        let payload = STANDARD.encode([0u8; 300]);
        assert_eq!(estimated_byte_size(&payload), 300);
    }

    #[tokio::test]
    async fn test_read_from_sniffs_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product.png");
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(b"payload");
        tokio::fs::write(&path, &bytes).await.unwrap();

        let encoded = EncodedImage::read_from(&path).await.unwrap();
        assert_eq!(encoded.mime_type, "image/png");
        assert_eq!(encoded.decode().unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_read_from_missing_file_propagates_error() {
        let err = EncodedImage::read_from("/no/such/file.png").await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
