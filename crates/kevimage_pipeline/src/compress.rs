//! JPEG implementation of the compress collaborator.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use kevimage_core::{Compressor, OutputFormat};
use kevimage_error::{CompressionError, ConfigError, KevimageResult};

/// Quality target used when none is configured.
pub const DEFAULT_QUALITY: u8 = 80;

/// Re-encodes any decodable image as baseline JPEG at a fixed quality.
///
/// # Examples
///
/// ```
/// use kevimage_core::{Compressor, OutputFormat};
/// use kevimage_pipeline::JpegCompressor;
///
/// let compressor = JpegCompressor::new(75).unwrap();
/// assert_eq!(compressor.format(), OutputFormat::Jpeg);
/// assert!(JpegCompressor::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegCompressor {
    quality: u8,
}

impl JpegCompressor {
    /// Create a compressor with a quality in `1..=100`.
    pub fn new(quality: u8) -> KevimageResult<Self> {
        if !(1..=100).contains(&quality) {
            return Err(ConfigError::new(format!(
                "compression quality must be between 1 and 100, got {}",
                quality
            ))
            .into());
        }
        Ok(Self { quality })
    }

    /// Configured quality target.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    fn encode(input: &[u8], quality: u8) -> Result<Bytes, CompressionError> {
        let decoded = image::load_from_memory(input)
            .map_err(|e| CompressionError::new(format!("decode: {}", e)))?;

        // JPEG has no alpha channel
        let rgb = decoded.to_rgb8();

        let mut out = Vec::with_capacity(input.len() / 2);
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode_image(&rgb)
            .map_err(|e| CompressionError::new(format!("encode: {}", e)))?;

        Ok(Bytes::from(out))
    }
}

impl Default for JpegCompressor {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

#[async_trait]
impl Compressor for JpegCompressor {
    #[tracing::instrument(skip(self, input), fields(input_size = input.len(), quality = self.quality))]
    async fn compress(&self, input: Bytes) -> KevimageResult<Bytes> {
        let quality = self.quality;

        let output = tokio::task::spawn_blocking(move || Self::encode(&input, quality))
            .await
            .map_err(|e| CompressionError::new(format!("Task join error: {}", e)))??;

        tracing::debug!(output_size = output.len(), "Encoded JPEG");
        Ok(output)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }
}
