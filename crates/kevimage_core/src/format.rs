//! Output formats produced by the compressor.

use serde::{Deserialize, Serialize};

/// Format of a stored artifact.
///
/// # Examples
///
/// ```
/// use kevimage_core::OutputFormat;
///
/// let format = OutputFormat::Jpeg;
/// assert_eq!(format.mime_type(), "image/jpeg");
/// assert_eq!(format.extension(), "jpg");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Baseline JPEG
    #[default]
    #[display("jpeg")]
    Jpeg,
}

impl OutputFormat {
    /// MIME type sent as `Content-Type` and stored in the index.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension used as the content key suffix.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
        }
    }

    /// Look up a format by its content key suffix.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}
