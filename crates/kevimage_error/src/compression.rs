//! Transcoding error types.

/// The compressor could not decode or re-encode the input.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Compression Error: {} at line {} in {}", message, line, file)]
pub struct CompressionError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl CompressionError {
    /// Create a new CompressionError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use kevimage_error::CompressionError;
    ///
    /// let err = CompressionError::new("unsupported image format");
    /// assert!(err.message.contains("unsupported"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
