//! Top-level error wrapper types.

use crate::{
    BuilderError, CacheError, CacheErrorKind, CompressionError, ConfigError, DatabaseError,
    FetchError, ServerError, StorageError, ValidationError,
};

/// Every error domain in the workspace.
///
/// # Examples
///
/// ```
/// use kevimage_error::{KevimageError, ValidationError};
///
/// let err: KevimageError = ValidationError::new("missing url").into();
/// assert!(format!("{}", err).contains("Validation Error"));
/// ```
#[derive(Debug, Clone, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum KevimageErrorKind {
    /// Missing or malformed request input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Source image could not be downloaded
    #[from(FetchError)]
    Fetch(FetchError),
    /// Source image could not be transcoded
    #[from(CompressionError)]
    Compression(CompressionError),
    /// Content store failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Metadata index failure
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Cache coherency failure
    #[from(CacheError)]
    Cache(CacheError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// HTTP service lifecycle error
    #[from(ServerError)]
    Server(ServerError),
}

/// Kevimage error with kind discrimination.
///
/// # Examples
///
/// ```
/// use kevimage_error::{KevimageResult, ConfigError};
///
/// fn might_fail() -> KevimageResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Kevimage Error: {}", _0)]
pub struct KevimageError(Box<KevimageErrorKind>);

impl KevimageError {
    /// Create a new error from a kind.
    pub fn new(kind: KevimageErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &KevimageErrorKind {
        &self.0
    }

    /// Machine-readable identifier for the error, stable across releases.
    ///
    /// # Examples
    ///
    /// ```
    /// use kevimage_error::{KevimageError, StorageError, StorageErrorKind};
    ///
    /// let write: KevimageError = StorageError::new(StorageErrorKind::FileWrite("disk full".into())).into();
    /// assert_eq!(write.code(), "storage_write_failed");
    ///
    /// let read: KevimageError = StorageError::new(StorageErrorKind::FileRead("EIO".into())).into();
    /// assert_eq!(read.code(), "storage_read_failed");
    /// ```
    pub fn code(&self) -> &'static str {
        match self.kind() {
            KevimageErrorKind::Validation(_) => "validation_error",
            KevimageErrorKind::Fetch(_) => "fetch_failed",
            KevimageErrorKind::Compression(_) => "compression_failed",
            KevimageErrorKind::Storage(e) if e.kind.is_write_failure() => "storage_write_failed",
            KevimageErrorKind::Storage(_) => "storage_read_failed",
            KevimageErrorKind::Database(_) => "index_failed",
            KevimageErrorKind::Cache(e) => match e.kind {
                CacheErrorKind::CorruptEntry { .. } => "corrupt_cache_entry",
                CacheErrorKind::RaceDetected(_) => "race_detected",
                CacheErrorKind::ProductionAborted { .. } => "production_aborted",
            },
            KevimageErrorKind::Config(_) => "config_error",
            KevimageErrorKind::Builder(_) => "builder_error",
            KevimageErrorKind::Server(_) => "server_error",
        }
    }

    /// Human-readable description of the failure without location details.
    pub fn message(&self) -> String {
        match self.kind() {
            KevimageErrorKind::Validation(e) => e.message.clone(),
            KevimageErrorKind::Fetch(e) => e.kind.to_string(),
            KevimageErrorKind::Compression(e) => e.message.clone(),
            KevimageErrorKind::Storage(e) => e.kind.to_string(),
            KevimageErrorKind::Database(e) => e.kind.to_string(),
            KevimageErrorKind::Cache(e) => e.kind.to_string(),
            KevimageErrorKind::Config(e) => e.message.clone(),
            KevimageErrorKind::Builder(e) => e.kind().to_string(),
            KevimageErrorKind::Server(e) => e.kind.to_string(),
        }
    }

    /// Whether the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), KevimageErrorKind::Validation(_))
    }
}

// Generic From implementation for any type that converts to KevimageErrorKind
impl<T> From<T> for KevimageError
where
    T: Into<KevimageErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Kevimage operations.
///
/// # Examples
///
/// ```
/// use kevimage_error::{KevimageResult, CompressionError};
///
/// fn transcode() -> KevimageResult<Vec<u8>> {
///     Err(CompressionError::new("not an image"))?
/// }
/// ```
pub type KevimageResult<T> = std::result::Result<T, KevimageError>;
