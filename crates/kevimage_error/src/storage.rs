//! Content store error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// No object stored under the key
    #[display("Object not found: {}", _0)]
    NotFound(String),
    /// Key is not of the form `<sha256-hex>.<ext>`
    #[display("Invalid content key: {}", _0)]
    InvalidKey(String),
    /// Stored bytes do not hash to their key
    #[display("Hash mismatch: expected {}, got {}", expected, actual)]
    HashMismatch {
        /// Digest named by the key
        expected: String,
        /// Digest of the bytes on disk
        actual: String,
    },
}

impl StorageErrorKind {
    /// Whether this kind arose while writing (as opposed to reading) an object.
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            Self::DirectoryCreation(_) | Self::FileWrite(_) | Self::InvalidKey(_)
        )
    }
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use kevimage_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("ab12.jpg".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
