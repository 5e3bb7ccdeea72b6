//! Cache coherency error types.

/// Kinds of cache coordination errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CacheErrorKind {
    /// The index references content that is missing or damaged in the store
    #[display("Corrupt cache entry for {}: content '{}' is unavailable ({})", url, key, reason)]
    CorruptEntry {
        /// Source URL of the indexed record
        url: String,
        /// Content key the record points at
        key: String,
        /// What the store reported
        reason: String,
    },
    /// A second writer indexed the same source URL
    #[display("Concurrent production detected for {}", _0)]
    RaceDetected(String),
    /// The production task ended without an outcome
    #[display("Production for {} aborted: {}", url, reason)]
    ProductionAborted {
        /// Source URL being produced
        url: String,
        /// Why the task ended
        reason: String,
    },
}

/// Cache error with location tracking.
///
/// # Examples
///
/// ```
/// use kevimage_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::RaceDetected("https://example.com/a.png".into()));
/// assert!(format!("{}", err).contains("Concurrent production"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
