//! Remote fetch error types.

/// Kinds of fetch failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FetchErrorKind {
    /// The source URL could not be used for a request
    #[display("Invalid source URL: {}", _0)]
    InvalidUrl(String),
    /// Transport-level failure (DNS, connect, TLS, body read)
    #[display("Request failed: {}", _0)]
    Request(String),
    /// The remote answered with a non-success status
    #[display("Remote returned status {} for {}", status, url)]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },
    /// The request did not complete in time
    #[display("Request timed out: {}", _0)]
    Timeout(String),
    /// The body exceeded the configured size limit
    #[display("Response body exceeds {} bytes", limit)]
    TooLarge {
        /// Maximum accepted body size in bytes
        limit: u64,
    },
}

/// Fetch error with location tracking.
///
/// # Examples
///
/// ```
/// use kevimage_error::{FetchError, FetchErrorKind};
///
/// let err = FetchError::new(FetchErrorKind::Status {
///     url: "https://example.com/a.png".to_string(),
///     status: 404,
/// });
/// assert!(format!("{}", err).contains("status 404"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Fetch Error: {} at line {} in {}", kind, line, file)]
pub struct FetchError {
    /// The kind of error that occurred
    pub kind: FetchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FetchError {
    /// Create a new fetch error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FetchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
