//! HTTP implementation of the fetch collaborator.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use kevimage_core::Fetcher;
use kevimage_error::{BuilderError, FetchError, FetchErrorKind, KevimageResult};
use std::time::Duration;

const DEFAULT_MAX_BYTES: u64 = 25 * 1024 * 1024;
const DEFAULT_USER_AGENT: &str = concat!("kevimage/", env!("CARGO_PKG_VERSION"));

/// Settings for [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder, derive_getters::Getters)]
#[builder(setter(into), build_fn(error = "BuilderError"))]
pub struct HttpFetcherConfig {
    /// Whole-request timeout
    #[builder(default = Duration::from_secs(30))]
    timeout: Duration,
    /// Largest accepted response body
    #[builder(default = DEFAULT_MAX_BYTES)]
    max_bytes: u64,
    /// `User-Agent` header sent with every request
    #[builder(default = DEFAULT_USER_AGENT.to_string())]
    user_agent: String,
}

impl HttpFetcherConfig {
    /// Creates a new config builder.
    pub fn builder() -> HttpFetcherConfigBuilder {
        HttpFetcherConfigBuilder::default()
    }
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_bytes: DEFAULT_MAX_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Downloads source images over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    /// Build a fetcher from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &HttpFetcherConfig) -> KevimageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::new(FetchErrorKind::Request(e.to_string())))?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }

    fn classify(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::new(FetchErrorKind::Timeout(err.to_string()))
        } else {
            FetchError::new(FetchErrorKind::Request(err.to_string()))
        }
    }

    fn too_large(&self) -> FetchError {
        FetchError::new(FetchErrorKind::TooLarge {
            limit: self.max_bytes,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> KevimageResult<Bytes> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| FetchError::new(FetchErrorKind::InvalidUrl(format!("{}: {}", url, e))))?;

        let mut response = self.client.get(parsed).send().await.map_err(Self::classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(FetchErrorKind::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
            .into());
        }

        let advertised = response.content_length();
        if advertised.is_some_and(|len| len > self.max_bytes) {
            return Err(self.too_large().into());
        }

        let capacity = advertised.unwrap_or(0).min(self.max_bytes);
        let mut body = BytesMut::with_capacity(usize::try_from(capacity).unwrap_or(0));
        while let Some(chunk) = response.chunk().await.map_err(Self::classify)? {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large().into());
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(size = body.len(), %status, "Fetched source");
        Ok(body.freeze())
    }
}
