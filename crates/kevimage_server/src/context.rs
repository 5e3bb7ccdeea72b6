//! Long-lived service handles.

use crate::KevimageConfig;
use kevimage_cache::CacheCoordinator;
use kevimage_database::{SqliteMetadataIndex, SqlitePool, create_pool, run_migrations};
use kevimage_error::KevimageResult;
use kevimage_pipeline::{HttpFetcher, JpegCompressor, Pipeline};
use kevimage_storage::FileSystemContentStore;
use std::sync::Arc;

/// Everything the service needs for its whole lifetime.
///
/// Built once at startup from [`KevimageConfig`] and passed explicitly to the
/// router and CLI; there are no process-wide singletons.
#[derive(Clone)]
pub struct ServiceContext {
    config: KevimageConfig,
    pool: SqlitePool,
    coordinator: CacheCoordinator,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl ServiceContext {
    /// Open the content store and database, then assemble the pipeline and
    /// coordinator.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created, the
    /// database cannot be opened or migrated, or a collaborator rejects its
    /// configuration.
    #[tracing::instrument(skip(config), fields(cache_dir = %config.storage.cache_dir.display(), database = %config.database.url))]
    pub fn initialize(config: &KevimageConfig) -> KevimageResult<Self> {
        config.validate()?;

        let store = FileSystemContentStore::new(&config.storage.cache_dir)?;

        let pool = create_pool(
            &config.database.url,
            config.database.pool_size,
            config.busy_timeout(),
        )?;
        run_migrations(&pool)?;
        let index = SqliteMetadataIndex::new(pool.clone());

        let fetcher = HttpFetcher::new(&config.fetcher_config()?)?;
        let compressor = JpegCompressor::new(config.compression.quality)?;

        let pipeline = Pipeline::builder()
            .fetcher(Arc::new(fetcher))
            .compressor(Arc::new(compressor))
            .store(Arc::new(store))
            .index(Arc::new(index))
            .build()?;

        tracing::info!(quality = config.compression.quality, "Service context ready");

        Ok(Self {
            config: config.clone(),
            pool,
            coordinator: CacheCoordinator::new(pipeline),
        })
    }

    /// The configuration the context was built from.
    pub fn config(&self) -> &KevimageConfig {
        &self.config
    }

    /// The request-facing coordinator.
    pub fn coordinator(&self) -> &CacheCoordinator {
        &self.coordinator
    }

    /// Wait for in-flight productions to land in the cache, then release the
    /// database pool.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(self) {
        let drained = self.coordinator.drain().await;
        let state = self.pool.state();
        tracing::info!(
            drained,
            connections = state.connections,
            "Service context closed"
        );
    }
}
