//! URL resolution with per-URL production deduplication.

use futures::future::{BoxFuture, FutureExt, Shared};
use kevimage_core::{Artifact, CacheStatus, ImageRecord, MetadataIndex};
use kevimage_error::{CacheError, CacheErrorKind, KevimageResult, ValidationError};
use kevimage_pipeline::{Pipeline, corrupt_entry};
use kevimage_storage::ContentStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Completion signal for one in-flight production, cloned to every waiter.
type Ticket = Shared<BoxFuture<'static, KevimageResult<Artifact>>>;

/// An artifact together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Resolution {
    /// The compressed bytes and their mime type
    artifact: Artifact,
    /// Hit, miss, or joined another caller's production
    status: CacheStatus,
}

impl Resolution {
    /// Split into artifact and status.
    pub fn into_parts(self) -> (Artifact, CacheStatus) {
        (self.artifact, self.status)
    }
}

struct Inner {
    pipeline: Pipeline,
    tickets: Mutex<HashMap<String, Ticket>>,
}

impl Inner {
    fn index(&self) -> &Arc<dyn MetadataIndex> {
        self.pipeline.index()
    }

    fn store(&self) -> &Arc<dyn ContentStore> {
        self.pipeline.store()
    }

    /// Serve an indexed record from the store. A record whose bytes cannot be
    /// read is corrupt; it is never silently re-produced.
    async fn serve_record(&self, record: &ImageRecord) -> KevimageResult<Artifact> {
        match self.store().read(record.content_key()).await {
            Ok(bytes) => Ok(Artifact::from_record(record, bytes)),
            Err(e) => {
                let err = corrupt_entry(record, &e);
                tracing::error!(error = %err, "Indexed artifact is unreadable");
                Err(err)
            }
        }
    }

    /// Body of the spawned production task.
    async fn produce(&self, source_url: &str) -> KevimageResult<Artifact> {
        // A previous production may have finished between our caller's index
        // lookup and the ticket insert.
        if let Some(record) = self.index().find_by_url(source_url).await? {
            tracing::debug!("Indexed while waiting for a ticket");
            return self.serve_record(&record).await;
        }

        let (_, artifact) = self.pipeline.produce(source_url).await?.into_parts();
        Ok(artifact)
    }
}

/// Removes a ticket from the table when its production task ends, including
/// when the task panics.
struct TicketRelease {
    inner: Arc<Inner>,
    source_url: String,
}

impl Drop for TicketRelease {
    fn drop(&mut self) {
        self.inner.tickets.lock().remove(&self.source_url);
    }
}

/// Resolves source URLs to compressed artifacts.
///
/// Holds the in-flight ticket table: a map from source URL to a shared future
/// over the spawned production task for that URL. The table lock is held only
/// to look up, insert or remove a ticket, never across fetch, compress, store
/// or index calls.
///
/// Cloning is cheap and every clone shares the same ticket table.
///
/// # Examples
///
/// ```no_run
/// use kevimage_cache::{CacheCoordinator, CacheStatus};
/// # use kevimage_pipeline::Pipeline;
///
/// # async fn example(pipeline: Pipeline) -> Result<(), Box<dyn std::error::Error>> {
/// let coordinator = CacheCoordinator::new(pipeline);
///
/// let first = coordinator.resolve("https://example.com/a.png").await?;
/// assert_eq!(*first.status(), CacheStatus::Miss);
///
/// let second = coordinator.resolve("https://example.com/a.png").await?;
/// assert_eq!(*second.status(), CacheStatus::Hit);
/// assert_eq!(first.artifact().bytes(), second.artifact().bytes());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CacheCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CacheCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("pipeline", &self.inner.pipeline)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl CacheCoordinator {
    /// Create a coordinator driving `pipeline` on misses.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline,
                tickets: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Resolve `source_url` to its compressed artifact.
    ///
    /// 1. An indexed record is served from the content store (`Hit`).
    /// 2. Otherwise, if a production for the URL is in flight, wait for it
    ///    (`Joined`).
    /// 3. Otherwise start one (`Miss`).
    ///
    /// Every caller waiting on the same production receives the same artifact
    /// or the same error. Dropping the returned future never cancels a
    /// production; it runs to completion and is cached.
    ///
    /// # Errors
    ///
    /// - validation error for an empty URL
    /// - corrupt cache entry if an indexed record's bytes are missing or damaged
    /// - any pipeline error, shared by every waiter
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, source_url: &str) -> KevimageResult<Resolution> {
        if source_url.trim().is_empty() {
            return Err(ValidationError::new("source URL must not be empty").into());
        }

        if let Some(record) = self.inner.index().find_by_url(source_url).await? {
            let artifact = self.inner.serve_record(&record).await?;
            tracing::info!(key = %artifact.content_key(), size = artifact.len(), "Cache hit");
            return Ok(Resolution {
                artifact,
                status: CacheStatus::Hit,
            });
        }

        let (ticket, status) = self.ticket_for(source_url);
        if status == CacheStatus::Joined {
            tracing::debug!("Joining in-flight production");
        }

        let artifact = ticket.await?;
        tracing::info!(
            %status,
            key = %artifact.content_key(),
            size = artifact.len(),
            "Resolved"
        );
        Ok(Resolution { artifact, status })
    }

    /// Return the ticket for `source_url`, starting a production if none is
    /// in flight.
    fn ticket_for(&self, source_url: &str) -> (Ticket, CacheStatus) {
        let mut tickets = self.inner.tickets.lock();

        if let Some(ticket) = tickets.get(source_url) {
            return (ticket.clone(), CacheStatus::Joined);
        }

        tracing::info!("Cache miss, starting production");

        // The task cannot release its ticket before the insert below, because
        // release takes the lock we are holding.
        let release = TicketRelease {
            inner: Arc::clone(&self.inner),
            source_url: source_url.to_string(),
        };
        let task = tokio::spawn(async move {
            let outcome = release.inner.produce(&release.source_url).await;
            if let Err(e) = &outcome {
                tracing::error!(source_url = %release.source_url, error = %e, "Production failed");
            }
            drop(release);
            outcome
        });

        let url = source_url.to_string();
        let ticket = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(CacheError::new(CacheErrorKind::ProductionAborted {
                    url,
                    reason: e.to_string(),
                })
                .into()),
            }
        }
        .boxed()
        .shared();

        tickets.insert(source_url.to_string(), ticket.clone());
        (ticket, CacheStatus::Miss)
    }

    /// Number of productions currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.tickets.lock().len()
    }

    /// Wait for every production in flight at the time of the call to settle.
    ///
    /// Returns how many productions were awaited.
    #[tracing::instrument(skip(self))]
    pub async fn drain(&self) -> usize {
        let pending: Vec<Ticket> = self.inner.tickets.lock().values().cloned().collect();
        let count = pending.len();

        if count > 0 {
            tracing::info!(count, "Draining in-flight productions");
            futures::future::join_all(pending).await;
        }
        count
    }

    /// The pipeline used for misses.
    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }
}
