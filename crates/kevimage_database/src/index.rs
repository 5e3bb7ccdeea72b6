//! SQLite implementation of the metadata index.

use crate::models::{ImageRow, NewImageRow};
use crate::schema::images;
use crate::{DatabaseResult, SqlitePool};
use async_trait::async_trait;
use diesel::prelude::*;
use kevimage_core::{ContentKey, ImageRecord, MetadataIndex, NewImageRecord};
use kevimage_error::{DatabaseError, DatabaseErrorKind, KevimageResult};

/// Metadata index backed by a pooled SQLite database.
///
/// Diesel calls are blocking, so every operation checks out a connection and
/// runs on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteMetadataIndex {
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteMetadataIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteMetadataIndex")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl SqliteMetadataIndex {
    /// Wrap an existing pool. Migrations must already have been applied.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn with_connection<T, F>(&self, op: F) -> DatabaseResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut *conn)
        })
        .await
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Query(format!("Task join error: {}", e)))
        })?
    }

    /// All records pointing at `key`, oldest first.
    #[tracing::instrument(skip(self, key), fields(key = %key))]
    pub async fn find_by_content_key(&self, key: &ContentKey) -> KevimageResult<Vec<ImageRecord>> {
        let key = key.to_string();

        let rows = self
            .with_connection(move |conn| {
                images::table
                    .filter(images::content_key.eq(&key))
                    .order(images::id.asc())
                    .select(ImageRow::as_select())
                    .load(conn)
                    .map_err(Into::into)
            })
            .await?;

        rows.into_iter()
            .map(|row| ImageRecord::try_from(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl MetadataIndex for SqliteMetadataIndex {
    #[tracing::instrument(skip(self))]
    async fn find_by_url(&self, source_url: &str) -> KevimageResult<Option<ImageRecord>> {
        let url = source_url.to_string();

        let row = self
            .with_connection(move |conn| {
                images::table
                    .filter(images::source_url.eq(&url))
                    .select(ImageRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(Into::into)
            })
            .await?;

        match row {
            Some(row) => Ok(Some(ImageRecord::try_from(row)?)),
            None => Ok(None),
        }
    }

    #[tracing::instrument(
        skip(self, record),
        fields(source_url = %record.source_url(), key = %record.content_key())
    )]
    async fn insert(&self, record: NewImageRecord) -> KevimageResult<ImageRecord> {
        let row = NewImageRow::from_record(&record, chrono::Utc::now().naive_utc())?;

        let inserted = self
            .with_connection(move |conn| {
                conn.immediate_transaction(|conn| {
                    diesel::insert_into(images::table)
                        .values(&row)
                        .execute(conn)?;

                    images::table
                        .filter(images::source_url.eq(&row.source_url))
                        .select(ImageRow::as_select())
                        .first(conn)
                        .map_err(DatabaseError::from)
                })
            })
            .await?;

        tracing::debug!(id = inserted.id, "Indexed image");
        Ok(ImageRecord::try_from(inserted)?)
    }

    async fn count(&self) -> KevimageResult<u64> {
        let total: i64 = self
            .with_connection(|conn| {
                images::table
                    .count()
                    .get_result(conn)
                    .map_err(Into::into)
            })
            .await?;

        Ok(u64::try_from(total).unwrap_or_default())
    }
}
