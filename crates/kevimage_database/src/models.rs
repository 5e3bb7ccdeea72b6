//! Diesel row types for the `images` table.

use crate::schema::images;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use kevimage_core::{ContentKey, ImageRecord, NewImageRecord};
use kevimage_error::{DatabaseError, DatabaseErrorKind};

/// Database row for an indexed image.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = images)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ImageRow {
    /// Row id
    pub id: i32,
    /// Original URL
    pub source_url: String,
    /// Key of the stored object
    pub content_key: String,
    /// Source size in bytes
    pub original_size: i64,
    /// Stored size in bytes
    pub compressed_size: i64,
    /// Stored format
    pub mime_type: String,
    /// Insert time (UTC)
    pub created_at: NaiveDateTime,
}

/// Insertable row for a new image.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = images)]
pub struct NewImageRow {
    /// Original URL
    pub source_url: String,
    /// Key of the stored object
    pub content_key: String,
    /// Source size in bytes
    pub original_size: i64,
    /// Stored size in bytes
    pub compressed_size: i64,
    /// Stored format
    pub mime_type: String,
    /// Insert time (UTC)
    pub created_at: NaiveDateTime,
}

fn to_column(size: u64, field: &str) -> Result<i64, DatabaseError> {
    i64::try_from(size).map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Serialization(format!(
            "{} {} does not fit in a BIGINT column",
            field, size
        )))
    })
}

fn from_column(size: i64, field: &str) -> Result<u64, DatabaseError> {
    u64::try_from(size).map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Serialization(format!(
            "negative {} {} in index",
            field, size
        )))
    })
}

impl NewImageRow {
    /// Build an insertable row stamped with `created_at`.
    pub fn from_record(
        record: &NewImageRecord,
        created_at: NaiveDateTime,
    ) -> Result<Self, DatabaseError> {
        Ok(Self {
            source_url: record.source_url().clone(),
            content_key: record.content_key().to_string(),
            original_size: to_column(*record.original_size(), "original_size")?,
            compressed_size: to_column(*record.compressed_size(), "compressed_size")?,
            mime_type: record.mime_type().clone(),
            created_at,
        })
    }
}

impl TryFrom<ImageRow> for ImageRecord {
    type Error = DatabaseError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        let content_key = ContentKey::parse(&row.content_key).map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                "row {}: {}",
                row.id, e.kind
            )))
        })?;

        ImageRecord::builder()
            .source_url(row.source_url)
            .content_key(content_key)
            .original_size(from_column(row.original_size, "original_size")?)
            .compressed_size(from_column(row.compressed_size, "compressed_size")?)
            .mime_type(row.mime_type)
            .created_at(row.created_at.and_utc())
            .build()
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Serialization(e.to_string())))
    }
}
