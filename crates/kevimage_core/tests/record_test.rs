use bytes::Bytes;
use kevimage_core::{Artifact, CacheStatus, ContentKey, ImageRecord, NewImageRecord, OutputFormat};

fn new_record() -> NewImageRecord {
    NewImageRecord::builder()
        .source_url("https://example.com/a.png")
        .content_key(ContentKey::derive(b"compressed", OutputFormat::Jpeg))
        .original_size(4096_u64)
        .compressed_size(10_u64)
        .mime_type(OutputFormat::Jpeg.mime_type())
        .build()
        .unwrap()
}

#[test]
fn builder_requires_every_field() {
    let result = ImageRecord::builder()
        .source_url("https://example.com/a.png")
        .build();
    assert!(result.is_err());
}

#[test]
fn into_record_keeps_fields() {
    let now = chrono::Utc::now();
    let record = new_record().into_record(now);

    assert_eq!(record.source_url(), "https://example.com/a.png");
    assert_eq!(*record.original_size(), 4096);
    assert_eq!(*record.compressed_size(), 10);
    assert_eq!(record.mime_type(), "image/jpeg");
    assert_eq!(*record.created_at(), now);
}

#[test]
fn artifact_from_record() {
    let record = new_record().into_record(chrono::Utc::now());
    let artifact = Artifact::from_record(&record, Bytes::from_static(b"compressed"));

    assert_eq!(artifact.mime_type(), "image/jpeg");
    assert_eq!(artifact.content_key(), record.content_key());
    assert_eq!(artifact.len(), 10);
    assert!(artifact.content_key().matches(artifact.bytes()));
}

#[test]
fn cache_status_header_values() {
    assert_eq!(CacheStatus::Hit.as_header(), "HIT");
    assert_eq!(CacheStatus::Miss.as_header(), "MISS");
    assert_eq!(CacheStatus::Joined.as_header(), "JOINED");
}
