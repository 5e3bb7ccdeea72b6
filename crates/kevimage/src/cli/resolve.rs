//! `resolve` command handler.

use kevimage_error::{KevimageResult, StorageError, StorageErrorKind};
use kevimage_server::ServiceContext;
use std::path::Path;

/// Resolve `url` once, print what happened and optionally save the bytes.
///
/// The context is always drained and closed, even when resolution fails.
pub async fn resolve_url(
    context: ServiceContext,
    url: &str,
    output: Option<&Path>,
) -> KevimageResult<()> {
    let outcome = context.coordinator().resolve(url).await;
    context.shutdown().await;

    let (artifact, status) = outcome?.into_parts();

    println!("status: {}", status);
    println!("key:    {}", artifact.content_key());
    println!("type:   {}", artifact.mime_type());
    println!("bytes:  {}", artifact.len());

    if let Some(path) = output {
        std::fs::write(path, artifact.bytes()).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        println!("wrote:  {}", path.display());
    }

    Ok(())
}
