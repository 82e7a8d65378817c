//! Loading of the prebuilt execution artifact.


use std::path::Path;

use tracing::debug;

use crate::ArtifactError;
use crate::Result;

/// Reads the artifact blob at `path`. The file is treated as read-only input.
pub async fn load_artifact(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await.map_err(|source| ArtifactError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    if data.is_empty() {
        return Err(ArtifactError::Empty(path.to_path_buf()).into());
    }

    debug!("loaded artifact {} ({} bytes)", path.display(), data.len());
    Ok(data)
}
