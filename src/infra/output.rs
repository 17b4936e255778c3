//! Build directory writes.

use std::path::Path;

use super::error::InfraError;

/// Write `contents` to `path`, creating missing parent directories.
pub async fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), InfraError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| InfraError::io(parent, err))?;
    }

    tokio::fs::write(path, contents)
        .await
        .map_err(|err| InfraError::io(path, err))
}

pub async fn ensure_dir(path: &Path) -> Result<(), InfraError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| InfraError::io(path, err))
}
