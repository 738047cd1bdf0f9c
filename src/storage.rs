use crate::errors::StorageError;
use crate::registry::Registry;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};

pub fn encode_registry(registry: &Registry) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec_pretty(registry)?)
}

/// Duplicate routine ids make the whole blob invalid.
pub fn decode_registry(bytes: &[u8]) -> Result<Registry, StorageError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Reads the saved routines. Anything unreadable yields an empty registry.
pub async fn load_registry(path: &Path) -> Registry {
    match fs::read(path).await {
        Ok(bytes) => match decode_registry(&bytes) {
            Ok(registry) => {
                info!("loaded {} routines from {}", registry.len(), path.display());
                registry
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                Registry::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Registry::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Registry::default()
        }
    }
}

pub async fn persist_registry(path: &Path, registry: &Registry) -> Result<(), StorageError> {
    let payload = encode_registry(registry)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    debug!("saved {} routines to {}", registry.len(), path.display());
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
