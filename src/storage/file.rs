use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

use super::kv::KeyValueStore;

/// File-backed key-value store
///
/// Each key maps to `<data_dir>/<key>.json`. Writes go to a sibling temp
/// file that is renamed over the target, so readers observe either the old
/// or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
            && !key.starts_with('.');
        if !valid {
            anyhow::bail!("Invalid storage key: {:?}", key);
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .context("Failed to create data directory")?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, value.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        info!("Wrote {} ({} bytes)", path.display(), value.len());

        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
