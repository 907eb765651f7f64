use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Files relative to a base directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(Path::new(path))
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

/// Sets of already-posted identifiers, one file per source or group.
#[derive(Debug, Clone)]
pub struct HistoryStore<S: Storage> {
    storage: S,
}

impl<S: Storage> HistoryStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// A missing history file is an empty history.
    pub async fn load(&self, history_file: &str) -> Result<BTreeSet<String>> {
        match self.storage.read_file(history_file).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.is_not_found() => {
                tracing::info!("  History file '{}' not found. Will create it.", history_file);
                Ok(BTreeSet::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, history_file: &str, links: &BTreeSet<String>) -> Result<()> {
        let mut content = String::new();
        for link in links {
            content.push_str(link);
            content.push('\n');
        }
        self.storage.write_file(history_file, content.as_bytes()).await?;
        tracing::info!("  Updated history file: {}", history_file);
        Ok(())
    }
}
