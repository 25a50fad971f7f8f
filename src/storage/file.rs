use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::{Result, TrackerError};

/// Key-value slots kept in one JSON object on disk.
///
/// The whole file is rewritten on every change: a temp file is written and
/// synced, then renamed over the target.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            let content = fs::read(&path)?;
            match serde_json::from_slice(&content) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable storage file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let temp_file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, &self.items)?;
        writer.flush()?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| TrackerError::Storage(format!("Failed to sync {}: {}", temp_path.display(), e)))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| TrackerError::Storage(format!("Failed to replace {}: {}", self.path.display(), e)))?;

        tracing::debug!("Wrote {} slot(s) to {}", self.items.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().join("storage.json")).unwrap();
        assert_eq!(store.get_item("calorieRecords").unwrap(), None);
    }

    #[test]
    fn test_set_item_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set_item("calorieRecords", "[{\"type\":\"burned\",\"amount\":200}]").unwrap();
        store.set_item("other", "x").unwrap();
        store.remove_item("other").unwrap();
        assert!(!path.with_extension("tmp").exists());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_item("calorieRecords").unwrap().as_deref(),
            Some("[{\"type\":\"burned\",\"amount\":200}]")
        );
        assert_eq!(reopened.get_item("other").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get_item("calorieRecords").unwrap(), None);

        store.set_item("calorieRecords", "[]").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("calorieRecords").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_non_utf8_file_opens_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get_item("calorieRecords").unwrap(), None);

        store.set_item("calorieRecords", "[]").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("calorieRecords").unwrap().as_deref(), Some("[]"));
    }
}
