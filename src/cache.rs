use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::index_table::IndexTable;
use crate::models::IndexEntry;

/// Parsed index tables stored as JSON, keyed by the SHA-256 of the raw
/// index file. The engine never sees this; it always receives a table.
pub struct IndexCache {
    dir: PathBuf,
}

pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

impl IndexCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, checksum: &str) -> PathBuf {
        self.dir.join(format!("index-{checksum}.json"))
    }

    /// Parse `bytes` as an index CSV, reusing a cached parse of identical
    /// bytes when one exists. A corrupt or unwritable cache entry only costs
    /// a re-parse.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<IndexTable> {
        let checksum = compute_checksum(bytes);
        let path = self.entry_path(&checksum);

        if let Ok(content) = std::fs::read_to_string(&path) {
            match serde_json::from_str::<Vec<IndexEntry>>(&content) {
                Ok(entries) if entries.iter().all(IndexEntry::is_valid) => {
                    log::debug!("index cache hit {}", &checksum[..12]);
                    return Ok(IndexTable::from_entries(entries));
                }
                Ok(_) => log::warn!(
                    "ignoring index cache entry {} with invalid periods or values",
                    path.display()
                ),
                Err(e) => log::warn!("ignoring corrupt index cache entry {}: {e}", path.display()),
            }
        }

        let table = IndexTable::from_csv_bytes(bytes)?;
        if let Err(e) = self.store(&path, &table) {
            log::warn!("could not write index cache {}: {e}", path.display());
        }
        Ok(table)
    }

    pub fn load_path(&self, index_path: &Path) -> Result<IndexTable> {
        let bytes = std::fs::read(index_path)?;
        self.load_bytes(&bytes)
    }

    fn store(&self, path: &Path, table: &IndexTable) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let entries: Vec<IndexEntry> = table.entries().collect();
        std::fs::write(path, serde_json::to_string(&entries)?)?;
        Ok(())
    }

    /// Remove every cached table. Returns how many entries were deleted.
    pub fn clear(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_cache_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("index-") && n.ends_with(".json"));
            if is_cache_file {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
