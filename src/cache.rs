use color_eyre::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::loader::{load_orders, LoadOptions};
use crate::table::OrderTable;

/// Registry of known cache files
const CACHE_FILES: &[&str] = &["orderdash.log"];

/// Manages cache directory and cache file operations
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) cache_dir: PathBuf,
}

impl CacheManager {
    /// Create a CacheManager with a custom cache directory (primarily for testing)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Create a new CacheManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine cache directory"))?
            .join(app_name);

        Ok(Self { cache_dir })
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get path to a specific cache file
    pub fn cache_file(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    /// Ensure the cache directory exists
    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Clear all registered cache files
    pub fn clear_all(&self) -> Result<()> {
        for filename in CACHE_FILES {
            let file_path = self.cache_file(filename);
            if file_path.exists() {
                if let Err(e) = fs::remove_file(&file_path) {
                    eprintln!("Warning: Could not remove cache file {}: {}", filename, e);
                }
            }
        }

        Ok(())
    }
}

/// In-memory memo of loaded datasets, keyed by resolved path.
///
/// A path is read at most once until its entry is invalidated; later changes to the file are not
/// picked up on their own.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<OrderTable>>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached table for `path`, loading it on first use.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> crate::error::Result<Arc<OrderTable>> {
        if let Some(table) = self.entries.get(path) {
            tracing::trace!(path = %path.display(), "dataset cache hit");
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_orders(path, options)?);
        self.loads += 1;
        self.entries.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    pub fn get(&self, path: &Path) -> Option<Arc<OrderTable>> {
        self.entries.get(path).cloned()
    }

    /// Drop the entry for `path` so the next lookup reads the file again.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let removed = self.entries.remove(path).is_some();
        if removed {
            tracing::info!(path = %path.display(), "dataset cache entry invalidated");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of file reads performed so far.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "주문번호,주문일,셀러명,품종,주문경로,광역지역(정식),재구매 횟수,회원구분,실결제 금액\n\
                       1,2024-03-01 10:00:00,A,감귤,web,서울특별시,0,회원,1000\n";

    #[test]
    fn test_loads_once_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, CSV).unwrap();
        let options = LoadOptions::default();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path, &options).unwrap();
        let second = cache.get_or_load(&path, &options).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.loads(), 1);

        // File changes are invisible until the entry is invalidated
        fs::write(&path, format!("{CSV}2,2024-03-02 10:00:00,B,감귤,web,서울특별시,1,회원,2000\n"))
            .unwrap();
        assert_eq!(cache.get_or_load(&path, &options).unwrap().height(), 1);

        assert!(cache.invalidate(&path));
        assert_eq!(cache.get_or_load(&path, &options).unwrap().height(), 2);
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();
        let mut cache = DatasetCache::new();
        assert!(cache.get_or_load(&path, &LoadOptions::default()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_all_removes_log() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CacheManager::with_dir(dir.path().to_path_buf());
        let log = manager.cache_file("orderdash.log");
        fs::write(&log, "x").unwrap();
        manager.clear_all().unwrap();
        assert!(!log.exists());
    }
}
