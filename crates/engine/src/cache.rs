use crate::error::Result;
use crate::table::ReferenceTable;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

struct CacheEntry {
    modified: Option<SystemTime>,
    table: Arc<ReferenceTable>,
}

/// Loaded tables keyed by path. An entry is served only while the file's
/// modification time is unchanged; snapshots are never mutated once published.
#[derive(Default)]
pub struct TableCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl TableCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table and whether it came from the cache.
    pub fn get_or_load(&self, path: &Path) -> Result<(Arc<ReferenceTable>, bool)> {
        let modified = modified_time(path);
        {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(path) {
                if modified.is_some() && entry.modified == modified {
                    log::debug!("Table cache hit: {}", path.display());
                    return Ok((Arc::clone(&entry.table), true));
                }
            }
        }

        log::debug!("Table cache miss: {}", path.display());
        let table = Arc::new(ReferenceTable::load(path)?);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.to_path_buf(),
                CacheEntry {
                    modified,
                    table: Arc::clone(&table),
                },
            );
        Ok((table, false))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn second_load_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_time.csv");
        fs::write(&path, "event,answer\nMoon landing,1969-07-20\n").unwrap();

        let cache = TableCache::new();
        let (first, hit) = cache.get_or_load(&path).unwrap();
        assert!(!hit);
        let (second, hit) = cache.get_or_load(&path).unwrap();
        assert!(hit);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_time.csv");
        fs::write(&path, "event,answer\nMoon landing,1969-07-20\n").unwrap();

        let cache = TableCache::new();
        let (first, _) = cache.get_or_load(&path).unwrap();
        assert_eq!(first.len(), 1);

        fs::write(
            &path,
            "event,answer\nMoon landing,1969-07-20\nFall of the Berlin Wall,1989-11-09\n",
        )
        .unwrap();
        let later = SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        let (second, hit) = cache.get_or_load(&path).unwrap();
        assert!(!hit);
        assert_eq!(second.len(), 2);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new();
        assert!(cache.get_or_load(&dir.path().join("missing.csv")).is_err());
        assert!(cache.is_empty());
    }
}
