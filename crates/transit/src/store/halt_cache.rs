//! In-memory cache of halt collections, keyed on file path and modification
//! time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::models::{Halt, Result, TransitError};
use crate::spatial::index::HaltIndex;
use crate::store::{read_halts, write_halts};

struct CacheEntry {
    modified: SystemTime,
    index: Arc<HaltIndex>,
}

/// Loaded halt files, reloaded whenever the file on disk changes.
///
/// A missing file reads as an empty collection and is not cached.
#[derive(Default)]
pub struct HaltCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl HaltCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// All halts in the file, in file order.
    pub fn list_all(&mut self, path: &Path) -> Result<Vec<Halt>> {
        Ok(self.index(path)?.halts().to_vec())
    }

    /// Spatial index over the halts in the file.
    pub fn index(&mut self, path: &Path) -> Result<Arc<HaltIndex>> {
        let Some(modified) = modified_time(path)? else {
            self.entries.remove(path);
            return Ok(Arc::new(HaltIndex::new(Vec::new())));
        };

        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified {
                return Ok(entry.index.clone());
            }
            debug!("{} changed on disk, reloading", path.display());
        }

        let index = Arc::new(HaltIndex::new(read_halts(path)?));
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                index: index.clone(),
            },
        );
        Ok(index)
    }

    /// Write through to disk and drop the cached entry.
    pub fn write(&mut self, path: &Path, halts: &[Halt]) -> Result<()> {
        self.invalidate(path);
        write_halts(path, halts)
    }

    /// Returns true if an entry was dropped.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }
}

fn modified_time(path: &Path) -> Result<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some).map_err(|source| TransitError::Io {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(TransitError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatLng;
    use crate::store::test_util::temp_dir;
    use std::time::Duration;

    fn touch(path: &Path, offset_secs: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(offset_secs))
            .unwrap();
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = temp_dir("cache-missing");
        let mut cache = HaltCache::new();
        let path = dir.join("halts.json");

        assert!(cache.list_all(&path).unwrap().is_empty());
        assert!(!cache.is_cached(&path));
    }

    #[test]
    fn test_reuses_entry_until_file_changes() {
        let dir = temp_dir("cache-reload");
        let path = dir.join("halts.json");
        write_halts(&path, &[Halt::new("Pettah", LatLng::new(6.9344, 79.8428))]).unwrap();

        let mut cache = HaltCache::new();
        let first = cache.index(&path).unwrap();
        let second = cache.index(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // Someone else rewrites the file
        write_halts(
            &path,
            &[
                Halt::new("Pettah", LatLng::new(6.9344, 79.8428)),
                Halt::new("Borella", LatLng::new(6.9147, 79.8778)),
            ],
        )
        .unwrap();
        touch(&path, 10);

        let third = cache.index(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn test_write_and_manual_invalidation() {
        let dir = temp_dir("cache-write");
        let path = dir.join("halts.json");
        let mut cache = HaltCache::new();

        cache
            .write(&path, &[Halt::new("Kottawa", LatLng::new(6.8412, 79.9654))])
            .unwrap();
        assert_eq!(cache.list_all(&path).unwrap().len(), 1);
        assert!(cache.is_cached(&path));

        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));

        cache.list_all(&path).unwrap();
        cache.clear();
        assert!(!cache.is_cached(&path));
    }
}
