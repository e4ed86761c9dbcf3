//! Read-through cache for the most recently loaded dataset
//!
//! One entry, keyed by source identity:
//! - Files: canonical path, length and modification time
//! - Uploads: file name, length and an FxHash of the contents
//!
//! The worksheet name is part of the key. A lookup with any other key drops
//! the entry and reloads, so editing the file on disk or uploading a new one
//! is always picked up.

use crate::error::DataLoadError;
use crate::storage::{self, Dataset, Source};
use chrono::{DateTime, Utc};
use rustc_hash::FxHasher;
use std::hash::Hasher;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

/// Identity of a loaded source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKey {
    /// File on disk
    File {
        /// Canonicalized path
        path: PathBuf,
        /// Size in bytes
        len: u64,
        /// Last modification time, when the platform reports it
        modified: Option<SystemTime>,
        /// Requested worksheet
        sheet: Option<String>,
    },
    /// In-memory upload
    Upload {
        /// Upload file name
        file_name: String,
        /// Size in bytes
        len: usize,
        /// FxHash of the contents
        content_hash: u64,
        /// Requested worksheet
        sheet: Option<String>,
    },
}

impl SourceKey {
    /// Compute the key for a source
    ///
    /// # Errors
    ///
    /// Returns `DataLoadError::NotFound` if a path source does not exist
    pub fn for_source(source: &Source, sheet: Option<&str>) -> Result<Self, DataLoadError> {
        let sheet = sheet.map(str::to_string);
        match source {
            Source::Path(path) => {
                let not_found = || DataLoadError::NotFound { path: path.clone() };
                let metadata = std::fs::metadata(path).map_err(|_| not_found())?;
                let canonical = path.canonicalize().map_err(|_| not_found())?;
                Ok(Self::File {
                    path: canonical,
                    len: metadata.len(),
                    modified: metadata.modified().ok(),
                    sheet,
                })
            }
            Source::Upload { file_name, bytes } => {
                let mut hasher = FxHasher::default();
                hasher.write(bytes);
                Ok(Self::Upload {
                    file_name: file_name.clone(),
                    len: bytes.len(),
                    content_hash: hasher.finish(),
                    sheet,
                })
            }
        }
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that loaded the source
    pub misses: u64,
}

#[derive(Debug)]
struct CacheEntry {
    key: SourceKey,
    dataset: Arc<Dataset>,
    loaded_at: DateTime<Utc>,
}

/// Single-entry dataset cache
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
    stats: CacheStats,
}

impl DatasetCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `source`, loading it on a miss
    ///
    /// # Errors
    ///
    /// Returns the load error; a failed load leaves the cache empty
    pub fn get_or_load(
        &mut self,
        source: &Source,
        sheet: Option<&str>,
    ) -> Result<Arc<Dataset>, DataLoadError> {
        self.get_or_load_with(source, sheet, storage::load)
    }

    /// Same as [`get_or_load`](Self::get_or_load) with a custom loader
    ///
    /// # Errors
    ///
    /// Returns the key or loader error; a failed load leaves the cache empty
    pub fn get_or_load_with<F>(
        &mut self,
        source: &Source,
        sheet: Option<&str>,
        loader: F,
    ) -> Result<Arc<Dataset>, DataLoadError>
    where
        F: FnOnce(&Source, Option<&str>) -> Result<Dataset, DataLoadError>,
    {
        let key = match SourceKey::for_source(source, sheet) {
            Ok(key) => key,
            Err(e) => {
                self.entry = None;
                return Err(e);
            }
        };

        if let Some(entry) = &self.entry {
            if entry.key == key {
                self.stats.hits += 1;
                tracing::debug!(source = %source, loaded_at = %entry.loaded_at, "dataset cache hit");
                return Ok(Arc::clone(&entry.dataset));
            }
            tracing::debug!(source = %source, "dataset cache stale, reloading");
        }

        self.stats.misses += 1;
        self.entry = None;
        let dataset = Arc::new(loader(source, sheet)?);
        self.entry = Some(CacheEntry {
            key,
            dataset: Arc::clone(&dataset),
            loaded_at: Utc::now(),
        });
        Ok(dataset)
    }

    /// Drop the cached entry
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            tracing::debug!("dataset cache invalidated");
        }
    }

    /// Hit/miss counters since creation
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{DatasetShape, Metric};
    use crate::record::PlayerRecord;
    use std::cell::Cell as Counter;

    fn one_row(_: &Source, _: Option<&str>) -> Result<Dataset, DataLoadError> {
        Ok(Dataset::new(
            vec![PlayerRecord::named("A").with(Metric::Rating, "Gold")],
            DatasetShape::new(vec![Metric::Rating], false),
        ))
    }

    #[test]
    fn test_upload_hit_then_miss_on_new_bytes() {
        let mut cache = DatasetCache::new();
        let first = Source::upload("p.xlsx", b"one".to_vec());
        let loads = Counter::new(0);
        let counting = |s: &Source, sh: Option<&str>| {
            loads.set(loads.get() + 1);
            one_row(s, sh)
        };

        cache.get_or_load_with(&first, None, counting).unwrap();
        cache.get_or_load_with(&first, None, counting).unwrap();
        assert_eq!(loads.get(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });

        let second = Source::upload("p.xlsx", b"two".to_vec());
        cache.get_or_load_with(&second, None, counting).unwrap();
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn test_sheet_is_part_of_key() {
        let source = Source::upload("p.xlsx", b"same".to_vec());
        let a = SourceKey::for_source(&source, Some("a")).unwrap();
        let b = SourceKey::for_source(&source, Some("b")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let mut cache = DatasetCache::new();
        let source = Source::upload("p.xlsx", b"x".to_vec());
        cache.get_or_load_with(&source, None, one_row).unwrap();
        cache.get_or_load_with(&source, None, one_row).unwrap();
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });

        cache.invalidate();
        cache.get_or_load_with(&source, None, one_row).unwrap();
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });
    }

    #[test]
    fn test_failed_load_leaves_cache_empty() {
        let mut cache = DatasetCache::new();
        let source = Source::upload("p.xlsx", b"x".to_vec());
        cache.get_or_load_with(&source, None, one_row).unwrap();

        let other = Source::upload("q.xlsx", b"y".to_vec());
        let err = cache
            .get_or_load_with(&other, None, |_, _| {
                Err(DataLoadError::unreadable("q.xlsx", "corrupt"))
            })
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Unreadable { .. }));

        // The earlier entry is gone too
        cache.get_or_load_with(&source, None, one_row).unwrap();
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 3 });
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let mut cache = DatasetCache::new();
        let err = cache
            .get_or_load(&Source::path("/nonexistent/players.xlsx"), None)
            .unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound { .. }));
    }

    #[test]
    fn test_file_key_tracks_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.xlsx");
        std::fs::write(&path, b"short").unwrap();
        let before = SourceKey::for_source(&Source::path(&path), None).unwrap();
        std::fs::write(&path, b"a longer body").unwrap();
        let after = SourceKey::for_source(&Source::path(&path), None).unwrap();
        assert_ne!(before, after);
    }
}
