use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use log::{debug, warn};
use crate::MetadataRecord;

/// Per-directory cache of sidecar JSON records.
///
/// Each directory is listed once, the first time any media file in it asks
/// for candidates. Two threads racing on the same directory may both list it;
/// the first insert wins, the other listing is dropped and both callers get
/// the winning pool.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    dirs: RwLock<HashMap<PathBuf, Arc<[MetadataRecord]>>>,
}

impl CandidateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates_for(&self, dir: &Path) -> Arc<[MetadataRecord]> {
        if let Ok(dirs) = self.dirs.read() {
            if let Some(pool) = dirs.get(dir) {
                return Arc::clone(pool);
            }
        }

        let listed: Arc<[MetadataRecord]> = Self::list_records(dir).into();

        match self.dirs.write() {
            Ok(mut dirs) => Arc::clone(dirs.entry(dir.to_path_buf()).or_insert(listed)),
            // A poisoned cache still leaves us a valid listing for this call
            Err(_) => listed,
        }
    }

    pub fn cached_dirs(&self) -> usize {
        self.dirs.read().map(|dirs| dirs.len()).unwrap_or(0)
    }

    /// Non-recursive listing of `*.json` files, in directory order.
    fn list_records(dir: &Path) -> Vec<MetadataRecord> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let records: Vec<MetadataRecord> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
            })
            .map(MetadataRecord::from_path)
            .collect();

        debug!("Indexed {} JSON records in {}", records.len(), dir.display());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn lists_only_json_files_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("IMG_0001.jpg")).unwrap();
        File::create(dir.path().join("IMG_0001.jpg.json")).unwrap();
        File::create(dir.path().join("album.JSON")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        File::create(dir.path().join("nested").join("deep.json")).unwrap();

        let index = CandidateIndex::new();
        let mut stems: Vec<_> = index
            .candidates_for(dir.path())
            .iter()
            .map(|r| r.stem.clone())
            .collect();
        stems.sort();
        assert_eq!(stems, vec!["IMG_0001.jpg".to_string(), "album".to_string()]);
    }

    #[test]
    fn listing_is_cached_for_the_run() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.json")).unwrap();

        let index = CandidateIndex::new();
        let first = index.candidates_for(dir.path());
        File::create(dir.path().join("b.json")).unwrap();
        let second = index.candidates_for(dir.path());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
        assert_eq!(index.cached_dirs(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_records_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let store = tempfile::tempdir().unwrap();
        let target = store.path().join("IMG_0001.jpg.json");
        File::create(&target).unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("IMG_0001.jpg.json")).unwrap();

        let index = CandidateIndex::new();
        let pool = index.candidates_for(dir.path());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].stem, "IMG_0001.jpg");
    }

    #[test]
    fn racing_first_lookups_share_one_pool() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "b.json", "c.json"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let index = CandidateIndex::new();
        let barrier = std::sync::Barrier::new(8);

        let pools: Vec<Arc<[MetadataRecord]>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        index.candidates_for(dir.path())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let cached = index.candidates_for(dir.path());
        assert_eq!(index.cached_dirs(), 1);
        assert_eq!(cached.len(), 3);
        assert!(pools.iter().all(|p| Arc::ptr_eq(p, &cached)));
    }

    #[test]
    fn missing_directory_gives_empty_pool() {
        let dir = tempfile::tempdir().unwrap();
        let index = CandidateIndex::new();
        assert!(index.candidates_for(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn separate_indexes_do_not_share_state() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.json")).unwrap();

        let first = CandidateIndex::new();
        assert_eq!(first.candidates_for(dir.path()).len(), 1);

        File::create(dir.path().join("b.json")).unwrap();
        let second = CandidateIndex::new();
        assert_eq!(second.candidates_for(dir.path()).len(), 2);
    }
}
