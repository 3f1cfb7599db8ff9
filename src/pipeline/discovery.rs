use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use log::{debug, info};
use rayon::prelude::*;
use crate::media::index::CandidateIndex;
use crate::media::matcher::PairMatcher;
use crate::media::scanner::MediaScanner;
use crate::utils::parallel::ParallelProcessor;
use crate::{MediaFile, Pair, Result};

/// Log a progress line after this many media files.
pub const DISCOVERY_PROGRESS_EVERY: usize = 500;

#[derive(Debug)]
pub struct DiscoveryResult {
    /// In completion order.
    pub pairs: Vec<Pair>,
    pub scanned: usize,
    pub elapsed: Duration,
}

/// Fans scanned media files out over an I/O-sized pool and matches each
/// against its directory's sidecar records.
///
/// Owns its own candidate cache, so separate instances never share state.
pub struct PairDiscovery {
    index: CandidateIndex,
    pool: rayon::ThreadPool,
}

impl ParallelProcessor for PairDiscovery {}

impl PairDiscovery {
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self {
            index: CandidateIndex::new(),
            pool: Self::build_thread_pool(workers, "pairing")?,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn match_one(&self, media: MediaFile) -> Option<Pair> {
        let candidates = self.index.candidates_for(media.directory());
        let (record, tier) = PairMatcher::find(&media, &candidates)?;
        debug!("Paired {} -> {} ({})", media.file_name(), record.stem, tier.as_str());
        Some(Pair {
            metadata: record.clone(),
            tier,
            media,
        })
    }

    /// Scans `root` and pairs every media file found. Once `cancel` is set the
    /// walk stops and files already pulled from it are counted but not paired.
    pub fn discover(&self, scanner: &MediaScanner, root: &Path, cancel: &AtomicBool) -> DiscoveryResult {
        info!("Finding media+JSON pairs with {} workers...", self.workers());
        let started = Instant::now();
        let progress = Self::get_progress_counter();

        let pairs: Vec<Pair> = self.pool.install(|| {
            scanner
                .scan(root)
                .take_while(|_| !cancel.load(Ordering::SeqCst))
                .par_bridge()
                .filter_map(|media| {
                    let pair = if cancel.load(Ordering::SeqCst) {
                        None
                    } else {
                        self.match_one(media)
                    };

                    let processed = progress.fetch_add(1, Ordering::SeqCst) + 1;
                    if processed % DISCOVERY_PROGRESS_EVERY == 0 {
                        info!("Processed {} files for JSON matching", processed);
                    }
                    pair
                })
                .collect()
        });

        let scanned = progress.into_inner();
        let elapsed = started.elapsed();
        info!(
            "Found {} pairs among {} media files in {:.1} seconds",
            pairs.len(),
            scanned,
            elapsed.as_secs_f64()
        );

        DiscoveryResult { pairs, scanned, elapsed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchTier;
    use pretty_assertions::assert_eq;
    use std::fs::{self, File};

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    #[test]
    fn pairs_across_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("2019/IMG_0001.JPG"));
        touch(&root.join("2019/IMG_0001.JSON"));
        touch(&root.join("2020/VeryLongUniqueIdentifierABCDEFG.heic"));
        touch(&root.join("2020/VeryLongUniqueIdentifie.json"));
        touch(&root.join("2020/random.jpg"));

        let scanner = MediaScanner::new(&["jpg", "heic"]);
        let discovery = PairDiscovery::new(4).unwrap();
        let result = discovery.discover(&scanner, root, &AtomicBool::new(false));

        assert_eq!(result.scanned, 3);
        let mut found: Vec<(String, MatchTier)> = result
            .pairs
            .iter()
            .map(|p| (p.media.file_name(), p.tier))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            found,
            vec![
                ("IMG_0001.JPG".to_string(), MatchTier::Forward),
                ("VeryLongUniqueIdentifierABCDEFG.heic".to_string(), MatchTier::Reverse),
            ]
        );
    }

    #[test]
    fn burst_siblings_share_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("IMG_20200101_BURST001.jpg"));
        touch(&root.join("IMG_20200101_BURST002.jpg"));
        touch(&root.join("IMG_20200101_BU.json"));

        let scanner = MediaScanner::new(&["jpg"]);
        let discovery = PairDiscovery::new(2).unwrap();
        let result = discovery.discover(&scanner, root, &AtomicBool::new(false));

        assert_eq!(result.pairs.len(), 2);
        assert!(result.pairs.iter().all(|p| p.metadata.stem == "IMG_20200101_BU"));
    }

    #[test]
    fn cancelled_discovery_stops_walking() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..50 {
            touch(&dir.path().join(format!("album{}/IMG_{:04}.jpg", i % 5, i)));
            touch(&dir.path().join(format!("album{}/IMG_{:04}.jpg.json", i % 5, i)));
        }

        let scanner = MediaScanner::new(&["jpg"]);
        let discovery = PairDiscovery::new(2).unwrap();
        let result = discovery.discover(&scanner, dir.path(), &AtomicBool::new(true));
        assert_eq!(result.scanned, 0);
        assert!(result.pairs.is_empty());
        assert_eq!(discovery.index.cached_dirs(), 0);
    }
}
