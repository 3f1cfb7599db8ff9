use std::path::Path;
use log::warn;
use walkdir::{DirEntry, WalkDir};
use crate::MediaFile;

/// Walks an export tree yielding the media files worth pairing.
pub struct MediaScanner {
    extensions: Vec<String>,
}

impl MediaScanner {
    /// `extensions` are matched case-insensitively, without the dot.
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Lazily walks `root`. Calling it again rescans from scratch.
    pub fn scan<'a>(&'a self, root: &Path) -> impl Iterator<Item = MediaFile> + 'a {
        WalkDir::new(root)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Error accessing entry: {}", err);
                    None
                }
            })
            .filter(move |e| self.is_media(e))
            .map(|e| MediaFile::from_path(e.into_path()))
    }

    fn is_media(&self, entry: &DirEntry) -> bool {
        // Follows symlinks, so linked media files are kept
        if !entry.path().is_file() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            return false;
        }
        let lower = name.to_lowercase();
        if lower.contains("json") || lower.contains("metadata") {
            return false;
        }
        entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map_or(false, |ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }
}
