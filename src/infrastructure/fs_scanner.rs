// SPDX-License-Identifier: MPL-2.0
//! Filesystem media enumerator.
//!
//! Lists the supported images and videos directly inside a directory (no
//! recursion), sorted by the configured order and capped at a maximum count.

use crate::application::port::MediaEnumerator;
use crate::config::{SortOrder, MAX_MEDIA_FILES};
use crate::domain::media::{MediaEntry, MediaKind};
use crate::error::Result;
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy)]
pub struct FsScanner {
    sort_order: SortOrder,
    max_files: usize,
}

impl Default for FsScanner {
    fn default() -> Self {
        Self::new(SortOrder::default(), MAX_MEDIA_FILES)
    }
}

impl FsScanner {
    #[must_use]
    pub fn new(sort_order: SortOrder, max_files: usize) -> Self {
        Self {
            sort_order,
            max_files,
        }
    }
}

impl MediaEnumerator for FsScanner {
    fn scan(&self, dir: &Path) -> Result<Vec<MediaEntry>> {
        let mut entries = Vec::new();

        for dir_entry in std::fs::read_dir(dir)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if is_hidden(&path) || MediaKind::from_path(&path) == MediaKind::Unknown {
                continue;
            }

            // Entries that vanish mid-scan are skipped.
            let Ok(metadata) = dir_entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push(MediaEntry::new(path, metadata.len(), modified));
        }

        sort_entries(&mut entries, self.sort_order);
        if entries.len() > self.max_files {
            log::warn!(
                "{} holds {} media files, keeping the first {}",
                dir.display(),
                entries.len(),
                self.max_files
            );
            entries.truncate(self.max_files);
        }
        log::debug!("Scanned {}: {} entries", dir.display(), entries.len());
        Ok(entries)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn sort_entries(entries: &mut [MediaEntry], sort_order: SortOrder) {
    match sort_order {
        SortOrder::Name => {
            entries.sort_by_cached_key(|e| e.name().to_lowercase());
        }
        SortOrder::Modified => {
            entries.sort_by(|a, b| {
                a.modified()
                    .cmp(&b.modified())
                    .then_with(|| a.name().cmp(b.name()))
            });
        }
        SortOrder::Size => {
            entries.sort_by(|a, b| a.size().cmp(&b.size()).then_with(|| a.name().cmp(b.name())));
        }
    }
}
