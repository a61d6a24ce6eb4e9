use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::scan::filters::{looks_binary, ExcludeSet};
use crate::types::FileRecord;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scan root is missing or unreadable: {path}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid exclusion pattern: {0}")]
    InvalidPattern(#[from] globset::Error),
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Files larger than this are recorded as skipped, not read.
    pub max_file_size: u64,
    /// Glob patterns excluded on top of the fixed default directory list.
    pub exclude_patterns: Vec<String>,
    /// Content-read worker count. Tens, not hundreds.
    pub workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1_048_576,
            exclude_patterns: Vec::new(),
            workers: 8,
        }
    }
}

/// Outcome of one tree walk. `files` holds only records whose content was
/// read as text, in lexical path order; everything else is accounted for in
/// the counters.
#[derive(Debug)]
pub struct ScanOutcome {
    pub files: Vec<FileRecord>,
    /// Files that passed the walk filters, including ones later dropped as
    /// binary, unreadable, or unread before the deadline.
    pub discovered: usize,
    pub skipped_oversize: usize,
    pub skipped_binary: usize,
    pub read_errors: usize,
    /// Set when the deadline expired or any per-file read failed.
    pub partial: bool,
}

/// Walks a working tree and produces [`FileRecord`]s.
///
/// The walk itself is single-threaded and deterministic (lexical entry
/// order, symlinks not followed); content reading fans out over a bounded
/// worker pool and re-sorts by path afterwards, so the outcome order is
/// reproducible regardless of worker interleaving.
pub struct Scanner {
    root: PathBuf,
    config: ScanConfig,
}

enum ReadOutcome {
    Text(String),
    Binary,
    Failed,
}

impl Scanner {
    pub fn new(root: impl AsRef<Path>, config: ScanConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    pub fn scan(
        &self,
        max_depth: usize,
        deadline: Option<Instant>,
    ) -> Result<ScanOutcome, ScanError> {
        // Root readability is the one fatal condition.
        std::fs::read_dir(&self.root).map_err(|source| ScanError::RootUnreadable {
            path: self.root.clone(),
            source,
        })?;

        let excludes = ExcludeSet::new(&self.config.exclude_patterns)?;
        let mut skipped_oversize = 0usize;
        let mut candidates: Vec<(PathBuf, FileRecord)> = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .max_depth(max_depth.max(1))
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !excludes.is_excluded_dir(&name)
            });

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let rel = path.strip_prefix(&self.root).unwrap_or(path);
            if excludes.is_excluded_file(rel) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size > self.config.max_file_size {
                debug!(
                    "skipping large file {} ({} bytes > {})",
                    path.display(),
                    size,
                    self.config.max_file_size
                );
                skipped_oversize += 1;
                continue;
            }

            match FileRecord::new(&self.root, path, size) {
                Ok(record) => candidates.push((path.to_path_buf(), record)),
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }

        let discovered = candidates.len();
        let outcome = self.read_contents(candidates, deadline);

        info!(
            "scanned {}: {} files ({} oversize, {} binary, {} unreadable{})",
            self.root.display(),
            outcome.files.len(),
            outcome.skipped_oversize + skipped_oversize,
            outcome.skipped_binary,
            outcome.read_errors,
            if outcome.partial { ", partial" } else { "" },
        );

        Ok(ScanOutcome {
            skipped_oversize: outcome.skipped_oversize + skipped_oversize,
            discovered,
            ..outcome
        })
    }

    /// Read file contents with a bounded worker pool. Workers pull indices
    /// from a shared cursor; each worker owns its reads exclusively and the
    /// result vector is re-sorted by path after the join.
    fn read_contents(
        &self,
        candidates: Vec<(PathBuf, FileRecord)>,
        deadline: Option<Instant>,
    ) -> ScanOutcome {
        let total = candidates.len();
        let workers = self.config.workers.clamp(1, total.max(1));

        let cursor = AtomicUsize::new(0);
        let timed_out = AtomicBool::new(false);
        let results: Mutex<Vec<(usize, ReadOutcome)>> = Mutex::new(Vec::with_capacity(total));

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let idx = cursor.fetch_add(1, Ordering::Relaxed);
                    if idx >= total {
                        break;
                    }
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        timed_out.store(true, Ordering::Relaxed);
                        break;
                    }

                    let (path, _) = &candidates[idx];
                    let outcome = match std::fs::read(path) {
                        Ok(bytes) if looks_binary(&bytes) => ReadOutcome::Binary,
                        Ok(bytes) => {
                            ReadOutcome::Text(String::from_utf8_lossy(&bytes).into_owned())
                        }
                        Err(e) => {
                            warn!("could not read {}: {e}", path.display());
                            ReadOutcome::Failed
                        }
                    };
                    results.lock().expect("scan results lock").push((idx, outcome));
                });
            }
        });

        let mut skipped_binary = 0usize;
        let mut read_errors = 0usize;

        let mut by_index = results.into_inner().expect("scan results lock");
        by_index.sort_by_key(|(idx, _)| *idx);

        let mut candidates: Vec<Option<FileRecord>> =
            candidates.into_iter().map(|(_, r)| Some(r)).collect();
        let mut files = Vec::with_capacity(by_index.len());
        for (idx, outcome) in by_index {
            match outcome {
                ReadOutcome::Text(content) => {
                    if let Some(mut record) = candidates[idx].take() {
                        record.content = Some(content);
                        files.push(record);
                    }
                }
                ReadOutcome::Binary => skipped_binary += 1,
                ReadOutcome::Failed => read_errors += 1,
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        let partial = timed_out.load(Ordering::Relaxed) || read_errors > 0;

        ScanOutcome {
            files,
            discovered: total,
            skipped_oversize: 0,
            skipped_binary,
            read_errors,
            partial,
        }
    }
}
