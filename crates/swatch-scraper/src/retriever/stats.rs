use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Outcome counters for one retriever. `total` is always
/// `downloaded + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrievalStats {
    pub downloaded: u64,
    pub failed: u64,
    pub total: u64,
}

/// Mutable run state shared by every in-flight fetch. Always accessed under
/// one lock so counter updates and history inserts land together.
#[derive(Debug, Default)]
pub(super) struct RetrievalState {
    /// Reference to the path it was saved to (or found at) during this run.
    history: HashMap<String, PathBuf>,
    /// Paths handed out to fetches in this run, in flight or finished.
    claimed: HashSet<PathBuf>,
    downloaded: u64,
    failed: u64,
}

impl RetrievalState {
    pub(super) fn cached(&self, reference: &str) -> Option<PathBuf> {
        self.history.get(reference).cloned()
    }

    pub(super) fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.contains(path)
    }

    pub(super) fn claim(&mut self, path: PathBuf) {
        self.claimed.insert(path);
    }

    /// Records a file that was already on disk before this run.
    pub(super) fn record_existing(&mut self, reference: &str, path: PathBuf) {
        self.history.insert(reference.to_owned(), path);
    }

    pub(super) fn record_success(&mut self, reference: &str, path: PathBuf) {
        self.downloaded += 1;
        self.history.insert(reference.to_owned(), path);
    }

    /// Counts a failure and frees the claimed path, if any.
    pub(super) fn record_failure(&mut self, path: Option<&Path>) {
        self.failed += 1;
        if let Some(path) = path {
            self.claimed.remove(path);
        }
    }

    pub(super) fn stats(&self) -> RetrievalStats {
        RetrievalStats {
            downloaded: self.downloaded,
            failed: self.failed,
            total: self.downloaded + self.failed,
        }
    }

    pub(super) fn reset_counters(&mut self) {
        self.downloaded = 0;
        self.failed = 0;
    }
}
