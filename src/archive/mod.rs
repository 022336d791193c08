//! Persistence gateway for canvas snapshots.
//!
//! The core only needs the [`SnapshotStore`] contract: push labeled bytes,
//! and fetch the most recent bytes for a label by scanning the last few
//! stored items. [`DirStore`] is the shipped reference implementation,
//! archiving snapshots as timestamped files in a directory.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// How many of the most recent stored items a restore scans for the
/// matching label.
pub const DEFAULT_SCAN_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive io error: {0}")]
    Io(#[from] io::Error),
    #[error("system clock is before the unix epoch")]
    ClockSkew,
}

pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Labeled blob store for snapshots.
///
/// `push` is called from the backup worker and must never block the
/// drawing path; `fetch_latest` is called once at startup. Lookup
/// discipline: scan the most recent items (newest first, bounded by the
/// store's scan limit) and return the first whose label matches.
pub trait SnapshotStore {
    /// Stores `bytes` under `label`, returning an opaque handle for logs.
    fn push(&self, label: &str, bytes: &[u8]) -> ArchiveResult<String>;

    /// Returns the most recent blob stored under `label`, or `None` when
    /// no recent item carries the label.
    fn fetch_latest(&self, label: &str) -> ArchiveResult<Option<Vec<u8>>>;
}

/// Directory-backed [`SnapshotStore`].
///
/// Each pushed blob becomes `<nanos>-<label>` inside the archive
/// directory; the zero-padded timestamp prefix makes lexicographic order
/// chronological.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
    scan_limit: usize,
}

impl DirStore {
    pub fn create(dir: PathBuf, scan_limit: usize) -> ArchiveResult<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, scan_limit })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn entry_name(label: &str) -> ArchiveResult<String> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ArchiveError::ClockSkew)?
            .as_nanos();
        Ok(format!("{nanos:024}-{label}"))
    }

    /// File names in the archive, newest first.
    fn stored_names(&self) -> ArchiveResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }
}

impl SnapshotStore for DirStore {
    fn push(&self, label: &str, bytes: &[u8]) -> ArchiveResult<String> {
        let name = Self::entry_name(label)?;
        fs::write(self.dir.join(&name), bytes)?;
        tracing::debug!(name = %name, size = bytes.len(), "archived snapshot");
        Ok(name)
    }

    fn fetch_latest(&self, label: &str) -> ArchiveResult<Option<Vec<u8>>> {
        let suffix = format!("-{label}");
        for name in self.stored_names()?.into_iter().take(self.scan_limit) {
            if name.ends_with(&suffix) {
                return Ok(Some(fs::read(self.dir.join(&name))?));
            }
        }
        Ok(None)
    }
}
