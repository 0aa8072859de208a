//! Progress and result signals emitted by the core.
//!
//! The core never prints. It calls into a [`Report`] implementation supplied
//! by the caller; the CLI supplies a console one (see
//! [`crate::commands::Console`]).

use std::path::{Path, PathBuf};

/// Running totals while an archive is being written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Files appended so far.
    pub files_added: usize,
    /// Files selected for the archive.
    pub files_selected: usize,
    /// Bytes appended so far.
    pub bytes_added: u64,
    /// Bytes selected for the archive.
    pub bytes_selected: u64,
}

/// Outcome of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub collection: String,
    pub archive: PathBuf,
    pub files_resolved: usize,
    pub files_added: usize,
    pub files_ignored: usize,
    pub bytes_selected: u64,
    pub bytes_added: u64,
    /// Size of the finished archive on disk.
    pub archive_size: u64,
}

/// Observer for the backup pipeline. Every method defaults to doing nothing.
#[allow(unused_variables)]
pub trait Report {
    fn manifest(&mut self, path: &Path) {}

    fn collection(&mut self, name: &str) {}

    /// Called once the destination is known, before files are resolved.
    fn destination(&mut self, dir: &Path, archive: &Path) {}

    fn resolving(&mut self) {}

    /// An item pattern or expanded path was excluded.
    fn ignored(&mut self, path: &str) {}

    /// Called before `path` is appended.
    fn adding(&mut self, path: &Path, progress: &Progress) {}

    /// Called after each successful append.
    fn added(&mut self, path: &Path, progress: &Progress) {}

    fn finished(&mut self, summary: &Summary) {}

    fn done(&mut self) {}
}

/// A [`Report`] that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Report for Silent {}
