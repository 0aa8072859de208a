//! Error taxonomy for colbak.
//!
//! Every variant except [`Error::Internal`] is an expected, user-correctable
//! failure: a missing or malformed manifest, an unknown or incomplete
//! collection, or an archive that cannot be written. Internal errors keep
//! their full `anyhow` context chain so they can be reported in detail.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Unified result type for all fallible operations in colbak.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The manifest path does not exist.
    #[error("Manifest file does not exist - {}", .0.display())]
    ManifestNotFound(PathBuf),

    /// The manifest is not a well-formed document.
    #[error("Invalid manifest {} - {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The manifest has no top-level `collections` mapping.
    #[error("Invalid manifest - missing collections")]
    ManifestMissingCollections,

    /// A requested collection is not declared in the manifest.
    #[error("Unknown collection {0}")]
    UnknownCollection(String),

    /// A collection is missing a required field or names an unknown compression.
    #[error("Invalid manifest - collection {name} {reason}")]
    InvalidCollection { name: String, reason: String },

    /// The archive (or its directory) could not be created.
    #[error("Cannot create archive {} - {source}", .path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be appended, or the archive could not be finalised.
    #[error("Failed to write {} to archive {} - {source}", .entry.display(), .archive.display())]
    ArchiveWrite {
        entry: PathBuf,
        archive: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive trailer or compressed stream could not be written.
    #[error("Failed to finalise archive {} - {source}", .archive.display())]
    ArchiveFinish {
        archive: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Anything else. Not masked: the whole context chain is preserved.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn invalid_collection(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidCollection {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true for the recognised, user-facing kinds.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Error::Internal(_))
    }
}
