//! Collection validation and file resolution.
//!
//! A collection is validated only when it is about to be processed. Its item
//! patterns are then expanded against the filesystem and filtered through the
//! merged ignore set, producing the ordered list of files to archive.

use crate::ignore::{self, IgnoreSet};
use crate::manifest::{Compression, Manifest};
use crate::report::Report;
use crate::vars::RuntimeVars;
use crate::{Error, Result, file_util};
use anyhow::Context;
use glob::MatchOptions;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Shell-style expansion: wildcards stay within one component and skip
/// hidden names.
const EXPAND_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A validated collection with every placeholder substituted.
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: String,
    /// Item patterns in manifest order.
    pub items: Vec<String>,
    /// Directory the archive is written to: the target joined with the name.
    pub destination: PathBuf,
    pub compression: Compression,
    /// Global and collection patterns, merged.
    pub ignore: IgnoreSet,
}

/// A file selected for archiving, sized when it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// The files of one collection, in archive order.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub files: Vec<FileEntry>,
    /// Item patterns and expanded paths that were excluded.
    pub ignored: usize,
    /// Sum of the selected file sizes.
    pub selected_size: u64,
}

impl Resolution {
    pub fn files_selected(&self) -> usize {
        self.files.len()
    }
}

impl Collection {
    /// Validates the named collection and substitutes its placeholders.
    ///
    /// # Errors
    /// [`Error::ManifestMissingCollections`], [`Error::UnknownCollection`], or
    /// [`Error::InvalidCollection`] when `items`, `target` or `compress` is
    /// missing or the compression is not recognised.
    pub fn from_manifest(manifest: &Manifest, name: &str, vars: &RuntimeVars) -> Result<Self> {
        let spec = manifest.collection(name)?;

        let items = spec
            .items
            .as_ref()
            .ok_or_else(|| Error::invalid_collection(name, "has no items"))?;
        let target = spec
            .target
            .as_ref()
            .ok_or_else(|| Error::invalid_collection(name, "has no target"))?;
        let compress = spec
            .compress
            .as_ref()
            .ok_or_else(|| Error::invalid_collection(name, "has no compression preference"))?;
        let compression = compress
            .parse::<Compression>()
            .map_err(|reason| Error::invalid_collection(name, reason))?;

        let patterns: BTreeSet<&String> = manifest
            .global_ignore()
            .iter()
            .chain(spec.ignore.iter().flatten())
            .collect();
        let ignore = IgnoreSet::new(patterns.into_iter().map(|p| vars.substitute(p)));
        tracing::debug!("collection {name}: {} ignore patterns", ignore.len());

        Ok(Collection {
            name: name.to_string(),
            items: items.iter().map(|item| vars.substitute(item)).collect(),
            destination: PathBuf::from(vars.substitute(target)).join(name),
            compression,
            ignore,
        })
    }

    /// Expands the item patterns into the concrete list of files.
    ///
    /// Patterns follow shell rules: `**` as a whole component spans
    /// directories, any other run of stars is a single `*`, and an unclosed
    /// `[` is literal.
    ///
    /// An item pattern that itself matches the ignore set is skipped without
    /// being expanded. Directories and broken links are dropped silently;
    /// expanded paths matching the ignore set are counted as ignored. A file
    /// reachable through several patterns is listed once per pattern.
    pub fn resolve(&self, report: &mut dyn Report) -> Result<Resolution> {
        let mut resolution = Resolution::default();

        for item in &self.items {
            if self.ignore.is_match(item) {
                resolution.ignored += 1;
                report.ignored(item);
                continue;
            }

            let paths = glob::glob_with(&ignore::to_glob(item, true), EXPAND_OPTIONS).map_err(|e| {
                Error::invalid_collection(&self.name, format!("has invalid item {item:?}: {e}"))
            })?;

            for entry in paths {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        tracing::warn!("skipping unreadable entry: {e}");
                        continue;
                    }
                };
                if path.is_dir() {
                    continue;
                }
                if file_util::is_broken_link(&path) {
                    tracing::debug!("skipping broken link {}", path.display());
                    continue;
                }
                let name = path.to_string_lossy();
                if self.ignore.is_match(&name) {
                    resolution.ignored += 1;
                    report.ignored(&name);
                    continue;
                }

                let size = fs::metadata(&path)
                    .with_context(|| format!("Unable to read metadata of {}", path.display()))?
                    .len();
                resolution.selected_size += size;
                resolution.files.push(FileEntry { path, size });
            }
        }

        tracing::debug!(
            "collection {}: {} files selected, {} ignored",
            self.name,
            resolution.files_selected(),
            resolution.ignored
        );
        Ok(resolution)
    }
}

/// Validates and resolves one collection of `manifest`.
pub fn resolve(
    manifest: &Manifest,
    name: &str,
    vars: &RuntimeVars,
    report: &mut dyn Report,
) -> Result<(Collection, Resolution)> {
    let collection = Collection::from_manifest(manifest, name, vars)?;
    let resolution = collection.resolve(report)?;
    Ok((collection, resolution))
}
