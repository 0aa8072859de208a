//! Runs a backup of the requested collections.

use crate::archive::{self, archive_file_name};
use crate::collection::Collection;
use crate::manifest::{self, Manifest};
use crate::report::{Report, Summary};
use crate::vars::RuntimeVars;
use crate::{Error, Result};
use std::path::Path;

/// Loads the manifest at `path` and archives `collections` in order.
///
/// Every requested name is checked before any work starts, and the first
/// failure aborts the whole run.
pub fn run<S: AsRef<str>>(
    path: &Path,
    collections: &[S],
    vars: &RuntimeVars,
    report: &mut dyn Report,
) -> Result<Vec<Summary>> {
    report.manifest(path);
    let manifest = manifest::load(path)?;
    let summaries = run_manifest(&manifest, collections, vars, report)?;
    report.done();
    Ok(summaries)
}

/// Archives `collections` of an already loaded manifest.
pub fn run_manifest<S: AsRef<str>>(
    manifest: &Manifest,
    collections: &[S],
    vars: &RuntimeVars,
    report: &mut dyn Report,
) -> Result<Vec<Summary>> {
    let declared = manifest.collections()?;
    if let Some(unknown) = collections
        .iter()
        .map(AsRef::as_ref)
        .find(|name| !declared.contains_key(*name))
    {
        return Err(Error::UnknownCollection(unknown.to_string()));
    }

    let mut summaries = Vec::with_capacity(collections.len());
    for name in collections {
        let name = name.as_ref();
        report.collection(name);
        let summary = process(manifest, name, vars, report)?;
        report.finished(&summary);
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Resolves and archives a single collection.
pub fn process(
    manifest: &Manifest,
    name: &str,
    vars: &RuntimeVars,
    report: &mut dyn Report,
) -> Result<Summary> {
    let collection = Collection::from_manifest(manifest, name, vars)?;
    let archive_path = collection.destination.join(archive_file_name(
        name,
        vars.timestamp(),
        collection.compression,
    ));
    report.destination(&collection.destination, &archive_path);

    report.resolving();
    let resolution = collection.resolve(report)?;
    archive::write(&collection, &resolution, vars.timestamp(), report)
}
