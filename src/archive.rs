//! Archive assembly.
//!
//! Each collection is written to a single tar stream, optionally wrapped in a
//! gzip, xz or bzip2 encoder. Files are appended one at a time in resolution
//! order under their full original path.

use crate::collection::{Collection, FileEntry, Resolution};
use crate::manifest::Compression;
use crate::report::{Progress, Report, Summary};
use crate::{Error, Result, file_util, path};
use anyhow::Context;
use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use xz2::write::XzEncoder;

/// Default xz preset.
const XZ_PRESET: u32 = 6;

impl Compression {
    /// File extension of archives written with this compression.
    pub fn extension(self) -> &'static str {
        match self {
            Compression::None => ".tar",
            Compression::Gz => ".tar.gz",
            Compression::Xz => ".tar.xz",
            Compression::Bz2 => ".tar.bz2",
        }
    }

    fn encoder(self, file: File) -> Encoder {
        let file = BufWriter::new(file);
        match self {
            Compression::None => Encoder::Plain(file),
            Compression::Gz => Encoder::Gzip(GzEncoder::new(file, flate2::Compression::default())),
            Compression::Xz => Encoder::Xz(XzEncoder::new(file, XZ_PRESET)),
            Compression::Bz2 => Encoder::Bzip2(BzEncoder::new(file, bzip2::Compression::default())),
        }
    }
}

/// The byte stream under the tar builder.
enum Encoder {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Xz(XzEncoder<BufWriter<File>>),
    Bzip2(BzEncoder<BufWriter<File>>),
}

impl Encoder {
    /// Flushes the compressor trailer and the underlying file.
    fn finish(self) -> io::Result<()> {
        let mut file = match self {
            Encoder::Plain(file) => file,
            Encoder::Gzip(encoder) => encoder.finish()?,
            Encoder::Xz(encoder) => encoder.finish()?,
            Encoder::Bzip2(encoder) => encoder.finish()?,
        };
        file.flush()?;
        file.get_ref().sync_all()
    }
}

impl Write for Encoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Encoder::Plain(w) => w.write(buf),
            Encoder::Gzip(w) => w.write(buf),
            Encoder::Xz(w) => w.write(buf),
            Encoder::Bzip2(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Encoder::Plain(w) => w.flush(),
            Encoder::Gzip(w) => w.flush(),
            Encoder::Xz(w) => w.flush(),
            Encoder::Bzip2(w) => w.flush(),
        }
    }
}

/// Returns `<collection>-<timestamp><extension>`.
pub fn archive_file_name(collection: &str, timestamp: &str, compression: Compression) -> String {
    format!("{collection}-{timestamp}{}", compression.extension())
}

/// An open archive being filled with files.
pub struct ArchiveWriter {
    path: PathBuf,
    builder: tar::Builder<Encoder>,
    progress: Progress,
}

impl ArchiveWriter {
    /// Creates the destination directory if needed and opens a new archive
    /// in it. An existing file of the same name is replaced.
    ///
    /// # Errors
    /// [`Error::ArchiveOpen`] if the directory or the file cannot be created.
    pub fn create(
        dir: &Path,
        collection: &str,
        timestamp: &str,
        compression: Compression,
    ) -> Result<Self> {
        file_util::ensure_dir(dir).map_err(|source| Error::ArchiveOpen {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(archive_file_name(collection, timestamp, compression));
        let file = File::create(&path).map_err(|source| Error::ArchiveOpen {
            path: path.clone(),
            source,
        })?;
        tracing::info!("writing {compression} archive {}", path.display());

        let mut builder = tar::Builder::new(compression.encoder(file));
        builder.follow_symlinks(false);
        Ok(Self {
            path,
            builder,
            progress: Progress::default(),
        })
    }

    /// Path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Sets the totals the progress counters run up to.
    pub fn select(&mut self, files: usize, bytes: u64) {
        self.progress.files_selected = files;
        self.progress.bytes_selected = bytes;
    }

    /// Appends one file under its full path.
    ///
    /// # Errors
    /// [`Error::ArchiveWrite`] if the file cannot be read or written.
    pub fn append(&mut self, entry: &FileEntry) -> Result<()> {
        let write_error = |source| Error::ArchiveWrite {
            entry: entry.path.clone(),
            archive: self.path.clone(),
            source,
        };
        let name = path::archive_name(&entry.path).map_err(write_error)?;
        self.builder
            .append_path_with_name(&entry.path, &name)
            .map_err(write_error)?;
        self.progress.files_added += 1;
        self.progress.bytes_added += entry.size;
        Ok(())
    }

    /// Writes the tar trailer, finishes compression and returns the archive
    /// path with its size on disk.
    ///
    /// # Errors
    /// [`Error::ArchiveFinish`] if the stream cannot be finalised.
    pub fn finish(self) -> Result<(PathBuf, u64)> {
        let Self { path, builder, .. } = self;
        builder
            .into_inner()
            .and_then(Encoder::finish)
            .map_err(|source| Error::ArchiveFinish {
                archive: path.clone(),
                source,
            })?;
        let size = fs::metadata(&path)
            .with_context(|| format!("Unable to read metadata of {}", path.display()))?
            .len();
        tracing::debug!("closed archive {} ({size} bytes)", path.display());
        Ok((path, size))
    }
}

/// Writes every resolved file of `collection` into a new archive.
///
/// The archive is named after the collection and `timestamp` and placed in
/// the collection's destination directory. Any failure aborts the archive.
pub fn write(
    collection: &Collection,
    resolution: &Resolution,
    timestamp: &str,
    report: &mut dyn Report,
) -> Result<Summary> {
    let mut writer = ArchiveWriter::create(
        &collection.destination,
        &collection.name,
        timestamp,
        collection.compression,
    )?;
    writer.select(resolution.files_selected(), resolution.selected_size);

    for entry in &resolution.files {
        report.adding(&entry.path, writer.progress());
        writer.append(entry)?;
        report.added(&entry.path, writer.progress());
    }

    let progress = *writer.progress();
    let (archive, archive_size) = writer.finish()?;
    Ok(Summary {
        collection: collection.name.clone(),
        archive,
        files_resolved: resolution.files_selected(),
        files_added: progress.files_added,
        files_ignored: resolution.ignored,
        bytes_selected: progress.bytes_selected,
        bytes_added: progress.bytes_added,
        archive_size,
    })
}
