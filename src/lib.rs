//! colbak: assembles compressed tar archives from named collections of paths.
//!
//! A YAML manifest declares collections, each with item patterns, a target
//! directory, a compression and exclusion patterns. For every requested
//! collection the pipeline substitutes placeholders, expands and filters the
//! patterns, then streams the selected files into one archive.

pub mod archive;
pub mod backup;
pub mod collection;
pub mod commands;
pub mod error;
pub mod file_util;
pub mod ignore;
pub mod logging;
pub mod manifest;
pub mod path;
pub mod report;
pub mod sysexits;
pub mod vars;

pub use error::{Error, Result};
