//! Command-line interface definition for colbak.
//!
//! This module defines the CLI arguments and the console reporter that turns
//! pipeline events into progress output.

use crate::backup;
use crate::file_util::human_size;
use crate::path::{DEFAULT_MANIFEST, expand_home};
use crate::report::{Progress, Report, Summary};
use crate::vars::RuntimeVars;
use crate::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Assemble backup archives from the collections declared in a manifest.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Collections to back up, in order.
    #[arg(required = true, num_args = 1..)]
    pub collections: Vec<String>,
    /// Manifest file.
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    pub manifest: String,
    /// Print every file as it is added instead of a progress line.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Also print every ignored path.
    #[arg(short, long, conflicts_with = "quiet")]
    pub debug: bool,
    /// Only print errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Manifest path with `~` expanded.
    pub fn manifest_path(&self) -> PathBuf {
        expand_home(&self.manifest)
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// Runs the backup described by the command line.
pub fn run(cli: &Cli, vars: &RuntimeVars) -> Result<Vec<Summary>> {
    let mut console = Console::new(cli);
    backup::run(&cli.manifest_path(), cli.collections.as_slice(), vars, &mut console)
}

/// Prints pipeline events to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    verbose: bool,
    debug: bool,
    quiet: bool,
}

impl Console {
    pub fn new(cli: &Cli) -> Self {
        Self {
            verbose: cli.verbose,
            debug: cli.debug,
            quiet: cli.quiet,
        }
    }

    fn say(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", msg.as_ref());
        }
    }

    /// Whether the in-place progress line is shown.
    fn shows_progress(&self) -> bool {
        !self.verbose && !self.quiet
    }
}

/// Renders the one-line progress counter.
pub fn progress_line(progress: &Progress) -> String {
    format!(
        "Archived {} of {} files, total of {} of {}.",
        progress.files_added,
        progress.files_selected,
        human_size(progress.bytes_added),
        human_size(progress.bytes_selected)
    )
}

/// Renders the end-of-collection summary.
pub fn summary_lines(summary: &Summary) -> String {
    format!(
        "{} files resolved, {} added, {} ignored.\nFile size {}. Archive size {}.",
        summary.files_resolved,
        summary.files_added,
        summary.files_ignored,
        human_size(summary.bytes_added),
        human_size(summary.archive_size)
    )
}

impl Report for Console {
    fn manifest(&mut self, path: &Path) {
        self.say(format!("Loading manifest from {}", path.display()));
    }

    fn collection(&mut self, name: &str) {
        self.say(format!("Processing collection {name}"));
    }

    fn destination(&mut self, dir: &Path, archive: &Path) {
        self.say(format!("Archive will be created in {}", dir.display()));
        if self.verbose {
            println!("Archive file is {}", archive.display());
        }
    }

    fn resolving(&mut self) {
        self.say("Collecting and resolving files - this might take a while...");
    }

    fn ignored(&mut self, path: &str) {
        if self.debug {
            println!("Ignoring {path}");
        }
    }

    fn adding(&mut self, path: &Path, _progress: &Progress) {
        if self.verbose {
            println!("Adding {}", path.display());
        }
    }

    fn added(&mut self, _path: &Path, progress: &Progress) {
        if self.shows_progress() {
            print!("{}\r", progress_line(progress));
            let _ = io::stdout().flush();
        }
    }

    fn finished(&mut self, summary: &Summary) {
        if self.shows_progress() {
            println!();
        }
        self.say(summary_lines(summary));
    }

    fn done(&mut self) {
        self.say("Done");
    }
}
