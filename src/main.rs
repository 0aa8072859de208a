use clap::Parser;
use colbak::commands::{self, Cli};
use colbak::vars::RuntimeVars;
use colbak::{Error, logging, sysexits};
use std::process;

/// Entry point for the colbak CLI application.
/// Parses command-line arguments, runs the backup and maps failures to exit codes.
fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level());

    // Captured once so every archive of this run shares one timestamp.
    let vars = RuntimeVars::capture();

    match commands::run(&cli, &vars) {
        Ok(_) => {}
        Err(Error::Internal(e)) => {
            eprintln!("Internal error: {e:?}");
            process::exit(sysexits::EX_SOFTWARE);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(sysexits::EX_FAILURE);
        }
    }
}
