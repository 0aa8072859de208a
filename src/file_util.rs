use std::fs;
use std::io;
use std::path::Path;

const SIZE_UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Creates `dir` and any missing parents with owner-only permissions.
///
/// Calling it on an existing directory does nothing.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

/// Returns true if `path` is a symbolic link whose target does not exist.
pub fn is_broken_link(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(meta) => meta.file_type().is_symlink() && fs::metadata(path).is_err(),
        Err(_) => false,
    }
}

/// Formats a byte count with binary prefixes, e.g. `1.5KiB`.
pub fn human_size(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in SIZE_UNITS {
        if num.abs() < 1024.0 {
            return format!("{num:3.1}{unit}B");
        }
        num /= 1024.0;
    }
    format!("{num:.1}YiB")
}
