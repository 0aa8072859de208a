use std::path::{Component, Path, PathBuf};
use std::{env, io};

use path_clean::PathClean;

/// Default manifest location.
pub const DEFAULT_MANIFEST: &str = concat!("~/.", env!("CARGO_PKG_NAME"), ".yml");

/// Expands a leading `~` or `$HOME` to the user's home directory.
pub fn expand_home(input: &str) -> PathBuf {
    for prefix in ["~", "$HOME"] {
        if let Some(rest) = input.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with('/') {
                if let Some(home) = dirs::home_dir() {
                    return PathBuf::from(format!("{}{rest}", home.to_string_lossy()));
                }
            }
        }
    }
    PathBuf::from(input)
}

/// Returns the name a file is stored under inside an archive.
///
/// The full path is kept, minus its root, since tar members are relative.
/// Relative paths that climb with `..` are first made absolute against the
/// working directory.
pub fn archive_name(path: &Path) -> io::Result<PathBuf> {
    let path = if path.components().any(|c| c == Component::ParentDir) {
        env::current_dir()?.join(path).clean()
    } else {
        path.to_path_buf()
    };
    Ok(path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect())
}
