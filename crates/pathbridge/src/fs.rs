//! Primitives that consult the host filesystem or process state

use std::env;
use std::path::Path;

use glob::MatchOptions;
use tracing::debug;

use crate::error::FsError;
use crate::{paths, pattern};

/// Wildcards never cross a separator; leading dots are matched like any other character.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Current working directory.
pub fn getwd() -> Result<String, FsError> {
    let cwd = env::current_dir().map_err(|e| FsError::path("getwd", ".", e))?;
    Ok(display(&cwd))
}

/// Change the working directory of the process.
pub fn chdir(path: &str) -> Result<(), FsError> {
    env::set_current_dir(path).map_err(|e| FsError::path("chdir", path, e))
}

/// Absolute form of `path`, resolved against the working directory.
pub fn abs(path: &str) -> Result<String, FsError> {
    if paths::is_abs(path) {
        return Ok(paths::clean(path));
    }
    let cwd = getwd()?;
    Ok(paths::join(&[cwd.as_str(), path]))
}

/// `path` with every symbolic link resolved.
///
/// Resolution goes through the host's canonicalization, so the result is
/// always absolute and cleaned, even when `path` is relative.
pub fn eval_symlinks(path: &str) -> Result<String, FsError> {
    let resolved = std::fs::canonicalize(path).map_err(|e| FsError::path("lstat", path, e))?;
    Ok(display(&resolved))
}

/// Paths matching `pattern`, in the order the directory scan yields them.
///
/// Entries that cannot be read during the scan are skipped.
pub fn glob(pattern: &str) -> Result<Vec<String>, FsError> {
    if pattern.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = pattern::translate(pattern)?;
    let mut matches = Vec::new();
    for entry in glob::glob_with(&pattern, MATCH_OPTIONS)? {
        match entry {
            Ok(path) => matches.push(display(&path)),
            Err(e) => debug!(path = %e.path().display(), error = %e.error(), "skipping unreadable glob entry"),
        }
    }
    Ok(matches)
}

/// Whether the whole of `name` matches the shell `pattern`.
///
/// `[^...]` negates a class and, outside Windows, `\` escapes the next
/// character.
pub fn matches(pattern: &str, name: &str) -> Result<bool, FsError> {
    let pattern = glob::Pattern::new(&pattern::translate(pattern)?)?;
    Ok(pattern.matches_with(name, MATCH_OPTIONS))
}
