//! File discovery for recordings and exported edits.
//!
//! The recording folder and the ending-clip asset live in synced folders
//! that mount under different roots per machine, so paths are configured
//! as candidate lists and the first existing one wins. "Latest" always
//! means newest modification time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// First candidate directory that exists, if any.
pub fn first_existing_dir<I, P>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    candidates
        .into_iter()
        .map(Into::into)
        .find(|p| p.is_dir())
}

/// First candidate file that exists, if any.
pub fn first_existing_file<I, P>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    candidates
        .into_iter()
        .map(Into::into)
        .find(|p| p.is_file())
}

/// Newest file in `dir` whose extension matches one of `extensions`
/// (case-insensitive, without the dot). Subdirectories are not entered.
pub fn latest_file_with_extensions(
    dir: &Path,
    extensions: &[&str],
) -> io::Result<Option<PathBuf>> {
    let mut newest: Option<(PathBuf, SystemTime)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.iter().any(|want| e.eq_ignore_ascii_case(want)))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        let newer = match &newest {
            Some((_, best)) => modified > *best,
            None => true,
        };
        if newer {
            newest = Some((path, modified));
        }
    }

    if let Some((path, _)) = &newest {
        debug!("latest {:?} file in {}: {}", extensions, dir.display(), path.display());
    }
    Ok(newest.map(|(path, _)| path))
}

/// Newest exported edit-decision file (`.fcpxml` or `.xml`) in `dir`.
pub fn latest_edit_file(dir: &Path) -> io::Result<Option<PathBuf>> {
    latest_file_with_extensions(dir, &["fcpxml", "xml"])
}

/// Newest screen recording (`.mkv`) in `dir`.
pub fn latest_recording(dir: &Path) -> io::Result<Option<PathBuf>> {
    latest_file_with_extensions(dir, &["mkv"])
}
