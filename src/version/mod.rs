//! version
//!
//! Release versions from `git describe`, with a file fallback.
//!
//! # Overview
//!
//! Inside a checkout the version is the nearest tag as reported by
//! [`Git::describe`]. Outside one (an unpacked source release, say) it is
//! the first line of a `RELEASE-VERSION` file next to the code. Whenever
//! the two disagree the file is rewritten, so a release cut from a checkout
//! carries its version with it.
//!
//! Versions look like `MAJOR.MINOR.PATCH` with optional `-suffix` parts and
//! an optional leading `v`, which is dropped:
//!
//! | Described            | Version              |
//! |----------------------|----------------------|
//! | `v1.2.3`             | `1.2.3`              |
//! | `1.2.3-rc1`          | `1.2.3-rc1`          |
//! | `v1.2.3-31-gbf8afc8` | `1.2.3-31-gbf8afc8`  |
//! | `1.2.3rc1`           | error                |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::git::Git;

/// Name of the fallback version file.
pub const RELEASE_FILE: &str = "RELEASE-VERSION";

/// Hash digits in a described version.
pub const DEFAULT_ABBREV: u32 = 4;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?(?P<version>\d+\.\d+\.\d+(?:-.+)?)$").expect("valid version regex")
});

/// Errors from version lookup.
#[derive(Debug, Error)]
pub enum VersionError {
    /// Neither git nor the release file produced a version.
    #[error("cannot find the version number")]
    NotFound,

    #[error("invalid version number: {0}")]
    InvalidVersion(String),

    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The directory to describe from and the release file inside it.
///
/// `path` may name a file, in which case its directory is used.
pub fn lookup_version(path: &Path) -> (PathBuf, PathBuf) {
    let dir = if path.is_file() {
        path.parent().unwrap_or(path).to_path_buf()
    } else {
        path.to_path_buf()
    };
    let file = dir.join(RELEASE_FILE);
    (dir, file)
}

/// `git describe --tags` for the repository containing `dir`, if any.
pub fn call_git_describe(dir: &Path, abbrev: u32) -> Option<String> {
    let git = match Git::open(dir) {
        Ok(git) => git,
        Err(e) => {
            tracing::debug!(error = %e, "no repository to describe");
            return None;
        }
    };
    match git.describe(abbrev) {
        Ok(described) => Some(described),
        Err(e) => {
            tracing::debug!(error = %e, "git describe failed");
            None
        }
    }
}

/// First line of the release file, or `None` if there is no file.
pub fn read_release_version(file: &Path) -> Result<Option<String>, VersionError> {
    match fs::read_to_string(file) {
        Ok(content) => Ok(content
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(VersionError::Io {
            path: file.to_path_buf(),
            source,
        }),
    }
}

pub fn write_release_version(file: &Path, version: &str) -> Result<(), VersionError> {
    fs::write(file, format!("{}\n", version)).map_err(|source| VersionError::Io {
        path: file.to_path_buf(),
        source,
    })
}

/// Check a version string and strip any leading `v`.
pub fn validate_version(raw: &str) -> Result<String, VersionError> {
    VERSION_RE
        .captures(raw)
        .and_then(|caps| caps.name("version"))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| VersionError::InvalidVersion(raw.to_string()))
}

/// The version for the code at `path`.
///
/// See the [module documentation](self) for the lookup order.
pub fn get_git_version(path: &Path, abbrev: u32) -> Result<String, VersionError> {
    let (dir, _) = lookup_version(path);
    get_git_version_with(path, abbrev, |abbrev| call_git_describe(&dir, abbrev))
}

/// [`get_git_version`] with the describe step supplied by the caller.
pub fn get_git_version_with<F>(path: &Path, abbrev: u32, describe: F) -> Result<String, VersionError>
where
    F: FnOnce(u32) -> Option<String>,
{
    let (_, file) = lookup_version(path);
    let release = read_release_version(&file)?;

    let raw = describe(abbrev)
        .or_else(|| release.clone())
        .ok_or(VersionError::NotFound)?;
    let version = validate_version(&raw)?;

    if release.as_deref() != Some(version.as_str()) {
        tracing::debug!(file = %file.display(), version = %version, "updating release file");
        write_release_version(&file, &version)?;
    }
    Ok(version)
}
