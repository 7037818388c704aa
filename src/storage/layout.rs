//! Shard file layout
//!
//! Maps table names to shard paths: `<dir>/<sanitized>.<index>.<ext>` with
//! contiguous 1-based indices.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{Result, SyneryError};

/// Prefix of the shard set written before it replaces the real one
pub const TEMP_PREFIX: &str = "-temp-";

/// Characters stripped from table names. The set is the portable one so a
/// table directory produces the same names on every host.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turn a table name into a file-name prefix.
///
/// Path separators become `-`, then every illegal character is dropped.
/// The transform is lossy: distinct names can map to the same prefix.
///
/// A result starting with `TEMP_PREFIX` is rejected; those prefixes belong
/// to the in-flight shard sets of other tables.
pub fn sanitize_table_name(name: &str) -> Result<String> {
    let sanitized: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .filter(|c| !c.is_control() && !ILLEGAL_CHARS.contains(c))
        .collect();

    if sanitized.is_empty() {
        return Err(SyneryError::Validation(format!(
            "table name '{}' contains no usable file name characters",
            name
        )));
    }
    if sanitized.starts_with(TEMP_PREFIX) {
        return Err(SyneryError::Validation(format!(
            "table name '{}' maps to the reserved prefix '{}'",
            name, TEMP_PREFIX
        )));
    }
    Ok(sanitized)
}

/// Resolves shard paths inside one table directory
#[derive(Debug, Clone)]
pub struct ShardLayout {
    dir: PathBuf,
    extension: String,
}

impl ShardLayout {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of shard `index` (1-based) for an already sanitized prefix
    pub fn shard_path(&self, prefix: &str, index: u32) -> PathBuf {
        self.dir
            .join(format!("{}.{}.{}", prefix, index, self.extension))
    }

    /// All shards of `prefix`, probing 1, 2, 3, ... until the first gap
    pub fn discover(&self, prefix: &str) -> Vec<PathBuf> {
        (1u32..)
            .map(|index| self.shard_path(prefix, index))
            .take_while(|path| path.is_file())
            .collect()
    }
}

/// Name of the file created and removed again to test write access
const WRITE_CHECK_FILENAME: &str = ".write-check";

/// Fail with a configuration error unless `path` is an existing directory
/// the current process can create files in
pub fn ensure_writable_dir(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| {
        SyneryError::Config(format!("directory '{}' is not accessible: {}", path.display(), e))
    })?;

    if !metadata.is_dir() {
        return Err(SyneryError::Config(format!(
            "'{}' is not a directory",
            path.display()
        )));
    }
    if metadata.permissions().readonly() {
        return Err(SyneryError::Config(format!(
            "directory '{}' is not writable",
            path.display()
        )));
    }

    // Permission bits say nothing about the current user; try a real create
    let check_path = path.join(WRITE_CHECK_FILENAME);
    let created = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&check_path);
    match created {
        Ok(file) => {
            drop(file);
            fs::remove_file(&check_path).map_err(|e| {
                SyneryError::Config(format!(
                    "cannot clean up write check in '{}': {}",
                    path.display(),
                    e
                ))
            })
        }
        Err(e) => Err(SyneryError::Config(format!(
            "directory '{}' is not writable: {}",
            path.display(),
            e
        ))),
    }
}
