//! Configuration for SyneryDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Default shard size cap: 2 MiB
pub const DEFAULT_SHARD_SIZE_LIMIT: u64 = 2 * 1024 * 1024;

/// Default shard file extension
pub const DEFAULT_SHARD_EXTENSION: &str = "syd";

/// Default schema registry file name
pub const DEFAULT_METADATA_FILE: &str = "data.json";

/// Main configuration for a SyneryDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Working directory of the instance. Must exist and be writable.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── .lock            (advisory lock marker)
    ///     ├── data.json        (schema registry)
    ///     └── tables/          (shard files)
    pub data_dir: PathBuf,

    /// Shard rotation threshold (in bytes). Checked after each row, so a
    /// shard may exceed it by up to one row.
    pub shard_size_limit: u64,

    /// File extension of shard files (without the dot)
    pub shard_extension: String,

    // -------------------------------------------------------------------------
    // Metadata Configuration
    // -------------------------------------------------------------------------
    /// File name of the schema registry, relative to `data_dir`
    pub metadata_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./synerydb_data"),
            shard_size_limit: DEFAULT_SHARD_SIZE_LIMIT,
            shard_extension: DEFAULT_SHARD_EXTENSION.to_string(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the schema registry file
    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the working directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the shard size limit (in bytes)
    pub fn shard_size_limit(mut self, size: u64) -> Self {
        self.config.shard_size_limit = size;
        self
    }

    /// Set the shard file extension
    pub fn shard_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.shard_extension = extension.into();
        self
    }

    /// Set the schema registry file name
    pub fn metadata_file(mut self, name: impl Into<String>) -> Self {
        self.config.metadata_file = name.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
