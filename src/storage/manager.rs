//! Sharded Table Store
//!
//! Moves whole tables between memory and their shard files.
//!
//! ## Responsibilities
//! - Write a table to a temporary shard set, then swap it in
//! - Read all shards of a table in parallel
//! - Delete and rename shard sets

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyneryError};
use crate::table::{Row, Schema, Table};

use super::layout::{ensure_writable_dir, sanitize_table_name, ShardLayout, TEMP_PREFIX};
use super::reader::ShardReader;
use super::writer::ShardWriter;

/// Persists tables as size-capped shard files in one directory.
///
/// ## Concurrency:
/// - Writes run sequentially on the calling thread
/// - Reads spawn one scoped thread per shard; every thread fills its own
///   row buffer and the buffers are concatenated in shard order afterwards
pub struct ShardedTableStore {
    layout: ShardLayout,
    shard_size_limit: u64,
}

impl ShardedTableStore {
    /// Open a store on an existing, writable directory
    pub fn open(table_dir: &Path, shard_size_limit: u64, extension: &str) -> Result<Self> {
        ensure_writable_dir(table_dir)?;
        if shard_size_limit == 0 {
            return Err(SyneryError::Config(
                "shard size limit must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            layout: ShardLayout::new(table_dir, extension),
            shard_size_limit,
        })
    }

    /// Write `table` under `name`, replacing any previous shard set.
    ///
    /// Steps:
    /// 1. Remove leftovers of an earlier failed write to the same name
    /// 2. Stream rows into `-temp-<name>.N` shards
    /// 3. Delete the current `<name>.N` shards
    /// 4. Rename every temp shard to the real name at the same index
    ///
    /// Not crash-safe: a crash between 3 and 4 loses the table.
    /// Returns the number of shards written.
    pub fn write(&self, name: &str, table: &Table) -> Result<usize> {
        let prefix = sanitize_table_name(name)?;
        let temp_prefix = format!("{}{}", TEMP_PREFIX, prefix);

        self.remove_shards(&temp_prefix)?;

        let mut writer = ShardWriter::new(&self.layout, temp_prefix.as_str(), self.shard_size_limit);
        for row in table.rows() {
            writer.append(row)?;
        }
        let rows_written = writer.rows_written();
        let shards = writer.finish()?;

        self.remove_shards(&prefix)?;
        self.move_shards(&temp_prefix, &prefix)?;

        tracing::info!(
            table = name,
            rows = rows_written,
            shards = shards.len(),
            "wrote table"
        );
        Ok(shards.len())
    }

    /// Read every shard of `name` into a fresh table carrying `schema`.
    ///
    /// Row order within a shard is preserved; shards are concatenated in
    /// index order. Any failing shard fails the whole read.
    pub fn read(&self, name: &str, schema: Schema) -> Result<Table> {
        let prefix = sanitize_table_name(name)?;
        let paths = self.layout.discover(&prefix);

        let per_shard: Vec<Result<Vec<Row>>> = match paths.as_slice() {
            [] => Vec::new(),
            [single] => vec![read_shard(single, &schema)],
            _ => self.read_parallel(&paths, &schema)?,
        };

        let mut rows = Vec::new();
        for shard_rows in per_shard {
            rows.extend(shard_rows?);
        }

        tracing::debug!(table = name, shards = paths.len(), rows = rows.len(), "read table");
        Table::with_rows(schema, rows)
    }

    /// Delete every shard of `name`; returns whether any existed
    pub fn delete(&self, name: &str) -> Result<bool> {
        let prefix = sanitize_table_name(name)?;
        let removed = self.remove_shards(&prefix)?;
        tracing::info!(table = name, shards = removed, "deleted table shards");
        Ok(removed > 0)
    }

    /// Move every shard of `from` to `to`, keeping indices; returns whether
    /// any existed
    pub fn rename(&self, from: &str, to: &str) -> Result<bool> {
        let from_prefix = sanitize_table_name(from)?;
        let to_prefix = sanitize_table_name(to)?;

        if from_prefix == to_prefix {
            return Ok(!self.layout.discover(&from_prefix).is_empty());
        }

        let moved = self.move_shards(&from_prefix, &to_prefix)?;
        tracing::info!(from = from, to = to, shards = moved, "renamed table shards");
        Ok(moved > 0)
    }

    /// Shard paths currently on disk for `name`
    pub fn shard_paths(&self, name: &str) -> Result<Vec<PathBuf>> {
        let prefix = sanitize_table_name(name)?;
        Ok(self.layout.discover(&prefix))
    }

    pub fn table_dir(&self) -> &Path {
        self.layout.dir()
    }

    pub fn shard_size_limit(&self) -> u64 {
        self.shard_size_limit
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_parallel(&self, paths: &[PathBuf], schema: &Schema) -> Result<Vec<Result<Vec<Row>>>> {
        crossbeam::scope(|scope| {
            let handles: Vec<_> = paths
                .iter()
                .map(|path| scope.spawn(move |_| read_shard(path, schema)))
                .collect();

            handles
                .into_iter()
                .zip(paths)
                .map(|(handle, path)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(SyneryError::Storage(format!(
                            "reader thread for '{}' panicked",
                            path.display()
                        )))
                    })
                })
                .collect()
        })
        .map_err(|_| SyneryError::Storage("shard reader scope panicked".to_string()))
    }

    fn remove_shards(&self, prefix: &str) -> Result<usize> {
        let paths = self.layout.discover(prefix);
        for path in &paths {
            fs::remove_file(path).map_err(|e| SyneryError::shard_io(path, e))?;
        }
        Ok(paths.len())
    }

    /// Move `from.N` to `to.N` for each source shard, replacing files in the
    /// way, then drop destination shards past the moved range so discovery
    /// sees exactly the moved set.
    fn move_shards(&self, from_prefix: &str, to_prefix: &str) -> Result<usize> {
        let sources = self.layout.discover(from_prefix);

        for (index, source) in (1u32..).zip(&sources) {
            let target = self.layout.shard_path(to_prefix, index);
            if target.exists() {
                fs::remove_file(&target).map_err(|e| SyneryError::shard_io(&target, e))?;
            }
            fs::rename(source, &target).map_err(|e| SyneryError::shard_io(source, e))?;
        }

        let mut stale = sources.len() as u32 + 1;
        loop {
            let path = self.layout.shard_path(to_prefix, stale);
            if !path.is_file() {
                break;
            }
            fs::remove_file(&path).map_err(|e| SyneryError::shard_io(&path, e))?;
            stale += 1;
        }

        Ok(sources.len())
    }
}

fn read_shard(path: &Path, schema: &Schema) -> Result<Vec<Row>> {
    ShardReader::open(path)?.read_all(schema)
}
