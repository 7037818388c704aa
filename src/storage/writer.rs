//! Shard Writer
//!
//! Streams rows into consecutive shard files, rotating once a shard grows
//! past the size limit.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use bytes::BytesMut;

use crate::codec::encode_nullable;
use crate::error::{Result, SyneryError};
use crate::table::Row;

use super::layout::ShardLayout;

/// Initial capacity of the row encode buffer
const ROW_BUFFER_CAPACITY: usize = 4 * 1024;

/// An open shard being filled
struct OpenShard {
    path: PathBuf,
    writer: BufWriter<File>,
    len: u64,
}

/// Writes rows for one shard prefix.
///
/// Shards are opened lazily, so an empty table produces no files and the
/// last shard is never empty. The size check runs after each row: a shard
/// can exceed the limit by at most one row.
pub struct ShardWriter<'a> {
    layout: &'a ShardLayout,
    prefix: String,
    size_limit: u64,
    current: Option<OpenShard>,
    next_index: u32,
    /// Reused per row; each row is encoded here before hitting the file
    row_buf: BytesMut,
    written: Vec<PathBuf>,
    rows_written: u64,
}

impl<'a> ShardWriter<'a> {
    pub fn new(layout: &'a ShardLayout, prefix: impl Into<String>, size_limit: u64) -> Self {
        Self {
            layout,
            prefix: prefix.into(),
            size_limit,
            current: None,
            next_index: 1,
            row_buf: BytesMut::with_capacity(ROW_BUFFER_CAPACITY),
            written: Vec::new(),
            rows_written: 0,
        }
    }

    /// Append a row, fields left to right through the nullable path
    pub fn append(&mut self, row: &Row) -> Result<()> {
        self.row_buf.clear();
        for value in row {
            encode_nullable(&mut self.row_buf, value)?;
        }

        if self.current.is_none() {
            self.current = Some(self.open_next()?);
        }

        let size_limit = self.size_limit;
        let rotate = match self.current.as_mut() {
            Some(shard) => {
                shard
                    .writer
                    .write_all(&self.row_buf)
                    .map_err(|e| SyneryError::shard_io(&shard.path, e))?;
                shard.len += self.row_buf.len() as u64;
                shard.len > size_limit
            }
            None => false,
        };
        self.rows_written += 1;

        if rotate {
            self.close_current()?;
        }
        Ok(())
    }

    /// Flush and close the last shard; returns the paths written, in order
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        self.close_current()?;
        Ok(std::mem::take(&mut self.written))
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn open_next(&mut self) -> Result<OpenShard> {
        let path = self.layout.shard_path(&self.prefix, self.next_index);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| SyneryError::shard_io(&path, e))?;
        }
        let file = File::create(&path).map_err(|e| SyneryError::shard_io(&path, e))?;

        tracing::debug!(shard = %path.display(), index = self.next_index, "opened shard");

        self.next_index += 1;
        self.written.push(path.clone());
        Ok(OpenShard {
            path,
            writer: BufWriter::new(file),
            len: 0,
        })
    }

    fn close_current(&mut self) -> Result<()> {
        let Some(shard) = self.current.take() else {
            return Ok(());
        };

        let OpenShard { path, writer, len } = shard;
        let file = writer
            .into_inner()
            .map_err(|e| SyneryError::shard_io(&path, e.into_error()))?;
        file.sync_all().map_err(|e| SyneryError::shard_io(&path, e))?;

        tracing::debug!(shard = %path.display(), bytes = len, "closed shard");
        Ok(())
    }
}
