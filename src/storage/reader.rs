//! Shard Reader
//!
//! Decodes every row of a single shard file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::codec::decode_nullable;
use crate::error::{Result, SyneryError};
use crate::table::{Row, Schema};

/// Sequential reader over the rows of one shard
pub struct ShardReader {
    path: PathBuf,
    reader: BufReader<File>,
}

impl ShardReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SyneryError::shard_io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
        })
    }

    /// Read rows until the file ends on a row boundary.
    ///
    /// A field that cannot be decoded fails the whole shard with
    /// `CorruptData` naming the row (1-based, within this shard) and field.
    pub fn read_all(&mut self, schema: &Schema) -> Result<Vec<Row>> {
        let mut rows = Vec::new();

        while !self.at_end()? {
            let mut row = Vec::with_capacity(schema.len());
            for field in schema.fields() {
                let value = decode_nullable(&mut self.reader, field.field_type).map_err(|e| {
                    SyneryError::CorruptData {
                        path: self.path.clone(),
                        row: rows.len() + 1,
                        field: field.name.clone(),
                        field_type: field.field_type,
                        source: Box::new(e),
                    }
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        tracing::debug!(shard = %self.path.display(), rows = rows.len(), "read shard");
        Ok(rows)
    }

    fn at_end(&mut self) -> Result<bool> {
        let buf = self
            .reader
            .fill_buf()
            .map_err(|e| SyneryError::shard_io(&self.path, e))?;
        Ok(buf.is_empty())
    }
}
