//! In-memory table
//!
//! A schema plus rows. Rows are positionally aligned with the schema's
//! fields and are checked when they enter the table.

use crate::codec::Value;
use crate::error::{Result, SyneryError};

use super::{Row, Schema};

/// Schema and rows of one table.
///
/// `Table::default()` has no schema and rejects data until one is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    schema: Option<Schema>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table for `schema`
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            rows: Vec::new(),
        }
    }

    /// Create a table and fill it with `rows`
    pub fn with_rows(schema: Schema, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(schema);
        table.set_rows(rows)?;
        Ok(table)
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Replace the schema. Existing rows are not re-validated here; writes
    /// through the database check them again.
    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = Some(schema);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Overwrite all rows
    pub fn set_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        let schema = self.require_schema()?;
        for (index, row) in rows.iter().enumerate() {
            validate_row(schema, row, index)?;
        }
        self.rows = rows;
        Ok(())
    }

    /// Append one row
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        let schema = self.require_schema()?;
        validate_row(schema, &row, self.rows.len())?;
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Check every row against the current schema
    pub fn validate(&self) -> Result<()> {
        let schema = self.require_schema()?;
        for (index, row) in self.rows.iter().enumerate() {
            validate_row(schema, row, index)?;
        }
        Ok(())
    }

    fn require_schema(&self) -> Result<&Schema> {
        self.schema.as_ref().ok_or_else(|| {
            SyneryError::Validation("cannot hold data in a table without a schema".to_string())
        })
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Arity and per-field type check. `Null` fits every field.
fn validate_row(schema: &Schema, row: &[Value], index: usize) -> Result<()> {
    if row.len() != schema.len() {
        return Err(SyneryError::Validation(format!(
            "row {} has {} values, schema has {} fields",
            index,
            row.len(),
            schema.len()
        )));
    }

    for (value, field) in row.iter().zip(schema.fields()) {
        if !value.fits(field.field_type) {
            return Err(SyneryError::Validation(format!(
                "row {}: value {:?} does not fit field '{}' of type {}",
                index, value, field.name, field.field_type
            )));
        }
    }

    Ok(())
}
