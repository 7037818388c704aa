//! Schema definitions
//!
//! An ordered list of named, typed fields. Field order defines the
//! position of each value inside a row.

use serde::{Deserialize, Serialize};

use crate::codec::FieldType;
use crate::error::{Result, SyneryError};

/// A column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered field list of a table. `Clone` is a deep copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `add_field`
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Result<Self> {
        self.add_field(name, field_type)?;
        Ok(self)
    }

    /// Append a field. Names must be unique within the schema.
    pub fn add_field(&mut self, name: impl Into<String>, field_type: FieldType) -> Result<&Field> {
        let name = name.into();
        if self.field_position(&name).is_some() {
            return Err(SyneryError::Validation(format!(
                "field '{}' already exists in schema",
                name
            )));
        }
        self.fields.push(Field::new(name, field_type));
        Ok(&self.fields[self.fields.len() - 1])
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Remove the field with the given name; returns whether it existed
    pub fn remove_field(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.name != name);
        self.fields.len() != before
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
