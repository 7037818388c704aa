//! Metadata Module
//!
//! Persistence of the schema registry (table name → schema).
//!
//! ## Document Format (JSON)
//! ```text
//! {
//!   "Customers": [ { "name": "Id", "type": "int" },
//!                  { "name": "Name", "type": "string" } ],
//!   ...
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::FieldType;
use crate::error::{Result, SyneryError};
use crate::table::Schema;

/// In-memory registry mirrored to the metadata store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceData {
    pub schemas: BTreeMap<String, Schema>,
}

/// Loads and saves the schema registry
pub trait MetadataStore: Send + Sync {
    /// Load the registry; an absent document yields an empty registry
    fn load(&self) -> Result<InstanceData>;

    /// Replace the persisted registry
    fn save(&self, data: &InstanceData) -> Result<()>;
}

/// One entry of a schema as it appears in the document
#[derive(Deserialize)]
struct StoredField {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

/// Registry stored as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonMetadataStore {
    path: PathBuf,
}

impl JsonMetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataStore for JsonMetadataStore {
    fn load(&self) -> Result<InstanceData> {
        if !self.path.exists() {
            return Ok(InstanceData::default());
        }

        let text = fs::read_to_string(&self.path)?;
        let document: BTreeMap<String, Vec<StoredField>> =
            serde_json::from_str(&text).map_err(|e| {
                SyneryError::Metadata(format!(
                    "failed to parse '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        // Type names are resolved here so an unknown one is reported as such
        let mut data = InstanceData::default();
        for (table, fields) in document {
            let mut schema = Schema::new();
            for field in fields {
                let field_type: FieldType = field.type_name.parse()?;
                schema.add_field(field.name, field_type)?;
            }
            data.schemas.insert(table, schema);
        }
        Ok(data)
    }

    fn save(&self, data: &InstanceData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| SyneryError::Metadata(format!("failed to serialize registry: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), tables = data.schemas.len(), "saved metadata");
        Ok(())
    }
}
