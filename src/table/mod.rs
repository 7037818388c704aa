//! Table Module
//!
//! Data model shared by the storage layer and the database facade.
//!
//! ## Responsibilities
//! - Schemas: ordered, uniquely named, typed fields
//! - Tables: a schema plus rows whose arity matches it
//! - Row validation on insertion

mod schema;
#[allow(clippy::module_inception)]
mod table;

pub use schema::{Field, Schema};
pub use table::Table;

/// One row: a value per schema field, in field order
pub type Row = Vec<crate::codec::Value>;
