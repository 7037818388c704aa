//! # SyneryDB
//!
//! An embedded, file-backed table store with:
//! - Schema-typed tables kept in a persistent registry
//! - Size-capped binary shard files per table
//! - A compact varint/zig-zag primitive codec
//! - Single-writer access guarded by an advisory lock marker
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │        (lock marker, schema registry, validation)            │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!   ┌────────────────────────┐       ┌─────────────────────┐
//!   │   ShardedTableStore    │       │   MetadataStore     │
//!   │ (write/swap, parallel  │       │   (data.json)       │
//!   │  read, rename, delete) │       └─────────────────────┘
//!   └───────────┬────────────┘
//!               │
//!               ▼
//!        ┌─────────────┐
//!        │    Codec    │
//!        │ (varint,    │
//!        │  zig-zag)   │
//!        └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod table;
pub mod storage;
pub mod metadata;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SyneryError, Result};
pub use config::Config;
pub use codec::{FieldType, Value};
pub use engine::Database;
pub use table::{Field, Row, Schema, Table};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SyneryDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
