//! Storage Module
//!
//! Persistent table storage as a set of size-capped shard files.
//!
//! ## Responsibilities
//! - Map table names to shard file names
//! - Rotate shards once they pass the size limit
//! - Replace a table's shard set on write
//! - Read shards in parallel, rename and delete shard sets
//!
//! ## Directory Layout
//! ```text
//! tables/
//!   ├── Customers.1.syd
//!   ├── Customers.2.syd        (rotated once .1 passed the limit)
//!   └── -temp-Orders.1.syd     (in-flight or leftover write)
//! ```
//!
//! ## Shard Format
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Row 1: field 1 │ field 2 │ ... │ field N    │  (nullable codec values)
//! │ Row 2: ...                                  │
//! │ ... no header, no footer, no delimiters     │
//! └─────────────────────────────────────────────┘
//! ```

pub mod layout;
mod manager;
mod reader;
mod writer;

pub use layout::{sanitize_table_name, ShardLayout, TEMP_PREFIX};
pub use manager::ShardedTableStore;
pub use reader::ShardReader;
pub use writer::ShardWriter;
