//! Engine Module
//!
//! The database facade that coordinates all components.
//!
//! ## Responsibilities
//! - Own the working directory and its advisory lock marker
//! - Keep the schema registry and mirror it to the metadata store
//! - Validate tables and route mutations to the shard store
//! - Refuse every call once disposed

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::error::{Result, SyneryError};
use crate::metadata::{InstanceData, JsonMetadataStore, MetadataStore};
use crate::storage::ShardedTableStore;
use crate::table::{Row, Schema, Table};

/// An open database instance
///
/// ## Lifecycle: Open → Disposed
///
/// `open` fails if the lock marker already exists, then creates it.
/// `dispose` (also run on drop) removes it. The marker is advisory: another
/// process that ignores it is not stopped.
///
/// ## Concurrency Model: Single Writer
///
/// - **Mutations** (create/update/delete/rename): serialized by `write_lock`;
///   shards are written first, then the registry, then the metadata store
/// - **Reads** (load/is_table): take the registry read lock only long enough
///   to clone the schema; shard decoding runs without any lock held
pub struct Database {
    /// Instance configuration
    config: Config,

    /// `<data_dir>/.lock`
    lock_path: PathBuf,

    /// Shard files under `<data_dir>/tables`
    store: ShardedTableStore,

    /// Schema registry persistence
    metadata: Box<dyn MetadataStore>,

    /// Table name → schema
    registry: RwLock<BTreeMap<String, Schema>>,

    /// Serializes mutating operations
    write_lock: Mutex<()>,

    disposed: AtomicBool,
}

impl Database {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const LOCK_FILENAME: &'static str = ".lock";
    const TABLE_DIR: &'static str = "tables";

    /// Open the instance in `config.data_dir` with the JSON metadata store
    pub fn open(config: Config) -> Result<Self> {
        let metadata = JsonMetadataStore::new(config.metadata_path());
        Self::open_with_metadata(config, Box::new(metadata))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified working directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Open with a caller-supplied metadata store
    ///
    /// On open:
    /// 1. Check the working directory exists and is writable
    /// 2. Create the lock marker (fails if present)
    /// 3. Load the registry
    /// 4. Ensure the table directory exists
    pub fn open_with_metadata(config: Config, metadata: Box<dyn MetadataStore>) -> Result<Self> {
        crate::storage::layout::ensure_writable_dir(&config.data_dir)?;

        let lock_path = config.data_dir.join(Self::LOCK_FILENAME);
        Self::acquire_lock(&lock_path)?;

        match Self::load_state(&config, metadata.as_ref()) {
            Ok((registry, store)) => {
                tracing::info!(
                    data_dir = %config.data_dir.display(),
                    tables = registry.len(),
                    "opened database"
                );
                Ok(Self {
                    config,
                    lock_path,
                    store,
                    metadata,
                    registry: RwLock::new(registry),
                    write_lock: Mutex::new(()),
                    disposed: AtomicBool::new(false),
                })
            }
            Err(e) => {
                // Leave the directory openable after a failed start
                if let Err(remove_err) = fs::remove_file(&lock_path) {
                    tracing::warn!("failed to remove lock marker after open error: {}", remove_err);
                }
                Err(e)
            }
        }
    }

    // =========================================================================
    // Factories
    // =========================================================================

    /// Create a new empty schema
    pub fn new_schema(&self) -> Result<Schema> {
        self.check_state()?;
        Ok(Schema::new())
    }

    /// Create a new table from a schema and optional rows
    pub fn new_table(&self, schema: Schema, rows: Option<Vec<Row>>) -> Result<Table> {
        self.check_state()?;
        match rows {
            Some(rows) => Table::with_rows(schema, rows),
            None => Ok(Table::new(schema)),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a new table. Fails with `TableExists` if the name is registered.
    pub fn create_table(&self, name: &str, table: &Table) -> Result<()> {
        self.store_table(name, table, StoreMode::Create)
    }

    /// Replace an existing table. Fails with `TableNotFound` if the name is
    /// not registered.
    pub fn update_table(&self, name: &str, table: &Table) -> Result<()> {
        self.store_table(name, table, StoreMode::Update)
    }

    /// Write the table's shards, then register its schema and persist the
    /// registry. The registry is only touched once the shards are written.
    pub fn create_or_update_table(&self, name: &str, table: &Table) -> Result<()> {
        self.store_table(name, table, StoreMode::Upsert)
    }

    /// Remove a table's shards and registry entry.
    ///
    /// Returns true only if both shards and a registry entry existed.
    pub fn delete_table(&self, name: &str) -> Result<bool> {
        self.check_state()?;
        require_name(name, "delete")?;

        let _write_guard = self.write_lock.lock();

        let files_deleted = self.store.delete(name)?;
        let schema_removed = self.registry.write().remove(name).is_some();
        self.persist_registry()?;

        tracing::info!(table = name, files_deleted, schema_removed, "deleted table");
        Ok(files_deleted && schema_removed)
    }

    /// Rename a table. Fails with `TableNotFound` if `from` is unknown and
    /// `TableExists` if `to` is taken; nothing is moved in either case.
    ///
    /// Returns whether any shard files were moved. The registry change is
    /// persisted like every other mutation.
    pub fn rename_table(&self, from: &str, to: &str) -> Result<bool> {
        self.check_state()?;
        require_name(from, "rename (source)")?;
        require_name(to, "rename (destination)")?;

        let _write_guard = self.write_lock.lock();

        if !self.is_registered(from) {
            return Err(SyneryError::TableNotFound(from.to_string()));
        }
        if self.is_registered(to) {
            return Err(SyneryError::TableExists(to.to_string()));
        }

        let files_renamed = self.store.rename(from, to)?;
        {
            let mut registry = self.registry.write();
            if let Some(schema) = registry.remove(from) {
                registry.insert(to.to_string(), schema);
            }
        }
        self.persist_registry()?;

        tracing::info!(from = from, to = to, files_renamed, "renamed table");
        Ok(files_renamed)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Load a table with a copy of its registered schema
    pub fn load_table(&self, name: &str) -> Result<Table> {
        self.check_state()?;
        require_name(name, "load")?;

        let schema = self
            .registry
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| SyneryError::TableNotFound(name.to_string()))?;

        self.store.read(name, schema)
    }

    /// Whether `name` is registered
    pub fn is_table(&self, name: &str) -> Result<bool> {
        self.check_state()?;
        Ok(self.is_registered(name))
    }

    /// Snapshot of the registry
    pub fn schemas(&self) -> Result<BTreeMap<String, Schema>> {
        self.check_state()?;
        Ok(self.registry.read().clone())
    }

    /// Registered table names, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.check_state()?;
        Ok(self.registry.read().keys().cloned().collect())
    }

    /// Shard files currently on disk for `name`
    pub fn shard_paths(&self, name: &str) -> Result<Vec<PathBuf>> {
        self.check_state()?;
        self.store.shard_paths(name)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the instance: remove the lock marker and refuse further
    /// calls. Idempotent.
    pub fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        match fs::remove_file(&self.lock_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(SyneryError::Io(e)),
        }

        tracing::info!(data_dir = %self.config.data_dir.display(), "disposed database");
        Ok(())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the working directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the lock marker path
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Get the table directory path (where shards are stored)
    pub fn table_dir(&self) -> &Path {
        self.store.table_dir()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Create the marker with create-new semantics so two racing opens cannot
    /// both succeed on filesystems that honor it
    fn acquire_lock(lock_path: &Path) -> Result<()> {
        match OpenOptions::new().write(true).create_new(true).open(lock_path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::warn!(lock = %lock_path.display(), "database is already open");
                Err(SyneryError::LockHeld(lock_path.to_path_buf()))
            }
            Err(e) => Err(SyneryError::Config(format!(
                "cannot create lock marker '{}': {}",
                lock_path.display(),
                e
            ))),
        }
    }

    fn load_state(
        config: &Config,
        metadata: &dyn MetadataStore,
    ) -> Result<(BTreeMap<String, Schema>, ShardedTableStore)> {
        let instance = metadata.load()?;

        let table_dir = config.data_dir.join(Self::TABLE_DIR);
        fs::create_dir_all(&table_dir).map_err(|e| {
            SyneryError::Config(format!(
                "cannot create table directory '{}': {}",
                table_dir.display(),
                e
            ))
        })?;

        let store = ShardedTableStore::open(
            &table_dir,
            config.shard_size_limit,
            &config.shard_extension,
        )?;

        Ok((instance.schemas, store))
    }

    /// Shared path of the three store calls. The registration check runs
    /// under `write_lock` so two creators of one name cannot both pass it.
    fn store_table(&self, name: &str, table: &Table, mode: StoreMode) -> Result<()> {
        self.check_state()?;
        validate_table(name, table)?;

        let _write_guard = self.write_lock.lock();

        match (mode, self.is_registered(name)) {
            (StoreMode::Create, true) => {
                return Err(SyneryError::TableExists(name.to_string()));
            }
            (StoreMode::Update, false) => {
                return Err(SyneryError::TableNotFound(name.to_string()));
            }
            _ => {}
        }

        self.store.write(name, table)?;

        let schema = table.schema().cloned().unwrap_or_default();
        self.registry.write().insert(name.to_string(), schema);
        self.persist_registry()?;

        tracing::info!(table = name, rows = table.len(), "stored table");
        Ok(())
    }

    fn check_state(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(SyneryError::Disposed);
        }
        Ok(())
    }

    fn is_registered(&self, name: &str) -> bool {
        self.registry.read().contains_key(name)
    }

    fn persist_registry(&self) -> Result<()> {
        let data = InstanceData {
            schemas: self.registry.read().clone(),
        };
        self.metadata.save(&data)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            tracing::warn!("failed to dispose database on drop: {}", e);
        }
    }
}

/// Registration precondition of a store call
#[derive(Debug, Clone, Copy)]
enum StoreMode {
    Create,
    Update,
    Upsert,
}

/// Name non-empty, schema present with at least one field, rows matching it
fn validate_table(name: &str, table: &Table) -> Result<()> {
    require_name(name, "store")?;

    let schema = table.schema().ok_or_else(|| {
        SyneryError::Validation(format!("table '{}' has no schema", name))
    })?;
    if schema.is_empty() {
        return Err(SyneryError::Validation(format!(
            "table '{}' has a schema without fields",
            name
        )));
    }

    table.validate()
}

fn require_name(name: &str, operation: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SyneryError::Validation(format!(
            "{} requires a non-empty table name",
            operation
        )));
    }
    Ok(())
}
