//! SyneryDB CLI
//!
//! Command-line interface for inspecting and maintaining a database directory.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use synerydb::{Config, Database};
use tracing_subscriber::{fmt, EnvFilter};

/// SyneryDB CLI
#[derive(Parser, Debug)]
#[command(name = "synerydb-cli")]
#[command(about = "CLI for SyneryDB table stores")]
#[command(version)]
struct Args {
    /// Working directory of the database
    #[arg(short, long, default_value = "./synerydb_data")]
    data_dir: String,

    /// Shard size limit in KiB
    #[arg(long, default_value = "2048")]
    shard_kb: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all tables
    Tables,

    /// Show the schema of a table
    Schema {
        /// Table name
        name: String,
    },

    /// Print the rows of a table
    Dump {
        /// Table name
        name: String,

        /// Maximum number of rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the shard files of a table
    Shards {
        /// Table name
        name: String,
    },

    /// Rename a table
    Rename {
        /// Current name
        from: String,

        /// New name
        to: String,
    },

    /// Delete a table
    Delete {
        /// Table name
        name: String,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,synerydb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .shard_size_limit(args.shard_kb * 1024)
        .build();

    let db = match Database::open(config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&db, args.command);

    if let Err(e) = db.dispose() {
        tracing::error!("Failed to close database: {}", e);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(db: &Database, command: Commands) -> synerydb::Result<()> {
    match command {
        Commands::Tables => {
            for (name, schema) in db.schemas()? {
                println!("{}\t{} fields", name, schema.len());
            }
        }
        Commands::Schema { name } => {
            let schema = db
                .schemas()?
                .remove(&name)
                .ok_or(synerydb::SyneryError::TableNotFound(name))?;
            for (position, field) in schema.fields().iter().enumerate() {
                println!("{}\t{}\t{}", position, field.name, field.field_type);
            }
        }
        Commands::Dump { name, limit } => {
            let table = db.load_table(&name)?;
            if let Some(schema) = table.schema() {
                let header: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
                println!("{}", header.join("\t"));
            }
            let limit = limit.unwrap_or(usize::MAX);
            for row in table.iter().take(limit) {
                let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                println!("{}", cells.join("\t"));
            }
        }
        Commands::Shards { name } => {
            for path in db.shard_paths(&name)? {
                let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                println!("{}\t{} bytes", path.display(), size);
            }
        }
        Commands::Rename { from, to } => {
            let moved = db.rename_table(&from, &to)?;
            println!("renamed '{}' to '{}' (shards moved: {})", from, to, moved);
        }
        Commands::Delete { name } => {
            let deleted = db.delete_table(&name)?;
            println!("deleted '{}': {}", name, deleted);
        }
    }
    Ok(())
}
