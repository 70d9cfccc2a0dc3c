//! Product registry CLI
//!
//! Command-line front end for recording product lifecycle events in a
//! local registry file.
//!
//! # Commands
//!
//! - `init` - Seed the bootstrap products
//! - `register` - Register a new product
//! - `modify` - Update a product's status, owner, description or category
//! - `transfer` - Assign a product to a new owner
//! - `get` / `exists` / `list` - Query products
//! - `invoke` - Call a registry function by name with positional arguments
//! - `compact` - Drop superseded records from the store file

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use prodreg_core::{Invocation, NewProduct, Operation, ProductUpdate};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Product registry command-line tools.
#[derive(Parser)]
#[command(name = "prodreg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the registry store file
    #[arg(global = true, short, long, default_value = "prodreg.db")]
    path: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Output format
    #[arg(global = true, short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON, using the ledger record field names
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the registry with the sample products
    Init,

    /// Register a new product
    Register {
        /// Product ID
        id: String,
        /// Product name
        name: String,
        /// Initial owner
        owner: String,
        /// Description
        #[arg(default_value = "")]
        description: String,
        /// Category
        #[arg(default_value = "")]
        category: String,
    },

    /// Update a product; omitted fields stay unchanged
    Modify {
        /// Product ID
        id: String,
        /// New status
        #[arg(long, default_value = "")]
        status: String,
        /// New owner
        #[arg(long, default_value = "")]
        owner: String,
        /// New description
        #[arg(long, default_value = "")]
        description: String,
        /// New category
        #[arg(long, default_value = "")]
        category: String,
    },

    /// Transfer a product to a new owner
    Transfer {
        /// Product ID
        id: String,
        /// The new owner
        new_owner: String,
    },

    /// Show one product
    Get {
        /// Product ID
        id: String,
    },

    /// Check whether a product exists
    Exists {
        /// Product ID
        id: String,
    },

    /// List all products in ID order
    List,

    /// Call a registry function by name, e.g. `invoke RegisterProduct p1 Widget Acme d c`
    Invoke {
        /// Function name
        function: String,
        /// Positional arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Rewrite the store file without superseded records
    Compact,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the flag.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let op = match cli.command {
        Commands::Init => Operation::Initialize,
        Commands::Register {
            id,
            name,
            owner,
            description,
            category,
        } => Operation::Register(NewProduct::new(id, name, owner, description, category)),
        Commands::Modify {
            id,
            status,
            owner,
            description,
            category,
        } => Operation::Modify {
            id,
            update: ProductUpdate::from_args(&status, &owner, &description, &category),
        },
        Commands::Transfer { id, new_owner } => Operation::TransferOwnership { id, new_owner },
        Commands::Get { id } => Operation::Retrieve { id },
        Commands::Exists { id } => Operation::Exists { id },
        Commands::List => Operation::ListAll,
        Commands::Invoke { function, args } => Invocation::new(function, args).parse()?,
        Commands::Compact => return commands::compact::run(&cli.path, cli.format),
        Commands::Version => {
            println!("prodreg CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("prodreg core v{}", prodreg_core::VERSION);
            return Ok(());
        }
    };

    commands::execute::run(&cli.path, op, cli.format)?;
    Ok(())
}
