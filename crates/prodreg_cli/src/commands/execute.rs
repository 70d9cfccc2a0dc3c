//! Runs one registry operation against the store file.

use crate::commands::output;
use crate::OutputFormat;
use prodreg_core::{Operation, ProductRegistry, Response, SystemClock};
use prodreg_storage::FileStore;
use std::path::Path;
use tracing::info;

/// Opens the store at `path`, runs `op`, syncs and prints the result.
pub fn run(
    path: &Path,
    op: Operation,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = run_quiet(path, op)?;
    output::print(&response, format)?;
    Ok(())
}

/// Runs `op` and returns the response without printing it.
pub fn run_quiet(path: &Path, op: Operation) -> Result<Response, Box<dyn std::error::Error>> {
    let store = FileStore::open_with_create_dirs(path)?;
    let registry = ProductRegistry::new(store, SystemClock);

    let mutation = op.is_mutation();
    let function = op.function_name();
    let response = registry.execute(op)?;

    if mutation {
        registry.store().sync()?;
        info!(function, path = %path.display(), "committed");
    }
    Ok(response)
}
