//! Compact command implementation.

use crate::OutputFormat;
use prodreg_storage::{CompactStats, FileStore};
use std::path::Path;
use tracing::info;

/// Runs the compact command.
pub fn run(path: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("store file not found: {}", path.display()).into());
    }

    let stats = compact(path)?;
    match format {
        OutputFormat::Json => println!("{}", stats_json(&stats)),
        OutputFormat::Text => print!("{}", render_stats(&stats)),
    }
    Ok(())
}

/// Compacts the store at `path` and returns the statistics.
pub fn compact(path: &Path) -> Result<CompactStats, Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;
    let stats = store.compact()?;
    info!(path = %path.display(), "compaction complete");
    Ok(stats)
}

fn stats_json(stats: &CompactStats) -> serde_json::Value {
    serde_json::json!({
        "records_before": stats.records_before,
        "records_after": stats.records_after,
        "bytes_before": stats.bytes_before,
        "bytes_after": stats.bytes_after,
    })
}

fn render_stats(stats: &CompactStats) -> String {
    let saved = stats.bytes_before.saturating_sub(stats.bytes_after);
    let percent = if stats.bytes_before > 0 {
        (saved as f64 / stats.bytes_before as f64) * 100.0
    } else {
        0.0
    };
    format!(
        "Compaction complete\n\
         \x20 Records:     {} -> {}\n\
         \x20 Size:        {} -> {} bytes\n\
         \x20 Space saved: {} bytes ({:.1}%)\n",
        stats.records_before,
        stats.records_after,
        stats.bytes_before,
        stats.bytes_after,
        saved,
        percent,
    )
}
