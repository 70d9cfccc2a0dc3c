//! CLI command implementations.

pub mod compact;
pub mod execute;
pub mod output;
