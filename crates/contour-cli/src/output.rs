//! Shared output helpers.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::OutputFormat;

/// Print a result in JSON mode. Text mode is handled by each command.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Json = format {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }
}

/// Write a value to `path` as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}
