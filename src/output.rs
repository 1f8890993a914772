//! Report serialization
//!
//! The aggregated tree is the contract with the dashboard: key names and
//! nesting shape are load-bearing, pretty-printing is not.

use crate::aggregate::TreeNode;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the report tree as pretty-printed JSON.
pub fn write_report(tree: &TreeNode, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to write dashboard data to {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, tree)
        .with_context(|| format!("Failed to write dashboard data to {}", output_path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write dashboard data to {}", output_path.display()))?;
    Ok(())
}
