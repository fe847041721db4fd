//! Import command - import users from CSV

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::get_context;
use crate::output;
use roster_core::services::{ImportOptions, RowOutcome, SkipReason};

/// Rows shown in the preview table before truncating
const PREVIEW_ROWS: usize = 10;

pub fn run(file: &Path, preview: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let result = ctx
        .import_service
        .import_file(file, ImportOptions { preview })
        .with_context(|| format!("Failed to import {:?}", file))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if preview {
        output::warning("PREVIEW MODE - No changes applied");
        println!();

        let mut table = output::create_table();
        table.set_header(vec!["Name", "Age"]);
        for user in result.added_users().take(PREVIEW_ROWS) {
            table.add_row(vec![user.name.clone(), user.age.to_string()]);
        }
        println!("{}", table);

        if result.added > PREVIEW_ROWS {
            println!("... and {} more", result.added - PREVIEW_ROWS);
        }
    } else {
        output::success("Import complete");
    }

    println!();
    println!("  Added: {}", result.added);
    println!("  Skipped: {}", result.skipped);

    let skips: Vec<_> = result
        .rows
        .iter()
        .filter_map(|outcome| match outcome {
            RowOutcome::Skipped { row, name, reason } => Some((row, name, reason)),
            RowOutcome::Added(_) => None,
        })
        .collect();

    if !skips.is_empty() {
        println!();
        let mut table = output::create_table();
        table.set_header(vec!["Row", "Name", "Reason"]);
        for (row, name, reason) in skips {
            let reason = match reason {
                SkipReason::Duplicate => "duplicate name".to_string(),
                SkipReason::Invalid(msg) => msg.clone(),
            };
            table.add_row(vec![row.to_string(), name.clone(), reason]);
        }
        println!("{}", "Skipped rows".bold());
        println!("{}", table);
    }

    Ok(())
}
