//! Stats command - average age by name initial

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use super::get_context;
use crate::output;
use roster_core::services::{AverageAgeReport, ImportOptions};

pub fn run(files: &[PathBuf], json: bool) -> Result<()> {
    let ctx = get_context()?;

    for file in files {
        let result = ctx
            .import_service
            .import_file(file, ImportOptions::default())
            .with_context(|| format!("Failed to import {:?}", file))?;
        tracing::debug!(file = ?file, added = result.added, skipped = result.skipped, "loaded CSV");
    }

    let report = ctx.stats_service.average_age_by_initial()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report {
        AverageAgeReport::NoUsers { message } => output::warning(&message),
        AverageAgeReport::Groups(groups) => {
            println!("{}", "Average Age by Initial".bold());
            println!();

            if groups.is_empty() {
                println!("No users with a numeric age.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Initial", "Average Age"]);
            for (initial, average) in &groups {
                table.add_row(vec![initial.clone(), format!("{:.2}", average)]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
