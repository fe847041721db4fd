//! CLI command implementations

pub mod import;
pub mod serve;
pub mod stats;

use std::path::PathBuf;

use anyhow::{Context, Result};
use roster_core::config::Config;
use roster_core::RosterContext;

/// Get the roster directory from environment or default
pub fn get_roster_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ROSTER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".roster"))
        .context("Could not find home directory; set ROSTER_DIR")
}

/// Load settings and install logging
pub fn load_config() -> Result<Config> {
    let roster_dir = get_roster_dir()?;
    let config = Config::load(&roster_dir)
        .with_context(|| format!("Failed to load settings from {:?}", roster_dir))?;
    roster_core::logging::init(&config.logging)?;
    Ok(config)
}

/// Build a context with an empty store
pub fn get_context() -> Result<RosterContext> {
    Ok(RosterContext::new(load_config()?))
}
