//! CLI command implementations for sqlgate.

pub mod check;
pub mod serve;

use anyhow::{Context, Result};
use sqlgate_core::GateConfig;
use std::path::Path;
use tracing::warn;

/// Load the configuration file, falling back to defaults when it is missing.
pub(crate) fn load_config(path: &Path) -> Result<GateConfig> {
    if path.exists() {
        GateConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))
    } else {
        warn!(config = %path.display(), "Config file not found, using defaults");
        Ok(GateConfig::default())
    }
}
