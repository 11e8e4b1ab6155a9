//! Demo configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Demo run plan (loaded from a TOML file or assembled from CLI flags)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    /// Scenario names to run; empty means "run everything"
    #[serde(default)]
    pub scenarios: Vec<String>,

    /// How many dispatch rounds each counting scenario performs
    #[serde(default = "default_rounds")]
    pub rounds: usize,
}

fn default_rounds() -> usize {
    1
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scenarios: Vec::new(),
            rounds: default_rounds(),
        }
    }
}

/// Load a demo configuration from a TOML file
pub fn load_config(path: &Path) -> Result<DemoConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: DemoConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
