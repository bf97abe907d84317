use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use derive_builder::Builder;
use serde::Deserialize;

/// Limits on how long a search may run. `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Builder, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct SolverConfig {
    #[builder(setter(strip_option))]
    pub max_states: Option<usize>,

    #[builder(setter(strip_option))]
    pub max_seconds: Option<f32>,

    /// Log progress every this many states (0 to stay quiet).
    pub progress_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_states: None,
            max_seconds: None,
            progress_interval: 10_000,
        }
    }
}

/// Settings file for the `amphipod` binary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub solver: SolverConfig,

    /// Rows inserted beneath the top row of every slot before solving.
    pub extra_rows: Vec<String>,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Settings> {
        serde_json::from_str(text).context("Invalid settings")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        Settings::from_json(&text).with_context(|| format!("In {}", path.display()))
    }
}
