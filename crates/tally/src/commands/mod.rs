//! CLI command handlers.

pub mod config;
pub mod serve;

use std::path::Path;

use anyhow::{Context as _, Result};
use tally_config::LoadedConfig;
use tally_config::discovery::ConfigSource;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configuration after discovery and validation.
    pub loaded: LoadedConfig,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Load `explicit` if given, otherwise discover and merge the config layers.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    match explicit {
        Some(path) => {
            let config = tally_config::load_config_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            Ok(LoadedConfig {
                config,
                sources: vec![ConfigSource {
                    path: path.to_path_buf(),
                    loaded: true,
                }],
                warnings: Vec::new(),
            })
        }
        None => Ok(tally_config::load_config(None)?),
    }
}
