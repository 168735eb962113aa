//! Configuration system for the Tally worklog server.
//!
//! Provides TOML-based configuration with:
//! - Sections for the HTTP server, login tokens, session cookie,
//!   per-user preferences and logging
//! - Config file layering (user config dir + project-local overrides)
//! - Validation of values that parse but cannot be used

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, user_config_dir,
    user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
