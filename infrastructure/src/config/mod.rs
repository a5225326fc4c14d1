//! Configuration file loading for finteam
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `FINTEAM_<SECTION>__<KEY>` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./finteam.toml` or `./.finteam.toml`
//! 4. Global: `$XDG_CONFIG_HOME/finteam/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigValidationError, FileBackendConfig, FileConfig, FileGenerationConfig,
    FileRetryConfig, FileTeamConfig, FileToolsConfig,
};
pub use loader::ConfigLoader;
