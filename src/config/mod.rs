//! Configuration parsing and types.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

use std::path::Path;

use tracing::info;

use crate::common::error::ConfigError;

pub use env::{apply_env_overrides, get_config_path};
pub use parser::load_config;
pub use types::*;
pub use validate::validate_config;

/// Load the config file (defaults if it does not exist), apply
/// environment overrides and validate the result.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    let config = if path.exists() {
        info!("Loading config from {}", path.display());
        load_config(path)?
    } else {
        info!("No config file at {}, using defaults and environment", path.display());
        Config::default()
    };

    let config = apply_env_overrides(config);
    validate_config(&config)?;
    Ok(config)
}
