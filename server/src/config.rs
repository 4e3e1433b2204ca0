//! Loading game tuning for the server binary
//!
//! Values come from [`GameConfig::default`], optionally overridden by a JSON
//! file holding any subset of its camelCase fields, then by command-line
//! flags.

use crate::error::AuthorityError;
use log::info;
use shared::GameConfig;
use std::fs;
use std::path::Path;

/// Command-line overrides applied on top of the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub tick_rate: Option<u32>,
    pub seed: Option<u64>,
}

pub fn parse_config(text: &str) -> Result<GameConfig, AuthorityError> {
    serde_json::from_str(text).map_err(AuthorityError::ConfigFile)
}

/// Builds the effective configuration and validates it.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<GameConfig, AuthorityError> {
    let mut config = match path {
        Some(path) => {
            info!("Loading game config from {}", path.display());
            parse_config(&fs::read_to_string(path)?)?
        }
        None => GameConfig::default(),
    };

    if let Some(tick_rate) = overrides.tick_rate {
        config.tick_rate = tick_rate;
    }
    if overrides.seed.is_some() {
        config.seed = overrides.seed;
    }

    config.validate()?;
    Ok(config)
}
