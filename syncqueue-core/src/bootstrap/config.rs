//! Configuration loading

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::Config;

/// Locate the config file: `SYNCQUEUE_CONFIG_PATH`, then `./config.yaml`,
/// then the `/config/config.yaml` mount path.
fn find_config_file() -> Option<String> {
    std::env::var("SYNCQUEUE_CONFIG_PATH")
        .ok()
        .filter(|p| Path::new(p).exists())
        .or_else(|| {
            ["config.yaml", "/config/config.yaml"]
                .into_iter()
                .find(|p| Path::new(p).exists())
                .map(str::to_string)
        })
}

/// Load configuration from a file or environment variables and validate it.
///
/// An explicit `path` wins over the search order. Runs before logging is
/// initialized, so progress goes to stderr.
pub fn load_config(path: Option<&str>) -> Result<Config> {
    let config_path = path.map(str::to_string).or_else(find_config_file);

    let config = match config_path {
        Some(path) => {
            eprintln!("Loading config from {path}");
            Config::from_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load {path}: {e}"))?
        }
        None => {
            eprintln!("No config file found, using environment variables");
            Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?
        }
    };

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Config validation error: {error}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    info!("Configuration loaded and validated successfully");
    Ok(config)
}
