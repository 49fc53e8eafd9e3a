//! Command handlers -- one module per subcommand

pub mod config;
pub mod hints;
pub mod scan;

use std::path::{Path, PathBuf};

use tracing::debug;

use pagehint_core::config::PagehintConfig;

use crate::error::CliError;

/// Configuration file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pagehint.toml";

/// Effective configuration and where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: PagehintConfig,
    /// File path, or `"(defaults)"` when no file was read.
    pub source: String,
}

/// Resolve the configuration file to read, if any.
///
/// An explicit path must exist; the implicit `pagehint.toml` is optional.
pub async fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
            tokio::fs::try_exists(&candidate)
                .await
                .unwrap_or(false)
                .then_some(candidate)
        }
    }
}

/// Load defaults, then the file (if any), then environment overrides, and validate.
pub async fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, CliError> {
    match resolve_config_path(explicit).await {
        Some(path) => {
            let config = PagehintConfig::load(&path).await?;
            Ok(LoadedConfig {
                config,
                source: path.display().to_string(),
            })
        }
        None => {
            debug!("no configuration file, using defaults");
            let mut config = PagehintConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(LoadedConfig {
                config,
                source: "(defaults)".to_owned(),
            })
        }
    }
}
