//! CLI-specific configuration glue.
//!
//! Layers `GlobalOpts` flag overrides on top of the shared config crate.

use std::path::PathBuf;

use wifiguard_config::Config;
use wifiguard_core::{RouterConfig, WifiController};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file in effect: `--config`, else the platform path.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(wifiguard_config::config_path)
}

/// Load the layered config and apply CLI flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = wifiguard_config::load_config(global.config.as_deref())?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        cfg.router.url = Some(url.clone());
    }
    if global.insecure {
        cfg.router.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        cfg.router.timeout_secs = timeout;
    }
}

pub fn router_config(cfg: &Config, global: &GlobalOpts) -> Result<RouterConfig, CliError> {
    wifiguard_config::to_router_config(cfg).map_err(|e| match CliError::from(e) {
        CliError::MissingSetting { field, .. } => CliError::MissingSetting {
            field,
            path: config_path(global).display().to_string(),
        },
        CliError::NoCredentials { .. } => CliError::NoCredentials {
            path: config_path(global).display().to_string(),
        },
        other => other,
    })
}

pub fn build_controller(cfg: &Config, global: &GlobalOpts) -> Result<WifiController, CliError> {
    let router = router_config(cfg, global)?;
    Ok(WifiController::new(&router)?)
}
