//! `trackscan-config`: client configuration.
//!
//! Provides:
//! - Typed config schema (backend connection, logging)
//! - YAML read/write
//! - `${ENV_VAR}` substitution and `TRACKSCAN_*` overrides
//! - Default value application
//! - Validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{BackendConfig, LoggingConfig, TrackscanConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, and validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<TrackscanConfig> {
    let raw_config = load_config(path).await?;

    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: TrackscanConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(apply_env_overrides(config));

    ensure_valid(&config)?;
    Ok(config)
}

/// Point the config at another backend, rejecting URLs that fail validation.
///
/// The config is left untouched when the new URL is rejected.
pub fn override_base_url(config: &mut TrackscanConfig, url: impl Into<String>) -> Result<()> {
    let mut candidate = config.clone();
    candidate.set_base_url(url);
    ensure_valid(&candidate)?;
    *config = candidate;
    Ok(())
}

fn ensure_valid(config: &TrackscanConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }
    Ok(())
}
