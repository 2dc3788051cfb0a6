//! Environment handling for config values.
//!
//! - `${VAR_NAME}` in any string value is replaced at load time
//!   (uppercase `[A-Z_][A-Z0-9_]*` names only; `$${VAR}` keeps a literal `${VAR}`)
//! - `TRACKSCAN_*` variables override individual settings

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{BackendConfig, LoggingConfig, TrackscanConfig};

/// Overrides `backend.baseUrl`.
pub const ENV_API_URL: &str = "TRACKSCAN_API_URL";

/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "TRACKSCAN_LOG_LEVEL";

/// Overrides `backend.demoFallback` (`0`/`false`/`off` disables).
pub const ENV_DEMO_FALLBACK: &str = "TRACKSCAN_DEMO_FALLBACK";

/// Matches `${VAR}` with an optional leading `$` escape.
static ENV_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references from `env`.
///
/// Fails on the first variable that is unset or empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute(value, env, "")?)
}

fn substitute(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => substitute_string(s, env, path).map(Value::String),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), substitute(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing = None;
    let replaced = ENV_REF.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(replaced.into_owned()),
    }
}

/// Apply `TRACKSCAN_*` overrides from the process environment.
pub fn apply_env_overrides(config: TrackscanConfig) -> TrackscanConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

pub fn apply_env_overrides_with(
    mut config: TrackscanConfig,
    env: &HashMap<String, String>,
) -> TrackscanConfig {
    if let Some(url) = env.get(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.set_base_url(url.trim());
    }
    if let Some(level) = env.get(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        config
            .logging
            .get_or_insert_with(LoggingConfig::default)
            .level = Some(level.trim().to_string());
    }
    if let Some(flag) = env.get(ENV_DEMO_FALLBACK) {
        let enabled = !matches!(
            flag.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "no"
        );
        config
            .backend
            .get_or_insert_with(BackendConfig::default)
            .demo_fallback = Some(enabled);
    }
    config
}
