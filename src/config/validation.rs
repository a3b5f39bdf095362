use std::collections::HashSet;

use super::{AppConfig, ConfigError};

/// Validate the full application config, returning an error if any rule is violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is violated.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_server_config(config)?;
    validate_backend_config(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn validate_server_config(config: &AppConfig) -> Result<(), ConfigError> {
    let server = &config.server;
    if server.timeout == 0 {
        return Err(validation_err("server.timeout must be greater than 0"));
    }
    if let Some(worker_threads) = server.runtime_worker_threads {
        if worker_threads == 0 {
            return Err(validation_err(
                "server.runtime_worker_threads must be greater than 0 when set",
            ));
        }
    }
    let base_path = server.base_path.trim();
    if !base_path.is_empty() && !base_path.starts_with('/') {
        return Err(validation_err("server.base_path must start with '/' when set"));
    }
    Ok(())
}

fn validate_backend_config(config: &AppConfig) -> Result<(), ConfigError> {
    let backend = &config.backend;
    let parsed = url::Url::parse(backend.base_url.trim()).map_err(|err| {
        validation_err(format!("backend.base_url is not a valid URL: {err}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(validation_err(
            "backend.base_url must use http:// or https://",
        ));
    }
    if !backend.chat_path.starts_with('/') {
        return Err(validation_err("backend.chat_path must start with '/'"));
    }
    if backend.default_model.trim().is_empty() {
        return Err(validation_err("backend.default_model cannot be empty"));
    }

    let mut seen = HashSet::new();
    for model in &backend.models {
        let id = model.id();
        if id.trim().is_empty() {
            return Err(validation_err("backend.models contains an empty model id"));
        }
        if !seen.insert(id) {
            return Err(validation_err(format!(
                "backend.models: duplicate model entry '{id}'"
            )));
        }
    }
    Ok(())
}

fn validate_log_level(config: &AppConfig) -> Result<(), ConfigError> {
    let valid_levels = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL", "DISABLED"];
    if !valid_levels.contains(&config.features.log_level.to_uppercase().as_str()) {
        return Err(validation_err(format!(
            "log_level must be one of {valid_levels:?}"
        )));
    }
    Ok(())
}
