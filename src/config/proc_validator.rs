//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - server bind, metrics path, logging level
//! - secret name and store invariants

use std::path::Path;
use tracing::{error, info};

use crate::config::secrets::{SecretStoreConfig, SecretsConfig};
use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;

/// Paths owned by the token routes; metrics must not shadow them.
const RESERVED_PREFIXES: [&str; 4] = ["/ping", "/rtc", "/rtm", "/rte"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_secrets(&cfg.secrets, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port == 0 {
        errors.push("settings.server.port must be in range 1-65535".to_string());
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if metrics.is_enabled {
        if !metrics.path.starts_with('/') {
            errors.push(format!(
                "settings.metrics.path '{}' must start with '/'",
                metrics.path
            ));
        }
        if let Some(prefix) = RESERVED_PREFIXES
            .iter()
            .find(|prefix| metrics.path.starts_with(*prefix))
        {
            errors.push(format!(
                "settings.metrics.path '{}' collides with token route '{}'",
                metrics.path, prefix
            ));
        }
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_secrets(secrets: &SecretsConfig, errors: &mut Vec<String>) {
    if secrets.name.trim().is_empty() {
        errors.push("secrets.name must not be empty".to_string());
    }

    match &secrets.store {
        SecretStoreConfig::Env => {}
        SecretStoreConfig::File { dir } => {
            if !Path::new(dir).is_absolute() {
                errors.push(format!("secrets.store.dir '{}' must be an absolute path", dir));
            }
        }
        SecretStoreConfig::Http { url, bearer_from_env } => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("secrets.store.url '{}' must be an http(s) URL", url));
            }
            if let Some(var) = bearer_from_env {
                if var.is_empty() {
                    errors.push("secrets.store.bearer_from_env must not be empty".to_string());
                }
            }
        }
    }
}
