use std::{fs, path::Path};
use crate::config::service::ServiceConfig;
use crate::config::settings::LoggingConfig;
use crate::observability::metrics::get_metrics;
use anyhow::Result;
use regex::Regex;
use tracing::error;

/// Load config from YAML file, expanding `${VAR:default}` placeholders
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_validation_errors.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }

    Ok(service_config)
}

pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secrets::SecretStoreConfig;
    use crate::config::settings::LogFormat;
    use serial_test::serial;

    #[test]
    #[serial]
    fn expands_set_and_defaulted_variables() {
        std::env::set_var("LOADER_TEST_PORT", "9090");
        std::env::remove_var("LOADER_TEST_UNSET");
        let out = expand_env_vars("port: ${LOADER_TEST_PORT:8080}\nhost: ${LOADER_TEST_UNSET:0.0.0.0}\nx: ${LOADER_TEST_UNSET}").unwrap();
        std::env::remove_var("LOADER_TEST_PORT");

        assert_eq!(out, "port: 9090\nhost: 0.0.0.0\nx: ");
    }

    #[tokio::test]
    async fn empty_document_yields_defaults() {
        let cfg = parse_config("{}".to_string()).await.unwrap();

        assert_eq!(cfg.settings.server.host, "0.0.0.0");
        assert_eq!(cfg.settings.server.port, 8080);
        assert!(cfg.settings.metrics.is_enabled);
        assert_eq!(cfg.settings.metrics.path, "/metrics");
        assert_eq!(cfg.settings.logging.unwrap().format, LogFormat::Compact);
        assert_eq!(cfg.secrets.name, "lag-live-agora");
        assert_eq!(cfg.secrets.store, SecretStoreConfig::Env);
    }

    #[tokio::test]
    async fn parses_full_document() {
        let yaml = r#"
settings:
  server:
    host: 127.0.0.1
    port: 9000
  metrics:
    is_enabled: false
    path: /internal/metrics
  logging:
    level: debug
    format: json
secrets:
  name: rtc-prod
  store:
    type: http
    url: https://vault.local/v1/secrets
    bearer_from_env: VAULT_TOKEN
"#;
        let cfg = parse_config(yaml.to_string()).await.unwrap();

        assert_eq!(cfg.settings.server.port, 9000);
        assert!(!cfg.settings.metrics.is_enabled);
        assert_eq!(cfg.settings.logging.unwrap().level, "debug");
        assert_eq!(cfg.secrets.name, "rtc-prod");
        assert_eq!(
            cfg.secrets.store,
            SecretStoreConfig::Http {
                url: "https://vault.local/v1/secrets".to_string(),
                bearer_from_env: Some("VAULT_TOKEN".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn unknown_store_type_is_rejected() {
        let yaml = "secrets:\n  store:\n    type: s3\n";
        assert!(parse_config(yaml.to_string()).await.is_err());
    }
}
