use std::path::Path;
use anyhow::{anyhow, Result};

use crate::config::proc_loader::file_to_config;
use crate::config::proc_validator::validate_service_config;
use crate::config::service::ServiceConfig;

/// Values supplied on the command line or via env; they win over the YAML file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub secret_name: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, service_config: &mut ServiceConfig) {
        if let Some(port) = self.port {
            service_config.settings.server.port = port;
        }
        if let Some(name) = &self.secret_name {
            service_config.secrets.name = name.to_owned();
        }
    }
}

/// Load the YAML config when present, fall back to defaults otherwise,
/// then apply overrides and validate the result.
pub async fn run(config_path: &str, overrides: &ConfigOverrides) -> Result<ServiceConfig> {
    let path = Path::new(config_path);
    let mut service_config = if path.exists() {
        file_to_config(path)
            .await
            .map_err(|e| anyhow!("Invalid config format: {}", e))?
    } else {
        ServiceConfig::default()
    };

    overrides.apply(&mut service_config);

    validate_service_config(&service_config).await.map_err(|errors| {
        anyhow!(
            "config is not valid, total errors:{}, \n{}",
            errors.len(),
            errors.join("\n")
        )
    })?;
    Ok(service_config)
}
