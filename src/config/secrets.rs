use serde::Deserialize;

use crate::utils::constants::DEFAULT_SECRET_NAME;

/// ================================
/// Secret source for the signing credentials
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SecretsConfig {
    /// Name of the bundle holding APP_ID / APP_CERTIFICATE.
    #[serde(default = "default_secret_name")]
    pub name: String,
    #[serde(default)]
    pub store: SecretStoreConfig,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            name: default_secret_name(),
            store: SecretStoreConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretStoreConfig {
    /// Env var named after the secret (upper-cased, non-alphanumerics as `_`).
    #[default]
    Env,
    /// `<dir>/<name>.json`
    File { dir: String },
    /// `GET <url>/<name>`, optionally authorized by a bearer token read from env.
    Http {
        url: String,
        bearer_from_env: Option<String>,
    },
}

fn default_secret_name() -> String {
    DEFAULT_SECRET_NAME.to_string()
}
