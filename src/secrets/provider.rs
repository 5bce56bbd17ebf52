use serde::Deserialize;
use tracing::{error, info};

use crate::secrets::stores::FetchSecret;
use crate::secrets::{Credentials, SecretError};

/// JSON bundle stored under the secret name.
#[derive(Debug, Deserialize)]
pub struct SecretBundle {
    #[serde(rename = "APP_ID")]
    pub app_id: String,
    #[serde(rename = "APP_CERTIFICATE")]
    pub app_certificate: String,
    #[serde(rename = "BASE_URL", default)]
    pub base_url: Option<String>,
}

/// Fetch, decode and validate the credentials.
///
/// Any error here is fatal: the caller must not start serving requests.
pub async fn initialize<S: FetchSecret>(store: &S, secret_name: &str) -> Result<Credentials, SecretError> {
    let raw = store.fetch_secret(secret_name).await.inspect_err(|e| {
        error!("Failed to fetch secrets: {}", e);
    })?;

    let bundle: SecretBundle = serde_json::from_str(&raw)
        .map_err(|e| SecretError::unavailable(secret_name, format!("unable to parse secret: {}", e)))?;

    let credentials = Credentials::new(bundle.app_id, bundle.app_certificate);
    if !credentials.is_complete() {
        return Err(SecretError::EmptyCredentials {
            name: secret_name.to_owned(),
        });
    }

    info!(
        "credentials loaded from secret '{}' (app_id: {}, base_url: {})",
        secret_name,
        credentials.app_id(),
        bundle.base_url.as_deref().unwrap_or("-")
    );
    Ok(credentials)
}
