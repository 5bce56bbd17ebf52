use std::path::{Path, PathBuf};
use std::{env, future::Future};

use reqwest::Client;
use tracing::debug;

use crate::config::secrets::SecretStoreConfig;
use crate::secrets::SecretError;

/// Key-value secret source: secret name in, raw JSON bundle out.
pub trait FetchSecret {
    fn fetch_secret(&self, name: &str) -> impl Future<Output = Result<String, SecretError>> + Send;
}

#[derive(Debug, Clone)]
pub enum SecretStoreKind {
    Env(EnvSecretStore),
    File(FileSecretStore),
    Http(HttpSecretStore),
}

impl SecretStoreKind {
    pub fn from_config(cfg: &SecretStoreConfig) -> Self {
        match cfg {
            SecretStoreConfig::Env => SecretStoreKind::Env(EnvSecretStore),
            SecretStoreConfig::File { dir } => SecretStoreKind::File(FileSecretStore::new(dir)),
            SecretStoreConfig::Http { url, bearer_from_env } => SecretStoreKind::Http(
                HttpSecretStore::new(Client::new(), url.to_owned(), bearer_from_env.to_owned()),
            ),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SecretStoreKind::Env(_) => "env",
            SecretStoreKind::File(_) => "file",
            SecretStoreKind::Http(_) => "http",
        }
    }
}

impl FetchSecret for SecretStoreKind {
    async fn fetch_secret(&self, name: &str) -> Result<String, SecretError> {
        match self {
            SecretStoreKind::Env(s) => s.fetch_secret(name).await,
            SecretStoreKind::File(s) => s.fetch_secret(name).await,
            SecretStoreKind::Http(s) => s.fetch_secret(name).await,
        }
    }
}

/// Reads the bundle from an environment variable derived from the secret name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    /// `lag-live-agora` -> `LAG_LIVE_AGORA`
    pub fn var_name(secret_name: &str) -> String {
        secret_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl FetchSecret for EnvSecretStore {
    async fn fetch_secret(&self, name: &str) -> Result<String, SecretError> {
        let var = Self::var_name(name);
        debug!("reading secret '{}' from env var {}", name, var);
        env::var(&var).map_err(|e| SecretError::unavailable(name, format!("{}: {}", var, e)))
    }
}

/// Reads `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl FetchSecret for FileSecretStore {
    async fn fetch_secret(&self, name: &str) -> Result<String, SecretError> {
        let path = self.path_for(name);
        debug!("reading secret '{}' from {}", name, path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SecretError::unavailable(name, format!("{}: {}", path.display(), e)))
    }
}

/// Fetches `GET <url>/<name>` from a secret-serving HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSecretStore {
    client: Client,
    url: String,
    bearer_from_env: Option<String>,
}

impl HttpSecretStore {
    pub fn new(client: Client, url: String, bearer_from_env: Option<String>) -> Self {
        Self {
            client,
            url,
            bearer_from_env,
        }
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), name)
    }
}

impl FetchSecret for HttpSecretStore {
    async fn fetch_secret(&self, name: &str) -> Result<String, SecretError> {
        let url = self.url_for(name);
        let mut request = self.client.get(&url);

        if let Some(var) = &self.bearer_from_env {
            let bearer = env::var(var)
                .map_err(|e| SecretError::unavailable(name, format!("{}: {}", var, e)))?;
            request = request.bearer_auth(bearer);
        }

        debug!("fetching secret '{}' from {}", name, url);
        let response = request
            .send()
            .await
            .map_err(|e| SecretError::unavailable(name, format!("unable to fetch secret: {}", e)))?;
        if !response.status().is_success() {
            return Err(SecretError::unavailable(
                name,
                format!("HTTP request failed: {}", response.status()),
            ));
        }
        response
            .text()
            .await
            .map_err(|e| SecretError::unavailable(name, format!("unable to read secret: {}", e)))
    }
}
