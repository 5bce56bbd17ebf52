//! # Secret provisioning
//!
//! Credentials are fetched once at startup from a [`stores::SecretStoreKind`]
//! and then shared read-only with every request handler.

use std::fmt;

use thiserror::Error;

pub mod provider;
pub mod stores;

pub use provider::initialize;
pub use stores::{FetchSecret, SecretStoreKind};

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret '{name}' unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    #[error("secret '{name}' is not properly configured: APP_ID and APP_CERTIFICATE must be non-empty")]
    EmptyCredentials { name: String },
}

impl SecretError {
    pub fn unavailable(name: &str, reason: impl fmt::Display) -> Self {
        SecretError::Unavailable {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// Application identifier and certificate used to sign every token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_id: String,
    app_certificate: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_certificate: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_certificate: app_certificate.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_certificate(&self) -> &str {
        &self.app_certificate
    }

    pub fn is_complete(&self) -> bool {
        !self.app_id.is_empty() && !self.app_certificate.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[REDACTED]")
            .finish()
    }
}
