//! # Channel Token Service Library
//!
//! Issues short-lived signed access tokens for real-time audio/video (RTC)
//! and messaging (RTM) channels over HTTP.
//!
//! Modules:
//! - `config`: service configuration, loading and validation
//! - `secrets`: startup credential provisioning from a secret store
//! - `issuer`: request normalization, expiry resolution and dispatch
//! - `builder`: token construction seam and the access-token builder
//! - `server`: axum routes, response shaping and cache headers

pub mod builder;
pub mod config;
pub mod helpers;
pub mod issuer;
pub mod observability;
pub mod secrets;
pub mod server;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::service::ServiceConfig;
pub use crate::issuer::TokenDispatcher;
