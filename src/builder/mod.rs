//! # Token builder
//!
//! The seam between the request pipeline and the signed token encoding.
//! The pipeline only ever talks to [`TokenBuilder`]; the bundled
//! [`access_token::AccessTokenBuilder`] is one implementation of it.

use thiserror::Error;

use crate::secrets::Credentials;

pub mod access_token;

pub use access_token::AccessTokenBuilder;

/// Privilege level inside an RTC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcRole {
    Publisher,
    Subscriber,
}

/// Messaging roles. Only plain users are ever issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmRole {
    User,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid appID")]
    InvalidAppId,

    #[error("invalid appCertificate")]
    InvalidAppCertificate,

    #[error("{field} too long: {len} bytes")]
    FieldTooLong { field: &'static str, len: usize },
}

/// External token-construction capability.
///
/// Every call is pure apart from salt generation: identical inputs may still
/// yield different strings, and nothing is retained between calls.
pub trait TokenBuilder: Send + Sync {
    fn build_rtc_with_uid(
        &self,
        credentials: &Credentials,
        channel: &str,
        uid: u32,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, BuildError>;

    fn build_rtc_with_account(
        &self,
        credentials: &Credentials,
        channel: &str,
        account: &str,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, BuildError>;

    fn build_rtm(
        &self,
        credentials: &Credentials,
        user_id: &str,
        role: RtmRole,
        expire_at: u32,
    ) -> Result<String, BuildError>;
}
