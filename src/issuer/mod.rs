//! # Token-request pipeline
//!
//! Path/query parameters are normalized into an intent ([`params`]), the
//! relative expiry is resolved to an absolute timestamp ([`expiry`]) and the
//! intent is dispatched to the matching builder call ([`dispatcher`]).

pub mod dispatcher;
pub mod error;
pub mod expiry;
pub mod params;

pub use dispatcher::TokenDispatcher;
pub use error::{ErrorOutcome, IssueError, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Rtc,
    Rtm,
}

impl TokenKind {
    /// Name used in client-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            TokenKind::Rtc => "RTC",
            TokenKind::Rtm => "RTM",
        }
    }

    /// Metric label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Rtc => crate::utils::constants::KIND_RTC,
            TokenKind::Rtm => crate::utils::constants::KIND_RTM,
        }
    }
}

/// Base-10 unsigned parse. `u64::from_str` also accepts a leading `+`,
/// which is not a valid unsigned literal here.
pub(crate) fn parse_decimal_u64(raw: &str) -> Result<u64, String> {
    if raw.starts_with('+') {
        return Err("invalid digit found in string".to_string());
    }
    raw.parse::<u64>().map_err(|e| e.to_string())
}
