use serde::Deserialize;

use crate::builder::RtcRole;
use crate::issuer::expiry::resolve_expiry;
use crate::issuer::IssueError;
use crate::utils::constants::{DEFAULT_EXPIRY_SECONDS, ROLE_PUBLISHER, TOKEN_TYPE_USER_ACCOUNT};

/// `/rtc/{channelName}/{role}/{tokentype}/{uid}/` and `/rte/...`
#[derive(Debug, Clone, Deserialize)]
pub struct RtcPath {
    #[serde(rename = "channelName")]
    pub channel_name: String,
    pub role: String,
    pub tokentype: String,
    pub uid: String,
}

/// `/rtm/{uid}/`
#[derive(Debug, Clone, Deserialize)]
pub struct RtmPath {
    pub uid: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExpiryQuery {
    pub expiry: Option<String>,
}

impl ExpiryQuery {
    /// Picks the first `expiry` pair; repeated parameters are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self {
            expiry: pairs.into_iter().find(|(key, _)| key == "expiry").map(|(_, value)| value),
        }
    }

    /// Raw `expiry` value; an absent parameter means one hour. A present but
    /// empty parameter stays empty and fails to parse.
    pub fn raw(&self) -> &str {
        self.expiry.as_deref().unwrap_or(DEFAULT_EXPIRY_SECONDS)
    }
}

/// How the subject identity is interpreted by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidKind {
    Numeric,
    Account,
}

impl UidKind {
    pub fn from_segment(segment: &str) -> Self {
        match segment {
            TOKEN_TYPE_USER_ACCOUNT => UidKind::Account,
            // everything else, including typos, is a numeric uid
            _ => UidKind::Numeric,
        }
    }
}

pub fn role_from_segment(segment: &str) -> RtcRole {
    match segment {
        ROLE_PUBLISHER => RtcRole::Publisher,
        // exact match only: "Publisher", "subscriber", "" all subscribe
        _ => RtcRole::Subscriber,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcIntent {
    pub channel: String,
    pub subject: String,
    pub role: RtcRole,
    pub uid_kind: UidKind,
    pub expire_at: u32,
}

impl RtcIntent {
    /// Messaging intent for the same subject and expiry.
    pub fn rtm_intent(&self) -> RtmIntent {
        RtmIntent {
            subject: self.subject.clone(),
            expire_at: self.expire_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtmIntent {
    pub subject: String,
    pub expire_at: u32,
}

pub fn parse_rtc_params(path: RtcPath, query: &ExpiryQuery, now: u32) -> Result<RtcIntent, IssueError> {
    let expire_at = resolve_expiry(query.raw(), now)?;
    Ok(RtcIntent {
        role: role_from_segment(&path.role),
        uid_kind: UidKind::from_segment(&path.tokentype),
        channel: path.channel_name,
        subject: path.uid,
        expire_at,
    })
}

pub fn parse_rtm_params(path: RtmPath, query: &ExpiryQuery, now: u32) -> Result<RtmIntent, IssueError> {
    let expire_at = resolve_expiry(query.raw(), now)?;
    Ok(RtmIntent {
        subject: path.uid,
        expire_at,
    })
}
