use std::sync::Arc;

use tracing::debug;

use crate::builder::{RtmRole, TokenBuilder};
use crate::issuer::params::{RtcIntent, RtmIntent, UidKind};
use crate::issuer::{parse_decimal_u64, IssueError};
use crate::secrets::Credentials;

/// Routes a normalized intent to the matching builder call.
#[derive(Clone)]
pub struct TokenDispatcher {
    credentials: Arc<Credentials>,
    builder: Arc<dyn TokenBuilder>,
}

impl TokenDispatcher {
    pub fn new(credentials: Arc<Credentials>, builder: Arc<dyn TokenBuilder>) -> Self {
        Self { credentials, builder }
    }

    pub fn build_rtc(&self, intent: &RtcIntent) -> Result<String, IssueError> {
        let token = match intent.uid_kind {
            UidKind::Account => {
                debug!("building RTC token for account in channel {}", intent.channel);
                self.builder.build_rtc_with_account(
                    &self.credentials,
                    &intent.channel,
                    &intent.subject,
                    intent.role,
                    intent.expire_at,
                )?
            }
            UidKind::Numeric => {
                let uid = parse_decimal_u64(&intent.subject).map_err(|reason| IssueError::MalformedUid {
                    raw: intent.subject.clone(),
                    reason,
                })?;
                debug!("building RTC token for uid {} in channel {}", uid, intent.channel);
                // builder uids are 32-bit; wider values are truncated
                self.builder.build_rtc_with_uid(
                    &self.credentials,
                    &intent.channel,
                    uid as u32,
                    intent.role,
                    intent.expire_at,
                )?
            }
        };
        Ok(token)
    }

    pub fn build_rtm(&self, intent: &RtmIntent) -> Result<String, IssueError> {
        Ok(self
            .builder
            .build_rtm(&self.credentials, &intent.subject, RtmRole::User, intent.expire_at)?)
    }
}
