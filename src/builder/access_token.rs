use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::builder::{BuildError, RtcRole, RtmRole, TokenBuilder};
use crate::helpers::time::now_u32;
use crate::secrets::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub const VERSION: &str = "006";

/// Issue timestamp is stamped this far into the future.
const ISSUE_TS_OFFSET_SECONDS: u32 = 24 * 3600;
const MAX_SALT: u32 = 99_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u16)]
pub enum Privilege {
    JoinChannel = 1,
    PublishAudioStream = 2,
    PublishVideoStream = 3,
    PublishDataStream = 4,
    RtmLogin = 1000,
}

/// One version-006 access token under construction.
#[derive(Debug, Clone)]
pub struct AccessToken<'a> {
    app_id: &'a str,
    app_certificate: &'a str,
    channel: &'a str,
    uid: String,
    salt: u32,
    ts: u32,
    privileges: BTreeMap<u16, u32>,
}

impl<'a> AccessToken<'a> {
    pub fn new(credentials: &'a Credentials, channel: &'a str, uid: String) -> Self {
        let salt = rand::thread_rng().gen_range(1..=MAX_SALT);
        let ts = now_u32().wrapping_add(ISSUE_TS_OFFSET_SECONDS);
        Self::with_salt_and_ts(credentials, channel, uid, salt, ts)
    }

    pub fn with_salt_and_ts(
        credentials: &'a Credentials,
        channel: &'a str,
        uid: String,
        salt: u32,
        ts: u32,
    ) -> Self {
        Self {
            app_id: credentials.app_id(),
            app_certificate: credentials.app_certificate(),
            channel,
            uid,
            salt,
            ts,
            privileges: BTreeMap::new(),
        }
    }

    pub fn add_privilege(&mut self, privilege: Privilege, expire_at: u32) {
        self.privileges.insert(privilege as u16, expire_at);
    }

    pub fn build(&self) -> Result<String, BuildError> {
        if !is_hex_id(self.app_id) {
            return Err(BuildError::InvalidAppId);
        }
        if !is_hex_id(self.app_certificate) {
            return Err(BuildError::InvalidAppCertificate);
        }

        let message = self.pack_message();

        let mut mac = HmacSha256::new_from_slice(self.app_certificate.as_bytes())
            .map_err(|_| BuildError::InvalidAppCertificate)?;
        mac.update(self.app_id.as_bytes());
        mac.update(self.channel.as_bytes());
        mac.update(self.uid.as_bytes());
        mac.update(&message);
        let signature = mac.finalize().into_bytes();

        let mut content = Vec::with_capacity(2 + signature.len() + 8 + 2 + message.len());
        pack_bytes(&mut content, "signature", &signature)?;
        content.extend_from_slice(&crc32fast::hash(self.channel.as_bytes()).to_le_bytes());
        content.extend_from_slice(&crc32fast::hash(self.uid.as_bytes()).to_le_bytes());
        pack_bytes(&mut content, "message", &message)?;

        Ok(format!("{}{}{}", VERSION, self.app_id, STANDARD.encode(content)))
    }

    /// salt | ts | privilege map, little-endian, keys ascending
    fn pack_message(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10 + self.privileges.len() * 6);
        buf.extend_from_slice(&self.salt.to_le_bytes());
        buf.extend_from_slice(&self.ts.to_le_bytes());
        buf.extend_from_slice(&(self.privileges.len() as u16).to_le_bytes());
        for (key, value) in &self.privileges {
            buf.extend_from_slice(&key.to_le_bytes());
            buf.extend_from_slice(&value.to_le_bytes());
        }
        buf
    }
}

fn pack_bytes(buf: &mut Vec<u8>, field: &'static str, bytes: &[u8]) -> Result<(), BuildError> {
    let len = u16::try_from(bytes.len()).map_err(|_| BuildError::FieldTooLong {
        field,
        len: bytes.len(),
    })?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn is_hex_id(value: &str) -> bool {
    value.len() == 32 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// [`TokenBuilder`] producing version-006 access tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessTokenBuilder;

impl TokenBuilder for AccessTokenBuilder {
    fn build_rtc_with_uid(
        &self,
        credentials: &Credentials,
        channel: &str,
        uid: u32,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, BuildError> {
        // uid 0 is the wildcard and encodes as an empty uid string
        let account = if uid == 0 { String::new() } else { uid.to_string() };
        self.build_rtc_with_account(credentials, channel, &account, role, expire_at)
    }

    fn build_rtc_with_account(
        &self,
        credentials: &Credentials,
        channel: &str,
        account: &str,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, BuildError> {
        let mut token = AccessToken::new(credentials, channel, account.to_owned());
        token.add_privilege(Privilege::JoinChannel, expire_at);
        if role == RtcRole::Publisher {
            token.add_privilege(Privilege::PublishAudioStream, expire_at);
            token.add_privilege(Privilege::PublishVideoStream, expire_at);
            token.add_privilege(Privilege::PublishDataStream, expire_at);
        }
        token.build()
    }

    fn build_rtm(
        &self,
        credentials: &Credentials,
        user_id: &str,
        role: RtmRole,
        expire_at: u32,
    ) -> Result<String, BuildError> {
        let mut token = AccessToken::new(credentials, user_id, String::new());
        match role {
            RtmRole::User => token.add_privilege(Privilege::RtmLogin, expire_at),
        }
        token.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP_ID: &str = "970CA35de60c44645bbae8a215061b33";
    const APP_CERTIFICATE: &str = "5CFd2fd1755d40ecb72977518be15d3b";

    struct Decoded {
        signature: Vec<u8>,
        crc_channel: u32,
        crc_uid: u32,
        salt: u32,
        ts: u32,
        privileges: Vec<(u16, u32)>,
    }

    fn u16_at(b: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([b[at], b[at + 1]])
    }

    fn u32_at(b: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
    }

    fn decode(token: &str) -> Decoded {
        let prefix = format!("{}{}", VERSION, APP_ID);
        assert!(token.starts_with(&prefix), "unexpected prefix: {token}");
        let content = STANDARD.decode(&token[prefix.len()..]).expect("base64");

        let sig_len = u16_at(&content, 0) as usize;
        let signature = content[2..2 + sig_len].to_vec();
        let mut at = 2 + sig_len;
        let crc_channel = u32_at(&content, at);
        let crc_uid = u32_at(&content, at + 4);
        at += 8;
        let msg_len = u16_at(&content, at) as usize;
        let msg = &content[at + 2..at + 2 + msg_len];

        let count = u16_at(msg, 8) as usize;
        let privileges = (0..count)
            .map(|i| (u16_at(msg, 10 + i * 6), u32_at(msg, 12 + i * 6)))
            .collect();

        Decoded {
            signature,
            crc_channel,
            crc_uid,
            salt: u32_at(msg, 0),
            ts: u32_at(msg, 4),
            privileges,
        }
    }

    fn credentials() -> Credentials {
        Credentials::new(APP_ID, APP_CERTIFICATE)
    }

    #[test]
    fn matches_reference_vector() {
        let credentials = credentials();
        let mut token = AccessToken::with_salt_and_ts(
            &credentials,
            "7d72365eb983485397e3e3f9d460bdda",
            "2882341273".to_string(),
            1,
            1111111,
        );
        token.add_privilege(Privilege::JoinChannel, 1446455471);

        assert_eq!(
            token.build().unwrap(),
            "006970CA35de60c44645bbae8a215061b33IACV0fZUBw+72cVoL9eyGGh3Q6Poi8bgjwVLnyKSJyOXR7dIfRBXoFHlEAABAAAAR/QQAAEAAQCvKDdW"
        );
    }

    #[test]
    fn publisher_gets_join_and_publish_privileges() {
        let token = AccessTokenBuilder
            .build_rtc_with_uid(&credentials(), "room", 42, RtcRole::Publisher, 1_700_000_000)
            .unwrap();
        let decoded = decode(&token);

        assert_eq!(
            decoded.privileges,
            vec![(1, 1_700_000_000), (2, 1_700_000_000), (3, 1_700_000_000), (4, 1_700_000_000)]
        );
        assert_eq!(decoded.crc_channel, crc32fast::hash(b"room"));
        assert_eq!(decoded.crc_uid, crc32fast::hash(b"42"));
        assert!((1..=MAX_SALT).contains(&decoded.salt));
        assert!(decoded.ts > now_u32());
    }

    #[test]
    fn subscriber_gets_join_only() {
        let token = AccessTokenBuilder
            .build_rtc_with_account(&credentials(), "room", "alice", RtcRole::Subscriber, 99)
            .unwrap();
        let decoded = decode(&token);

        assert_eq!(decoded.privileges, vec![(1, 99)]);
        assert_eq!(decoded.crc_uid, crc32fast::hash(b"alice"));
    }

    #[test]
    fn zero_uid_encodes_as_empty_uid() {
        let token = AccessTokenBuilder
            .build_rtc_with_uid(&credentials(), "room", 0, RtcRole::Subscriber, 99)
            .unwrap();
        assert_eq!(decode(&token).crc_uid, crc32fast::hash(b""));
    }

    #[test]
    fn rtm_token_uses_user_id_as_channel_slot() {
        let token = AccessTokenBuilder
            .build_rtm(&credentials(), "alice", RtmRole::User, 1234)
            .unwrap();
        let decoded = decode(&token);

        assert_eq!(decoded.privileges, vec![(1000, 1234)]);
        assert_eq!(decoded.crc_channel, crc32fast::hash(b"alice"));
        assert_eq!(decoded.crc_uid, crc32fast::hash(b""));
    }

    #[test]
    fn signature_covers_identity_and_message() {
        let credentials = credentials();
        let mut token =
            AccessToken::with_salt_and_ts(&credentials, "room", "7".to_string(), 5, 6);
        token.add_privilege(Privilege::JoinChannel, 10);
        let decoded = decode(&token.build().unwrap());

        let mut mac = HmacSha256::new_from_slice(APP_CERTIFICATE.as_bytes()).unwrap();
        mac.update(format!("{APP_ID}room7").as_bytes());
        mac.update(&token.pack_message());
        assert_eq!(decoded.signature, mac.finalize().into_bytes().to_vec());
    }

    #[test]
    fn rejects_malformed_credentials() {
        let bad_id = Credentials::new("not-an-app-id", APP_CERTIFICATE);
        assert_eq!(
            AccessTokenBuilder.build_rtm(&bad_id, "alice", RtmRole::User, 1),
            Err(BuildError::InvalidAppId)
        );

        let bad_cert = Credentials::new(APP_ID, "zz");
        assert_eq!(
            AccessTokenBuilder.build_rtc_with_uid(&bad_cert, "room", 1, RtcRole::Publisher, 1),
            Err(BuildError::InvalidAppCertificate)
        );
    }
}
