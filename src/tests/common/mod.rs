// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use reqwest::Client;

use crate::builder::{BuildError, RtcRole, RtmRole, TokenBuilder};
use crate::config::settings::MetricsConfig;
use crate::issuer::TokenDispatcher;
use crate::observability::metrics::get_metrics;
use crate::secrets::Credentials;
use crate::server::server::{router, AppState};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Serve the full router backed by `builder` on an ephemeral port.
pub async fn spawn_token_service(builder: Arc<dyn TokenBuilder>) -> (JoinHandle<()>, SocketAddr) {
    let credentials = Arc::new(Credentials::new(
        "970CA35de60c44645bbae8a215061b33",
        "5CFd2fd1755d40ecb72977518be15d3b",
    ));
    let dispatcher = TokenDispatcher::new(credentials, builder);
    let state = AppState::new(get_metrics().await, dispatcher);
    spawn_axum(router(state, &MetricsConfig::default())).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderCall {
    RtcUid {
        channel: String,
        uid: u32,
        role: RtcRole,
        expire_at: u32,
    },
    RtcAccount {
        channel: String,
        account: String,
        role: RtcRole,
        expire_at: u32,
    },
    Rtm {
        user_id: String,
        role: RtmRole,
        expire_at: u32,
    },
}

/// Builder double recording every call and returning readable tokens.
#[derive(Debug, Default)]
pub struct RecordingBuilder {
    calls: Mutex<Vec<BuilderCall>>,
    fail_rtc: bool,
    fail_rtm: bool,
}

impl RecordingBuilder {
    pub fn failing_rtc() -> Self {
        Self {
            fail_rtc: true,
            ..Default::default()
        }
    }

    pub fn failing_rtm() -> Self {
        Self {
            fail_rtm: true,
            ..Default::default()
        }
    }

    pub fn failing_both() -> Self {
        Self {
            fail_rtc: true,
            fail_rtm: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<BuilderCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BuilderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl TokenBuilder for RecordingBuilder {
    fn build_rtc_with_uid(
        &self,
        _credentials: &Credentials,
        channel: &str,
        uid: u32,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, BuildError> {
        self.record(BuilderCall::RtcUid {
            channel: channel.to_owned(),
            uid,
            role,
            expire_at,
        });
        if self.fail_rtc {
            return Err(BuildError::InvalidAppId);
        }
        Ok(format!("rtc-uid:{}:{}", channel, uid))
    }

    fn build_rtc_with_account(
        &self,
        _credentials: &Credentials,
        channel: &str,
        account: &str,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, BuildError> {
        self.record(BuilderCall::RtcAccount {
            channel: channel.to_owned(),
            account: account.to_owned(),
            role,
            expire_at,
        });
        if self.fail_rtc {
            return Err(BuildError::InvalidAppId);
        }
        Ok(format!("rtc-account:{}:{}", channel, account))
    }

    fn build_rtm(
        &self,
        _credentials: &Credentials,
        user_id: &str,
        role: RtmRole,
        expire_at: u32,
    ) -> Result<String, BuildError> {
        self.record(BuilderCall::Rtm {
            user_id: user_id.to_owned(),
            role,
            expire_at,
        });
        if self.fail_rtm {
            return Err(BuildError::InvalidAppCertificate);
        }
        Ok(format!("rtm:{}", user_id))
    }
}
