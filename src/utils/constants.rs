//! Shared constants and invariants

pub const DEFAULT_EXPIRY_SECONDS: &str = "3600";
pub const DEFAULT_SECRET_NAME: &str = "lag-live-agora";
pub const DEFAULT_CONFIG_PATH: &str = "token-service.yaml";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

// Path segment values with special meaning
pub const ROLE_PUBLISHER: &str = "publisher";
pub const TOKEN_TYPE_USER_ACCOUNT: &str = "userAccount";

// Metric label values
pub const KIND_RTC: &str = "rtc";
pub const KIND_RTM: &str = "rtm";
