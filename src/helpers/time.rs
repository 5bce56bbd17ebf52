use chrono::Utc;
use tokio::time::Instant;

pub fn now_u64() -> u64 {
    now_i64() as u64
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

/// Wall clock truncated to the 32-bit width used by token timestamps.
pub fn now_u32() -> u32 {
    now_u64() as u32
}

pub fn get_instant() -> Instant {
    Instant::now()
}
