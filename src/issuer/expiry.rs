use crate::issuer::{parse_decimal_u64, IssueError};

/// Absolute expiry for a token valid `raw` seconds from `now`.
///
/// The duration is truncated to 32 bits and added with wraparound, matching
/// the 32-bit timestamp field of the token format. There is no upper bound
/// on the requested duration.
pub fn resolve_expiry(raw: &str, now: u32) -> Result<u32, IssueError> {
    let seconds = parse_decimal_u64(raw).map_err(|reason| IssueError::MalformedExpiry {
        raw: raw.to_owned(),
        reason,
    })?;
    Ok((seconds as u32).wrapping_add(now))
}
