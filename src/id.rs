//! ID generation utilities for armgrab
//!
//! Provides the retry token attached to launch requests and timestamp helpers.

use rand::Rng;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Generate an idempotency token for a launch request.
///
/// Sent as `opc-retry-token`; OCI deduplicates create calls carrying the
/// same token, so a request replayed after a transport failure cannot
/// produce a second instance. Must stay within OCI's 64-character limit.
///
/// Format: `armgrab-{timestamp_ms}-{random_hex}`
/// Example: `armgrab-1738300800123-a1b2c3d4`
pub fn generate_retry_token() -> String {
    let timestamp = now_ms();
    let random: u32 = rand::rng().random();
    format!("armgrab-{}-{:08x}", timestamp, random)
}
