// File:    totp.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: Time-based one-time code derivation (RFC 4226 / RFC 6238, HMAC-SHA1).
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! One-time code derivation.
//!
//! A code is a deterministic function of the shared secret and a coarse
//! time bucket — never of the recipient. Two issues inside the same bucket
//! therefore produce the same code.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// Default number of digits in a generated code.
pub const DEFAULT_DIGITS: u32 = 6;
/// Default time-step window in seconds.
pub const DEFAULT_STEP: u64 = 30;

/// Decodes an RFC 4648 base32 shared secret, ignoring case and padding.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the input is empty or not base32.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let normalized = secret.trim().trim_end_matches('=').to_ascii_uppercase();
    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, &normalized)
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| Error::Configuration("TOTP secret is not valid base32".into()))
}

/// RFC 4226 HOTP: HMAC-SHA1 over the counter, dynamic truncation, and the
/// low `digits` decimal digits, zero-padded.
#[must_use]
pub fn hotp(secret: &[u8], counter: u64, digits: u32) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret).expect("HMAC-SHA1 accepts keys of any length");
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[19] & 0x0f) as usize;
    let bin_code = ((u32::from(digest[offset]) & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);

    let code = bin_code % 10u32.pow(digits);
    format!("{code:0width$}", width = digits as usize)
}

/// The code for an explicit unix time, bucketed by `step` seconds.
#[must_use]
pub fn totp_at(secret: &[u8], unix_secs: u64, step: u64, digits: u32) -> String {
    hotp(secret, unix_secs / step.max(1), digits)
}

/// The code for the current system time.
#[must_use]
pub fn totp_now(secret: &[u8], step: u64, digits: u32) -> String {
    totp_at(secret, now_unix(), step, digits)
}

/// Seconds since the unix epoch, saturating at zero for a pre-epoch clock.
#[must_use]
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
