use log::debug;
use std::collections::HashMap;

use crate::totp;

/// A single outstanding code.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    /// The code issued to the recipient.
    pub code: String,
    /// Absolute expiry in seconds since the unix epoch. The record is dead
    /// strictly after this instant.
    pub expires_at: u64,
}

/// The volatile table of outstanding codes, keyed by recipient email.
///
/// One record per email: issuing again overwrites the previous record. A
/// record leaves the table on its first successful verification, when a
/// scan finds it expired, or when it is overwritten — all terminal. Nothing
/// persists across restarts.
///
/// The store is plain mutable state; callers that share it across request
/// handlers wrap it in a `Mutex` and run each read-modify-write under one
/// lock acquisition.
#[derive(Debug, Default)]
pub struct OtpStore {
    records: HashMap<String, OtpRecord>,
}

impl OtpStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stores `code` for `email` with expiry `now + ttl`, overwriting any
    /// prior record for that email.
    pub fn issue_at(&mut self, email: &str, code: String, now: u64, ttl: u64) {
        self.records.insert(
            email.to_owned(),
            OtpRecord {
                code,
                expires_at: now + ttl,
            },
        );
    }

    /// Scans all outstanding records for `code`.
    ///
    /// Records found past their expiry are removed as a side effect of the
    /// scan, whether or not they match. The first unexpired record whose
    /// code equals `code` is consumed and yields `true`; if the scan
    /// completes without a match the result is `false`.
    ///
    /// The match is on code value alone — the scan does not take an email.
    /// Scan order over records is unspecified.
    pub fn verify_at(&mut self, code: &str, now: u64) -> bool {
        let emails: Vec<String> = self.records.keys().cloned().collect();
        for email in emails {
            let Some(record) = self.records.get(&email) else {
                continue;
            };
            if now > record.expires_at {
                self.records.remove(&email);
                debug!("dropped expired OTP record for {email} during scan");
            } else if record.code == code {
                self.records.remove(&email);
                return true;
            }
        }
        false
    }

    /// Removes every record past its expiry and returns how many were
    /// dropped.
    pub fn sweep_expired(&mut self, now: u64) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| now <= record.expires_at);
        before - self.records.len()
    }

    /// [`Self::issue_at`] against the system clock.
    pub fn issue(&mut self, email: &str, code: String, ttl: u64) {
        self.issue_at(email, code, totp::now_unix(), ttl);
    }

    /// [`Self::verify_at`] against the system clock.
    pub fn verify(&mut self, code: &str) -> bool {
        self.verify_at(code, totp::now_unix())
    }
}
