use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::totp;

/// Settings for one-time code derivation.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Base32-encoded shared secret.
    pub secret: String,
    /// Time-step window in seconds. Issued codes expire one window after
    /// issuance.
    pub step: u64,
    /// Number of code digits.
    pub digits: u32,
}

impl OtpConfig {
    /// Reads `TOTP_SECRET` from the environment.
    ///
    /// Looked up when a code is issued, not at process start, so a missing
    /// secret surfaces as a per-request configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `TOTP_SECRET` is not set.
    pub fn from_env() -> Result<Self> {
        let secret = env::var("TOTP_SECRET")
            .map_err(|_| Error::Configuration("TOTP_SECRET is not set".into()))?;
        Ok(Self {
            secret,
            step: totp::DEFAULT_STEP,
            digits: totp::DEFAULT_DIGITS,
        })
    }
}

/// SMTP sender settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Sender address, also the relay login.
    pub username: String,
    /// Relay password (an app password for hosted providers).
    pub password: String,
    /// Relay host name.
    pub server: String,
    /// Submission port.
    pub port: u16,
}

impl MailConfig {
    /// Reads `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_SERVER` and
    /// `SMTP_PORT` from the environment. Server and port have defaults;
    /// the credentials do not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either credential is not set.
    pub fn from_env() -> Result<Self> {
        let username = env::var("SMTP_USERNAME")
            .map_err(|_| Error::Configuration("SMTP_USERNAME is not set".into()))?;
        let password = env::var("SMTP_PASSWORD")
            .map_err(|_| Error::Configuration("SMTP_PASSWORD is not set".into()))?;
        let server = env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_owned());
        let port = env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);
        Ok(Self {
            username,
            password,
            server,
            port,
        })
    }
}

/// Root directory for on-disk state, from `FILESAFE_DATA_DIR` or the
/// current directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    env::var("FILESAFE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Path of the persisted symmetric key file under `base`.
#[must_use]
pub fn key_file(base: &Path) -> PathBuf {
    base.join("keys").join("filekey.key")
}

/// Directory accumulating encrypted artifacts under `base`. Never
/// auto-cleaned.
#[must_use]
pub fn download_dir(base: &Path) -> PathBuf {
    base.join("uploads")
}
