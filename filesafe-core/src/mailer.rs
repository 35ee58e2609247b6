// File:    mailer.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: Email delivery of issued one-time codes over SMTP.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use lettre::message::Message;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use log::info;

use crate::config::MailConfig;
use crate::error::{Error, Result};

/// Delivery capability for issued codes.
///
/// A send is synchronous and blocking, is never retried, and reports
/// failure to the caller.
pub trait OtpSender {
    /// Delivers `code` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Delivery`] when the transport reports failure.
    fn send(&self, code: &str, recipient: &str) -> Result<()>;
}

/// Checks that `email` is non-empty and plausibly an address.
///
/// # Errors
///
/// Returns [`Error::InvalidEmail`] otherwise.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(Error::InvalidEmail);
    }
    Ok(())
}

/// SMTP-backed sender: STARTTLS relay with the configured credentials.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    /// Builds a sender over `config`.
    #[must_use]
    pub const fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

impl OtpSender for SmtpMailer {
    fn send(&self, code: &str, recipient: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.config.username.parse().map_err(|e| {
                Error::Configuration(format!("invalid sender address: {e}"))
            })?)
            .to(recipient.parse().map_err(|_| Error::InvalidEmail)?)
            .subject("Your OTP Code")
            .body(format!(
                "Your OTP code is: {code}\n\nThis code will expire in 30 seconds."
            ))
            .map_err(|e| Error::Delivery(e.to_string()))?;

        let transport = SmtpTransport::starttls_relay(&self.config.server)
            .map_err(|e| Error::Delivery(e.to_string()))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        transport
            .send(&message)
            .map_err(|e| Error::Delivery(e.to_string()))?;
        info!("OTP email sent to {recipient}");
        Ok(())
    }
}
