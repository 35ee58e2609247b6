use thiserror::Error;

/// Every failure a filesafe operation can report.
///
/// The web layer maps each variant to an HTTP status and a JSON error body;
/// the CLI maps them to a logged message and a non-zero exit.
#[derive(Debug, Error)]
pub enum Error {
    /// No file path was supplied with the request.
    #[error("No file path provided")]
    MissingInput,

    /// The supplied path does not exist on the filesystem.
    #[error("File does not exist")]
    NotFound,

    /// The supplied path exists but is not a regular file.
    #[error("Path must be a file, not a directory")]
    NotAFile,

    /// The artifact failed authentication: wrong key, tampering, or a
    /// structurally malformed payload. No plaintext is ever produced.
    #[error("Invalid encryption key or corrupted file")]
    InvalidCiphertext,

    /// The recipient address is missing or not plausibly an email.
    #[error("Invalid email format")]
    InvalidEmail,

    /// The submitted code is not exactly six ASCII digits.
    #[error("Invalid OTP format")]
    InvalidFormat,

    /// No outstanding code matched, or the matching code had expired.
    #[error("Invalid or expired OTP")]
    InvalidOrExpired,

    /// Required configuration is missing or unusable.
    #[error("OTP configuration error: {0}")]
    Configuration(String),

    /// The mail collaborator reported a failed send.
    #[error("Failed to send OTP: {0}")]
    Delivery(String),

    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
