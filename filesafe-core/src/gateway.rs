// File:    gateway.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: File-level encrypt and decrypt operations over server-local paths.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto;
use crate::error::{Error, Result};
use crate::keystore::KeyMaterial;

/// Suffix marking a file as an encrypted artifact.
pub const ENCRYPTED_SUFFIX: &str = ".encrypted";
/// Suffix appended to recovered output when the input did not carry
/// [`ENCRYPTED_SUFFIX`].
pub const DECRYPTED_SUFFIX: &str = ".decrypted";

/// Validates a request path. The checks run in a fixed order, each its own
/// failure: empty, then nonexistent, then not-a-regular-file.
fn validate_path(path: &str) -> Result<&Path> {
    if path.is_empty() {
        return Err(Error::MissingInput);
    }
    let path = Path::new(path);
    if !path.exists() {
        return Err(Error::NotFound);
    }
    if !path.is_file() {
        return Err(Error::NotAFile);
    }
    Ok(path)
}

/// Encrypts the file at `path`, writing the artifact into `download_dir`
/// under the source's base name plus [`ENCRYPTED_SUFFIX`], and returns that
/// file name. The source file is left untouched.
///
/// `download_dir` is created if it does not exist.
///
/// # Errors
///
/// [`Error::MissingInput`], [`Error::NotFound`] or [`Error::NotAFile`] for
/// an unusable path; [`Error::Io`] for any filesystem failure.
pub fn encrypt_file(key: &KeyMaterial, path: &str, download_dir: &Path) -> Result<String> {
    let input = validate_path(path)?;

    let original = fs::read(input)?;
    info!("read {} bytes from {}", original.len(), input.display());

    let token = crypto::encrypt(key, &original)?;

    let base_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(Error::NotAFile)?;
    let file_name = format!("{base_name}{ENCRYPTED_SUFFIX}");

    fs::create_dir_all(download_dir)?;
    let out_path = download_dir.join(&file_name);
    fs::write(&out_path, token)?;
    info!("wrote encrypted artifact to {}", out_path.display());

    Ok(file_name)
}

/// Decrypts the artifact at `path` back to its original bytes and returns
/// the path the recovered output was written to.
///
/// The output path strips [`ENCRYPTED_SUFFIX`] when the input carries it,
/// otherwise appends [`DECRYPTED_SUFFIX`]. When the input carried the
/// suffix, the artifact is deleted — but only after the output write has
/// completed, so a crash in between never leaves zero copies of the data.
///
/// # Errors
///
/// Path validation errors as in [`encrypt_file`];
/// [`Error::InvalidCiphertext`] if the artifact does not authenticate under
/// `key`, in which case nothing is written; [`Error::Io`] otherwise.
pub fn decrypt_file(key: &KeyMaterial, path: &str) -> Result<PathBuf> {
    let input = validate_path(path)?;

    let token = fs::read(input)?;
    let plaintext = crypto::decrypt(key, &token)?;
    info!("decrypted {} bytes", plaintext.len());

    let output = path.strip_suffix(ENCRYPTED_SUFFIX).map_or_else(
        || PathBuf::from(format!("{path}{DECRYPTED_SUFFIX}")),
        PathBuf::from,
    );
    fs::write(&output, &plaintext)?;

    // Remove the artifact only once the plaintext is safely on disk.
    if path.ends_with(ENCRYPTED_SUFFIX) {
        fs::remove_file(input)?;
        info!("removed encrypted artifact {}", input.display());
    }

    Ok(output)
}
