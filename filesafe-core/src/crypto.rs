// File:    crypto.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: Handles the core cryptographic operations: the authenticated-encryption artifact transform.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The artifact transform.
//!
//! Uses AES-256-GCM. Key size: 32 bytes. Nonce: 12 bytes (random). Tag: 16 bytes.
//!
//! Artifact layout before encoding:
//!
//! ```text
//! [ version (1 byte) | unix timestamp (8 bytes BE) | nonce (12 bytes) | ciphertext + tag ]
//! ```
//!
//! The whole structure is base64url-encoded into an ASCII token. The
//! timestamp records issue time and is not enforced on decrypt.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::keystore::KeyMaterial;

/// Artifact format version byte.
const VERSION: u8 = 0x01;
/// Nonce length in bytes (96-bit, the GCM standard size).
pub const NONCE_LEN: usize = 12;
/// Bytes preceding the ciphertext: version, timestamp, nonce.
const HEADER_LEN: usize = 1 + 8 + NONCE_LEN;
/// GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Encrypts `plaintext` under `key`, returning the base64 ASCII token.
///
/// Every call draws a fresh random nonce; encrypting the same bytes twice
/// yields different tokens.
///
/// # Errors
///
/// Returns [`Error::Io`] if the cipher rejects the input, which for GCM
/// only happens on pathological plaintext lengths.
pub fn encrypt(key: &KeyMaterial, plaintext: &[u8]) -> Result<String> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());

    let mut raw = Vec::with_capacity(HEADER_LEN);
    raw.push(VERSION);
    raw.extend_from_slice(&timestamp.to_be_bytes());
    raw.extend_from_slice(&nonce);

    // The header is bound as associated data, so a flipped version or
    // timestamp bit fails authentication exactly like a flipped
    // ciphertext bit.
    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: &raw,
            },
        )
        .map_err(|_| Error::Io(std::io::Error::other("encryption failure")))?;

    raw.extend_from_slice(&ciphertext);
    Ok(URL_SAFE.encode(raw))
}

/// Decrypts a token produced by [`encrypt`], recovering the original bytes.
///
/// # Errors
///
/// Every failure mode collapses to [`Error::InvalidCiphertext`]: input that
/// is not base64, a truncated or unversioned structure, a wrong key, or a
/// payload whose tag does not verify. No partial plaintext is ever returned.
pub fn decrypt(key: &KeyMaterial, token: &[u8]) -> Result<Vec<u8>> {
    let raw = URL_SAFE.decode(token).map_err(|_| Error::InvalidCiphertext)?;
    if raw.len() < HEADER_LEN + TAG_LEN || raw[0] != VERSION {
        return Err(Error::InvalidCiphertext);
    }

    let (header, ciphertext) = raw.split_at(HEADER_LEN);
    let nonce_bytes = &header[HEADER_LEN - NONCE_LEN..];

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|_| Error::InvalidCiphertext)
}
