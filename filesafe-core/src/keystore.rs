// File:    keystore.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: Generates and persists the symmetric key used by the artifact transform.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use rand::{TryRngCore, rngs::OsRng};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Length of the symmetric key in bytes.
pub const KEY_LEN: usize = 32;

/// The symmetric key behind every encrypt and decrypt call.
///
/// A value is produced once at startup and injected into call sites; the
/// same key must be used for the whole process lifetime, since rotating or
/// losing it orphans every artifact produced under it.
#[derive(Clone)]
pub struct KeyMaterial([u8; KEY_LEN]);

impl KeyMaterial {
    /// Generates a fresh key from the operating system RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS RNG cannot be read.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; KEY_LEN];
        let mut rng = OsRng;
        // Use the failable `try_fill_bytes` and map the error to an `io::Error`.
        rng.try_fill_bytes(&mut bytes)
            .map_err(std::io::Error::other)?;
        Ok(Self(bytes))
    }

    /// Wraps raw key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Loads the key from `path`, generating and persisting a new one if
    /// the file does not exist yet.
    ///
    /// The file holds the key as base64 ASCII. Parent directories are
    /// created as needed on first run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if an existing key file cannot be
    /// decoded into a key of the right length, and [`Error::Io`] for any
    /// filesystem failure.
    pub fn load_or_generate(path: &Path) -> Result<Self> {
        if path.exists() {
            let encoded = fs::read_to_string(path)?;
            let bytes = URL_SAFE.decode(encoded.trim()).map_err(|e| {
                Error::Configuration(format!(
                    "key file {} is not valid base64: {e}",
                    path.display()
                ))
            })?;
            let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
                Error::Configuration(format!(
                    "key file {} does not hold a {KEY_LEN}-byte key",
                    path.display()
                ))
            })?;
            Ok(Self(bytes))
        } else {
            let key = Self::generate()?;
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, URL_SAFE.encode(key.as_bytes()))?;
            Ok(key)
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key bytes.
        f.write_str("KeyMaterial(..)")
    }
}
