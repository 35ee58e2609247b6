#![allow(missing_docs)]
use filesafe_core::crypto;
use filesafe_core::error::Error;
use filesafe_core::keystore::KeyMaterial;

fn test_key(seed: u8) -> KeyMaterial {
    KeyMaterial::from_bytes([seed; 32])
}

#[test]
fn test_encryption_decryption_roundtrip() {
    let key = test_key(7);
    let plaintext = b"Hello, world!";

    let token = crypto::encrypt(&key, plaintext).unwrap();
    assert!(token.is_ascii());

    let recovered = crypto::decrypt(&key, token.as_bytes()).unwrap();
    assert_eq!(plaintext, &recovered[..]);
}

#[test]
fn test_empty_plaintext_roundtrip() {
    let key = test_key(1);
    let token = crypto::encrypt(&key, b"").unwrap();
    let recovered = crypto::decrypt(&key, token.as_bytes()).unwrap();
    assert!(recovered.is_empty());
}

#[test]
fn test_fresh_nonce_per_encryption() {
    let key = test_key(9);
    let a = crypto::encrypt(&key, b"same input").unwrap();
    let b = crypto::encrypt(&key, b"same input").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_wrong_key_is_rejected() {
    let token = crypto::encrypt(&test_key(3), b"secret bytes").unwrap();
    let result = crypto::decrypt(&test_key(4), token.as_bytes());
    assert!(matches!(result, Err(Error::InvalidCiphertext)));
}

#[test]
fn test_any_flipped_bit_is_rejected() {
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE;

    let key = test_key(5);
    let token = crypto::encrypt(&key, b"tamper target").unwrap();
    let raw = URL_SAFE.decode(token.as_bytes()).unwrap();

    // Corrupt one bit at a time across the whole structure: version,
    // timestamp, nonce, ciphertext, and tag must all be covered.
    for index in 0..raw.len() {
        let mut corrupted = raw.clone();
        corrupted[index] ^= 0x01;
        let reencoded = URL_SAFE.encode(&corrupted);
        let result = crypto::decrypt(&key, reencoded.as_bytes());
        assert!(
            matches!(result, Err(Error::InvalidCiphertext)),
            "flip at byte {index} was not rejected"
        );
    }
}

#[test]
fn test_garbage_input_is_rejected() {
    let key = test_key(2);
    for bad in [
        &b"not base64 at all!!"[..],
        b"",
        b"AAAA",
        b"YWJjZGVmZ2hpamtsbW5vcA==",
    ] {
        let result = crypto::decrypt(&key, bad);
        assert!(matches!(result, Err(Error::InvalidCiphertext)));
    }
}

#[test]
fn test_truncated_token_is_rejected() {
    let key = test_key(6);
    let token = crypto::encrypt(&key, b"some longer plaintext for truncation").unwrap();
    let truncated = &token[..token.len() / 2];
    let result = crypto::decrypt(&key, truncated.as_bytes());
    assert!(matches!(result, Err(Error::InvalidCiphertext)));
}
