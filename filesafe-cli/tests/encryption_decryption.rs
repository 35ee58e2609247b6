#![allow(missing_docs)]
use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_encrypt_decrypt_roundtrip() {
    // 1. Setup temporary directories for the test
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("notes.txt");
    let key_file = temp_dir.path().join("keys/filekey.key");
    let output_dir = temp_dir.path().join("uploads");

    let input_content = "Meet at the usual place at nine.";
    fs::write(&input_path, input_content).expect("Failed to write input file");

    // 2. Encrypt; the key file is created on first use
    Command::cargo_bin("filesafe-cli")
        .expect("Failed to find filesafe-cli binary")
        .current_dir(temp_dir.path())
        .arg("--key-file")
        .arg(&key_file)
        .arg("encrypt")
        .arg(&input_path)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success();

    let artifact = output_dir.join("notes.txt.encrypted");
    assert!(artifact.exists());
    assert!(key_file.exists());
    // The source file is left untouched
    assert_eq!(
        fs::read_to_string(&input_path).expect("Failed to read input"),
        input_content
    );

    // 3. Decrypt the artifact in place
    Command::cargo_bin("filesafe-cli")
        .expect("Failed to find filesafe-cli binary")
        .current_dir(temp_dir.path())
        .arg("--key-file")
        .arg(&key_file)
        .arg("decrypt")
        .arg(&artifact)
        .assert()
        .success();

    let recovered = output_dir.join("notes.txt");
    assert_eq!(
        fs::read_to_string(&recovered).expect("Failed to read recovered file"),
        input_content
    );
    // The artifact was consumed after a successful write
    assert!(!artifact.exists());
}

#[test]
fn test_decrypt_with_wrong_key_fails_and_keeps_the_artifact() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("secret.txt");
    let output_dir = temp_dir.path().join("uploads");
    fs::write(&input_path, "keep me safe").expect("Failed to write input file");

    Command::cargo_bin("filesafe-cli")
        .expect("Failed to find filesafe-cli binary")
        .current_dir(temp_dir.path())
        .arg("--key-file")
        .arg(temp_dir.path().join("key_one.key"))
        .arg("encrypt")
        .arg(&input_path)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success();

    let artifact = output_dir.join("secret.txt.encrypted");
    Command::cargo_bin("filesafe-cli")
        .expect("Failed to find filesafe-cli binary")
        .current_dir(temp_dir.path())
        .arg("--key-file")
        .arg(temp_dir.path().join("key_two.key"))
        .arg("decrypt")
        .arg(&artifact)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Invalid encryption key or corrupted file",
        ));

    assert!(artifact.exists());
    assert!(!output_dir.join("secret.txt").exists());
}

#[test]
fn test_missing_input_path_is_reported() {
    let temp_dir = tempdir().expect("Failed to create temp dir");

    Command::cargo_bin("filesafe-cli")
        .expect("Failed to find filesafe-cli binary")
        .current_dir(temp_dir.path())
        .arg("--key-file")
        .arg(temp_dir.path().join("filekey.key"))
        .arg("encrypt")
        .arg(temp_dir.path().join("no_such_file.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}

#[test]
fn test_send_otp_rejects_invalid_email() {
    let temp_dir = tempdir().expect("Failed to create temp dir");

    Command::cargo_bin("filesafe-cli")
        .expect("Failed to find filesafe-cli binary")
        .current_dir(temp_dir.path())
        .arg("send-otp")
        .arg("not-an-address")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email format"));
}

#[test]
fn test_send_otp_without_secret_is_a_configuration_error() {
    let temp_dir = tempdir().expect("Failed to create temp dir");

    Command::cargo_bin("filesafe-cli")
        .expect("Failed to find filesafe-cli binary")
        .current_dir(temp_dir.path())
        .env_remove("TOTP_SECRET")
        .arg("send-otp")
        .arg("user@example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OTP configuration error"));
}
