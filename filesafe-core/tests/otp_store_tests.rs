#![allow(missing_docs)]
use filesafe_core::otp_store::OtpStore;

const TTL: u64 = 30;

#[test]
fn test_code_verifies_within_its_window() {
    let mut store = OtpStore::new();
    store.issue_at("a@x.com", "123456".into(), 1_000, TTL);

    // Accepted right up to the expiry instant itself.
    assert!(store.verify_at("123456", 1_000 + TTL));
    assert!(store.is_empty());
}

#[test]
fn test_code_expires_after_its_window() {
    let mut store = OtpStore::new();
    store.issue_at("a@x.com", "123456".into(), 1_000, TTL);

    assert!(!store.verify_at("123456", 1_000 + TTL + 1));
    // The expired record was dropped by the scan itself.
    assert!(store.is_empty());
}

#[test]
fn test_code_is_single_use() {
    let mut store = OtpStore::new();
    store.issue_at("a@x.com", "123456".into(), 0, TTL);

    assert!(store.verify_at("123456", 10));
    assert!(!store.verify_at("123456", 11));
}

#[test]
fn test_reissue_overwrites_the_previous_code() {
    let mut store = OtpStore::new();
    store.issue_at("a@x.com", "111111".into(), 0, TTL);
    store.issue_at("a@x.com", "222222".into(), 5, TTL);

    assert_eq!(store.len(), 1);
    assert!(!store.verify_at("111111", 10));
    assert!(store.verify_at("222222", 10));
}

#[test]
fn test_unknown_code_is_rejected_without_consuming_records() {
    let mut store = OtpStore::new();
    store.issue_at("a@x.com", "123456".into(), 0, TTL);

    assert!(!store.verify_at("654321", 10));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_scan_matches_on_code_value_across_emails() {
    // Codes derive from a shared secret and time bucket, so two recipients
    // in one bucket hold the same code; the scan consumes whichever record
    // it meets first.
    let mut store = OtpStore::new();
    store.issue_at("a@x.com", "123456".into(), 0, TTL);
    store.issue_at("b@y.com", "123456".into(), 0, TTL);

    assert!(store.verify_at("123456", 10));
    assert_eq!(store.len(), 1);
    assert!(store.verify_at("123456", 10));
    assert!(store.is_empty());
}

#[test]
fn test_expired_records_do_not_satisfy_a_matching_code() {
    let mut store = OtpStore::new();
    store.issue_at("a@x.com", "123456".into(), 0, TTL);
    store.issue_at("b@y.com", "999999".into(), 100, TTL);

    // a's record matches the code but is long expired; the scan must drop
    // it and still reject.
    assert!(!store.verify_at("123456", 120));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_sweep_expired_drops_only_dead_records() {
    let mut store = OtpStore::new();
    store.issue_at("a@x.com", "111111".into(), 0, TTL);
    store.issue_at("b@y.com", "222222".into(), 50, TTL);
    store.issue_at("c@z.com", "333333".into(), 100, TTL);

    assert_eq!(store.sweep_expired(90), 2);
    assert_eq!(store.len(), 1);
    assert!(store.verify_at("333333", 110));
}
