//! Credential derivation and verification tests

use haus_auth::credentials::{derive_credentials, verify_password};

#[test]
fn test_derive_then_verify() {
    let creds = derive_credentials("correct horse battery staple");
    assert_eq!(creds.salt.len(), 64);
    assert_eq!(creds.hash.len(), 64);
    assert!(
        creds
            .hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    );

    assert!(verify_password(
        "correct horse battery staple",
        &creds.salt,
        &creds.hash
    ));
    assert!(!verify_password("Correct horse battery staple", &creds.salt, &creds.hash));
}

#[test]
fn test_salts_are_unique() {
    let a = derive_credentials("same");
    let b = derive_credentials("same");
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.hash, b.hash);
}

#[test]
fn test_uppercase_stored_hex_still_verifies() {
    let creds = derive_credentials("pw");
    assert!(verify_password(
        "pw",
        creds.salt.to_uppercase(),
        creds.hash.to_uppercase()
    ));
}

#[test]
fn test_malformed_stored_values_verify_false() {
    let creds = derive_credentials("pw");
    assert!(!verify_password("pw", "not hex", &creds.hash));
    assert!(!verify_password("pw", &creds.salt, "zz"));
    // Truncated hash never matches
    assert!(!verify_password("pw", &creds.salt, &creds.hash[..32]));
}
