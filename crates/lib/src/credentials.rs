//! Password credential derivation and verification
//!
//! Passwords are stored as a PBKDF2-HMAC-SHA256 digest under a random
//! 32-byte salt, 500,000 iterations, both rendered as lowercase hex.
//!
//! Verification recomputes the digest and compares bytes in constant time.
//! A wrong password, or a stored hash/salt that isn't valid hex, simply
//! verifies as `false`.
//!
//! Derivation is CPU-bound. Async callers should run it off the runtime's
//! worker threads (see [`UserDirectory`](crate::user::UserDirectory)).

use pbkdf2::pbkdf2_hmac;
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::constants::{HASH_LENGTH, PBKDF2_ITERATIONS, SALT_LENGTH};

/// A derived password hash and the salt it was derived under, both hex.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    /// Lowercase hex PBKDF2 digest
    pub hash: String,
    /// Lowercase hex salt
    pub salt: String,
}

impl std::fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("hash", &"<redacted>")
            .field("salt", &"<redacted>")
            .finish()
    }
}

/// Run PBKDF2-HMAC-SHA256 over `password` with the given raw salt.
pub fn derive_key(password: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
    let mut key = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Derive fresh credentials for `password` under a new random salt.
pub fn derive_credentials(password: impl AsRef<str>) -> PasswordCredentials {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);

    let key = derive_key(password.as_ref(), &salt);

    PasswordCredentials {
        hash: hex::encode(key),
        salt: hex::encode(salt),
    }
}

/// Check `password` against a stored hex salt and hex hash.
///
/// Hex decoding is case-insensitive on both inputs.
pub fn verify_password(
    password: impl AsRef<str>,
    salt_hex: impl AsRef<str>,
    hash_hex: impl AsRef<str>,
) -> bool {
    let Ok(salt) = hex::decode(salt_hex.as_ref()) else {
        tracing::warn!("Stored password salt is not valid hex");
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex.as_ref()) else {
        tracing::warn!("Stored password hash is not valid hex");
        return false;
    };

    let key = derive_key(password.as_ref(), &salt);
    key[..].ct_eq(&expected[..]).into()
}

impl PasswordCredentials {
    /// Derive fresh credentials. See [`derive_credentials`].
    pub fn derive(password: impl AsRef<str>) -> Self {
        derive_credentials(password)
    }

    /// Check a password against these credentials.
    pub fn verify(&self, password: impl AsRef<str>) -> bool {
        verify_password(password, &self.salt, &self.hash)
    }
}
