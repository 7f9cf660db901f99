//! Opaque identifiers for users and sessions.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};

use crate::constants::ID_BYTES;

/// Generate a random URL-safe identifier (32 bytes, unpadded base64url).
pub fn generate_id() -> String {
    let mut buf = [0u8; ID_BYTES];
    OsRng.fill_bytes(&mut buf);
    Base64UrlUnpadded::encode_string(&buf)
}
