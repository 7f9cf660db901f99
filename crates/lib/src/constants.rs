//! Constants used throughout the haus-auth library.
//!
//! Central definitions for reserved scope names, credential derivation
//! parameters and session defaults.

/// Sentinel scope that bypasses all scope checks. Only root users carry it.
pub const ROOT_SCOPE: &str = "root";

/// Scope required for any logged-in action, including logging in.
pub const APP_SCOPE: &str = "app";

/// Separator between scope path segments.
pub const SCOPE_SEPARATOR: char = '.';

/// PBKDF2-HMAC-SHA256 iteration count for password derivation.
pub const PBKDF2_ITERATIONS: u32 = 500_000;

/// Length of the random password salt in bytes.
pub const SALT_LENGTH: usize = 32;

/// Length of the derived password hash in bytes (SHA-256 output size).
pub const HASH_LENGTH: usize = 32;

/// Random bytes in a user or session identifier.
pub const ID_BYTES: usize = 32;

/// Default session lifetime in seconds.
pub const DEFAULT_SESSION_EXPIRATION_SECS: f64 = 3600.0;
