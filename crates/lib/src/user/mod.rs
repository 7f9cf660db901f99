//! User accounts
//!
//! A [`User`] carries PBKDF2 credentials and a list of granted scopes.
//! [`UserDirectory`] creates and authenticates users through an
//! [`AuthStore`](crate::store::AuthStore) and hands out [`RedactedUser`]
//! views for anything leaving the process.

pub mod directory;
pub mod errors;
pub mod types;

pub use directory::UserDirectory;
pub use errors::UserError;
pub use types::{RedactedUser, User, UserEdit};
