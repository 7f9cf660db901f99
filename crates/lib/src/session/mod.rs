//! Anonymous and bound sessions
//!
//! A [`Session`] is created anonymous with a deadline, bound to a user after a
//! successful login and renewed on activity. [`SessionStore`] drives these
//! transitions through an [`AuthStore`](crate::store::AuthStore).

pub mod errors;
pub mod manager;
pub mod types;

pub use errors::SessionError;
pub use manager::SessionStore;
pub use types::{Session, SessionState};
