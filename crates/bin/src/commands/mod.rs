//! Subcommand implementations.

pub mod bootstrap;
pub mod check;
pub mod scopes;
pub mod user;

use haus_auth::scope::{APPLICATION_SCOPES, ScopeError, ScopePath};

/// Reject malformed paths and paths missing from the catalog.
pub(crate) fn validate_scope(scope: &str) -> Result<(), ScopeError> {
    ScopePath::parse(scope)?;
    APPLICATION_SCOPES.require(scope)?;
    Ok(())
}
