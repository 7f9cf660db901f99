//! Permission scopes
//!
//! A scope is a dotted, hierarchical permission name such as
//! `users.manage.edit`. This module holds the fixed [`APPLICATION_SCOPES`]
//! catalog with its human-readable metadata and the matching predicates used
//! to gate operations on a principal's granted scopes.

pub mod catalog;
pub mod checker;
pub mod errors;

pub use catalog::{APPLICATION_SCOPES, ScopeCatalog, ScopeCollection, ScopeDefinition};
pub use checker::{
    ScopeGrants, ScopePath, ancestors, has_scope, within_scope, within_scope_strict,
};
pub use errors::ScopeError;
