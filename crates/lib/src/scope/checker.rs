//! Hierarchical matching between granted scopes and a requested scope.
//!
//! Scopes are dotted strings where holding an ancestor implies holding every
//! descendant. Two predicates are provided:
//!
//! - [`has_scope`]: the principal holds the probe or one of its ancestors.
//!   This is the authorization gate.
//! - [`within_scope`]: the principal holds the probe or something beneath it.
//!   This answers "can this principal see into the subtree at all".
//!
//! Both short-circuit to `true` when the grant set contains [`ROOT_SCOPE`].
//!
//! [`within_scope`] matches on raw string prefixes, so a probe of `users`
//! also matches a grant of `users2.manage`. [`within_scope_strict`] matches on
//! segment boundaries instead.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::errors::ScopeError;
use crate::constants::{ROOT_SCOPE, SCOPE_SEPARATOR};

/// Iterate over `scope` and its dotted ancestors, most specific first.
///
/// `a.b.c` yields `a.b.c`, `a.b`, `a`. Stops before the empty string.
pub fn ancestors(scope: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(scope).filter(|s| !s.is_empty()), |s| {
        let s: &str = s;
        s.rfind(SCOPE_SEPARATOR)
            .map(|i| &s[..i])
            .filter(|p| !p.is_empty())
    })
}

fn holds_root<S: AsRef<str>>(granted: &[S]) -> bool {
    granted.iter().any(|g| g.as_ref() == ROOT_SCOPE)
}

/// Does the principal hold `probe`, or an ancestor of `probe`?
///
/// ```
/// use haus_auth::scope::has_scope;
///
/// assert!(has_scope(&["users.manage"], "users.manage.edit"));
/// assert!(!has_scope(&["users.manage.edit"], "users.manage"));
/// assert!(has_scope(&["root"], "anything.at.all"));
/// ```
pub fn has_scope<S: AsRef<str>>(granted: &[S], probe: &str) -> bool {
    if holds_root(granted) {
        return true;
    }
    ancestors(probe).any(|candidate| granted.iter().any(|g| g.as_ref() == candidate))
}

/// Does the principal hold `probe`, or any scope that starts with `probe`?
///
/// This is a raw string-prefix test, not segment-aware.
pub fn within_scope<S: AsRef<str>>(granted: &[S], probe: &str) -> bool {
    if holds_root(granted) {
        return true;
    }
    granted.iter().any(|g| g.as_ref().starts_with(probe))
}

/// Segment-aware variant of [`within_scope`].
///
/// A grant matches when it equals `probe` or continues it with a separator,
/// so `users` matches `users.view` but not `users2.manage`.
pub fn within_scope_strict<S: AsRef<str>>(granted: &[S], probe: &str) -> bool {
    if holds_root(granted) {
        return true;
    }
    granted.iter().any(|g| is_same_or_descendant(g.as_ref(), probe))
}

fn is_same_or_descendant(scope: &str, ancestor: &str) -> bool {
    match scope.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with(SCOPE_SEPARATOR),
        None => false,
    }
}

/// A set of granted scopes prepared for repeated checks.
///
/// Membership lookups are hashed, so a `has_scope` probe costs one lookup per
/// ancestor regardless of how many scopes are granted.
#[derive(Debug, Clone, Default)]
pub struct ScopeGrants {
    scopes: HashSet<String>,
    root: bool,
}

impl ScopeGrants {
    /// Build from any list of scope strings.
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes: HashSet<String> = scopes.into_iter().map(Into::into).collect();
        let root = scopes.contains(ROOT_SCOPE);
        Self { scopes, root }
    }

    /// Whether the grants include the root sentinel.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// See [`has_scope`].
    pub fn has_scope(&self, probe: &str) -> bool {
        self.root || ancestors(probe).any(|candidate| self.scopes.contains(candidate))
    }

    /// See [`within_scope`].
    pub fn within_scope(&self, probe: &str) -> bool {
        self.root || self.scopes.iter().any(|g| g.starts_with(probe))
    }

    /// See [`within_scope_strict`].
    pub fn within_scope_strict(&self, probe: &str) -> bool {
        self.root || self.scopes.iter().any(|g| is_same_or_descendant(g, probe))
    }
}

/// A validated scope path with its segments split once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopePath {
    raw: String,
    segments: Vec<String>,
}

impl ScopePath {
    /// Parse a dotted path, rejecting empty paths and empty segments.
    pub fn parse(path: &str) -> Result<Self, ScopeError> {
        if path.is_empty() {
            return Err(ScopeError::InvalidScopePath {
                path: path.to_string(),
                reason: "path is empty",
            });
        }
        let segments: Vec<String> = path.split(SCOPE_SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ScopeError::InvalidScopePath {
                path: path.to_string(),
                reason: "path contains an empty segment",
            });
        }
        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// The dotted string form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Individual segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The immediate parent, or `None` for a top-level scope.
    pub fn parent(&self) -> Option<ScopePath> {
        let (parent, _) = self.raw.rsplit_once(SCOPE_SEPARATOR)?;
        Some(Self {
            raw: parent.to_string(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// This path and every ancestor, most specific first.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        ancestors(&self.raw)
    }

    /// Whether `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &ScopePath) -> bool {
        self.depth() < other.depth() && other.segments.starts_with(&self.segments)
    }
}

impl FromStr for ScopePath {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for ScopePath {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
