//! The scope catalog: an immutable tree of named scope definitions.
//!
//! The catalog is built once, eagerly, and never mutated afterwards. Leaf
//! definitions carry an empty child collection rather than an optional one, so
//! traversal never needs to allocate.
//!
//! [`APPLICATION_SCOPES`] holds the fixed catalog shipped with the server.

use std::sync::LazyLock;

use serde_json::{Map, Value, json};

use super::errors::ScopeError;
use crate::constants::SCOPE_SEPARATOR;

/// A single named scope and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDefinition {
    /// Segment name. Never contains the scope separator.
    pub name: String,
    /// Human-readable title.
    pub friendly_name: String,
    /// Human-readable description of what the scope grants.
    pub description: String,
    /// Scopes nested below this one.
    pub children: ScopeCollection,
}

impl ScopeDefinition {
    /// Create a leaf definition.
    pub fn new(
        name: impl Into<String>,
        friendly_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            friendly_name: friendly_name.into(),
            description: description.into(),
            children: ScopeCollection::default(),
        }
    }

    /// Attach child definitions, replacing any existing children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = ScopeDefinition>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Whether this definition has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Render as `{name, friendly_name, description, children}`.
    ///
    /// Leaves serialize their children as an empty mapping.
    pub fn serialize(&self) -> Value {
        json!({
            "name": self.name,
            "friendly_name": self.friendly_name,
            "description": self.description,
            "children": Value::Object(self.children.serialize()),
        })
    }
}

/// Definitions at one level of the tree, keyed by segment name.
///
/// Declaration order is kept for display; lookups do not depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeCollection {
    scopes: Vec<ScopeDefinition>,
}

impl ScopeCollection {
    /// Get a direct child by segment name.
    pub fn get_child(&self, name: &str) -> Option<&ScopeDefinition> {
        self.scopes.iter().find(|s| s.name == name)
    }

    /// Resolve a dotted path relative to this collection.
    ///
    /// Splits on the first separator, resolves the head here and recurses the
    /// remainder into the head's children. Any missing segment yields `None`.
    pub fn lookup(&self, path: &str) -> Option<&ScopeDefinition> {
        match path.split_once(SCOPE_SEPARATOR) {
            None => self.get_child(path),
            Some((head, rest)) => self.get_child(head)?.children.lookup(rest),
        }
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether this level has no definitions.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Iterate over direct children in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ScopeDefinition> {
        self.scopes.iter()
    }

    /// Render as a mapping of segment name to serialized definition.
    pub fn serialize(&self) -> Map<String, Value> {
        self.scopes
            .iter()
            .map(|s| (s.name.clone(), s.serialize()))
            .collect()
    }

    fn collect_paths(&self, prefix: Option<&str>, out: &mut Vec<String>) {
        for scope in &self.scopes {
            let path = match prefix {
                Some(p) => format!("{p}{SCOPE_SEPARATOR}{}", scope.name),
                None => scope.name.clone(),
            };
            out.push(path.clone());
            scope.children.collect_paths(Some(&path), out);
        }
    }
}

impl FromIterator<ScopeDefinition> for ScopeCollection {
    /// Later definitions with a duplicate name replace earlier ones.
    fn from_iter<I: IntoIterator<Item = ScopeDefinition>>(iter: I) -> Self {
        let mut scopes: Vec<ScopeDefinition> = Vec::new();
        for def in iter {
            match scopes.iter_mut().find(|s| s.name == def.name) {
                Some(existing) => *existing = def,
                None => scopes.push(def),
            }
        }
        Self { scopes }
    }
}

/// The root of a scope tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeCatalog {
    root: ScopeCollection,
}

impl ScopeCatalog {
    /// Build a catalog from its top-level definitions.
    pub fn new(scopes: impl IntoIterator<Item = ScopeDefinition>) -> Self {
        Self {
            root: scopes.into_iter().collect(),
        }
    }

    /// Resolve a full dotted path such as `users.manage.edit`.
    pub fn lookup(&self, path: &str) -> Option<&ScopeDefinition> {
        self.root.lookup(path)
    }

    /// Resolve a path, failing with [`ScopeError::UnknownScope`] if absent.
    pub fn require(&self, path: &str) -> Result<&ScopeDefinition, ScopeError> {
        self.lookup(path).ok_or_else(|| ScopeError::UnknownScope {
            path: path.to_string(),
        })
    }

    /// Whether the path names a catalog entry.
    pub fn is_known(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Top-level definitions.
    pub fn scopes(&self) -> &ScopeCollection {
        &self.root
    }

    /// Every full dotted path in the catalog, each parent before its children.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.collect_paths(None, &mut out);
        out
    }

    /// Render the whole tree for display and admin UIs.
    pub fn serialize(&self) -> Value {
        Value::Object(self.root.serialize())
    }
}

/// The fixed catalog of scopes known to the household server.
pub static APPLICATION_SCOPES: LazyLock<ScopeCatalog> = LazyLock::new(application_scopes);

fn application_scopes() -> ScopeCatalog {
    ScopeCatalog::new([
        ScopeDefinition::new(
            "root",
            "Root User",
            "Bypasses all scoping. Applied only to root user. Root users cannot be deleted.",
        ),
        ScopeDefinition::new(
            "app",
            "Application User",
            "Root scope, all users other than root have this scope applied automatically. All logged-in actions require this scope, including logging in itself. Removing it disables an account without deleting it.",
        )
        .with_children([
            ScopeDefinition::new(
                "user",
                "Normal User",
                "Places the account into USER mode. Given to each non-root account by default.",
            ),
            ScopeDefinition::new("kiosk", "Kiosk User", "Places the account into KIOSK mode."),
            ScopeDefinition::new(
                "plugins",
                "Plugins Access",
                "Access to all plugins & plugin features.",
            ),
        ]),
        ScopeDefinition::new(
            "users",
            "User Administration",
            "User viewing & management root.",
        )
        .with_children([
            ScopeDefinition::new("view", "View Users", "View all user details."),
            ScopeDefinition::new("manage", "Manage Users", "Manage user settings.").with_children([
                ScopeDefinition::new("create", "User Creation", "Create new users."),
                ScopeDefinition::new(
                    "edit",
                    "User Editing",
                    "Edit existing users & scopes (allows disabling users).",
                ),
                ScopeDefinition::new(
                    "delete",
                    "Delete Users",
                    "Allows the deletion of existing users.",
                ),
            ]),
        ]),
        ScopeDefinition::new(
            "plugins",
            "Plugin Administration",
            "Plugin viewing & management root.",
        )
        .with_children([
            ScopeDefinition::new(
                "view",
                "View Plugin Info",
                "View detailed plugin information & settings",
            ),
            ScopeDefinition::new("manage", "Manage Plugins", "Manage plugin settings.")
                .with_children([
                    ScopeDefinition::new(
                        "settings",
                        "Plugin Settings",
                        "Allows modification of plugin configs.",
                    ),
                    ScopeDefinition::new(
                        "active",
                        "Plugin Toggle",
                        "Allows setting plugins to active or inactive.",
                    ),
                ]),
        ]),
        ScopeDefinition::new(
            "server",
            "Server Settings",
            "Manage internal server settings.",
        )
        .with_children([
            ScopeDefinition::new(
                "view",
                "View Settings",
                "Allows viewing settings, but not modification.",
            ),
            ScopeDefinition::new("manage", "Manage Server", "Manage server settings.")
                .with_children([
                    ScopeDefinition::new(
                        "zones",
                        "Zone Management",
                        "Allows management of household zones.",
                    ),
                    ScopeDefinition::new(
                        "colors",
                        "Color Scheme",
                        "Allows setting the default app color scheme for all users.",
                    ),
                ]),
        ]),
    ])
}
