//! Builtin function identities and the lookup table used when rendering traced arguments.
//!
//! The macro engine owns the real builtin table; tracing only needs to turn a stored function
//! identity back into the builtin's declared name. [`BuiltinRegistry`] is a simple table for
//! callers (and tests) that do not bring their own.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a builtin function, as stored in a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuiltinId(pub u32);

impl fmt::Display for BuiltinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lookup from builtin identity to declared name.
pub trait BuiltinTable {
    fn name_of(&self, id: BuiltinId) -> Option<&str>;
}

/// Registry of builtin names keyed by identity.
#[derive(Debug, Default, Clone)]
pub struct BuiltinRegistry {
    names: HashMap<BuiltinId, String>,
    next: u32,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` under a fresh identity and returns it.
    pub fn register(&mut self, name: impl Into<String>) -> BuiltinId {
        self.next += 1;
        let id = BuiltinId(self.next);
        self.names.insert(id, name.into());
        id
    }

    /// Registers `name` under a caller-chosen identity, replacing any previous entry.
    pub fn insert(&mut self, id: BuiltinId, name: impl Into<String>) {
        self.next = self.next.max(id.0);
        self.names.insert(id, name.into());
    }

    pub fn lookup_name(&self, name: &str) -> Option<BuiltinId> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl BuiltinTable for BuiltinRegistry {
    fn name_of(&self, id: BuiltinId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }
}

/// Names of the builtins every macro processor of this family provides, in registration order.
pub const STANDARD_BUILTINS: &[&str] = &[
    "define",
    "undefine",
    "defn",
    "pushdef",
    "popdef",
    "indir",
    "builtin",
    "ifdef",
    "ifelse",
    "shift",
    "changequote",
    "changecom",
    "include",
    "sinclude",
    "divert",
    "undivert",
    "divnum",
    "dnl",
    "len",
    "index",
    "regexp",
    "substr",
    "translit",
    "patsubst",
    "format",
    "incr",
    "decr",
    "eval",
    "syscmd",
    "esyscmd",
    "sysval",
    "maketemp",
    "errprint",
    "m4exit",
    "m4wrap",
    "traceon",
    "traceoff",
    "debugmode",
    "debugfile",
    "dumpdef",
];

/// A registry holding [`STANDARD_BUILTINS`], with identities 1..=N in list order.
pub fn standard_registry() -> BuiltinRegistry {
    let mut registry = BuiltinRegistry::new();
    for name in STANDARD_BUILTINS {
        registry.register(*name);
    }
    registry
}
