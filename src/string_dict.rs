//! Interning of the property names used by the runtime and its builtins.
//!
//! Names such as `length`, `raw` or `next` are looked up on every template
//! object, spread step and iterator step. Interning them means every lookup
//! shares one `Rc<str>` instead of allocating a fresh key.

use rustc_hash::FxHashMap;

use crate::value::{CheapClone, JsString, PropertyKey};

/// An interned name and the property key it maps to
struct Entry {
    string: JsString,
    key: PropertyKey,
}

/// Deduplicating table of interned names.
///
/// Each entry also caches its [`PropertyKey`], so repeated key lookups skip
/// the canonical-index check.
#[derive(Default)]
pub struct StringDict {
    entries: FxHashMap<Box<str>, Entry>,
}

impl StringDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dictionary holding the runtime's well-known names
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for name in RUNTIME_NAMES {
            dict.insert(name);
        }
        dict
    }

    fn insert(&mut self, name: &str) -> &Entry {
        self.entries.entry(name.into()).or_insert_with(|| {
            let string = JsString::from(name);
            Entry {
                key: PropertyKey::from(string.cheap_clone()),
                string,
            }
        })
    }

    /// The shared string for `name`, interning it on first use
    pub fn get_or_insert(&mut self, name: &str) -> JsString {
        if let Some(entry) = self.entries.get(name) {
            return entry.string.cheap_clone();
        }
        self.insert(name).string.cheap_clone()
    }

    /// Property key for an interned name. Canonical indices become index keys.
    pub fn key(&mut self, name: &str) -> PropertyKey {
        if let Some(entry) = self.entries.get(name) {
            return entry.key.clone();
        }
        self.insert(name).key.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const RUNTIME_NAMES: &[&str] = &[
    "length",
    "raw",
    "default",
    "prototype",
    "constructor",
    "name",
    "next",
    "done",
    "value",
    "return",
    "throw",
    "exports",
    "module",
    "undefined",
    "null",
    "object",
    "function",
];
