//! Heterogeneous keyed value store shared across a traversal.
//!
//! [`Data`] is created once at the start of an Execute or Complete call and handed,
//! by mutable reference, to every `Processor` the walker visits. Argument and flag
//! processors write their parsed values here under the argument/flag's name;
//! downstream processors (validators, branch predicates, `IfData`) read them back.

use std::any::Any;
use std::collections::HashMap;

/// Well-known key under which the host's resolved setup/config file path is
/// stored, when a host chooses to stash it in `Data` rather than threading it
/// through `HostServices` directly.
pub const SETUP_FILE_KEY: &str = "_SETUP_FILE";

/// A mapping from string keys to heterogeneous, type-erased values.
#[derive(Default)]
pub struct Data {
    values: HashMap<String, Box<dyn Any>>,
}

impl Data {
    /// An empty store, as created at the top of a traversal.
    pub fn new() -> Self {
        Data::default()
    }

    /// Store `value` under `key`, overwriting whatever was there before.
    pub fn set<T: 'static>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Fetch a typed reference, or `None` if the key is absent or was stored under
    /// a different type.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Fetch a typed mutable reference.
    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Whether `key` is present, regardless of its stored type.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove and return the value stored under `key`, if any.
    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<T> {
        let boxed = self.values.remove(key)?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(boxed) => {
                // Wrong type: put it back so `has` still reports the key as present.
                self.values.insert(key.to_string(), boxed);
                None
            }
        }
    }

    /// `true` if `key` is present and, when interpreted as a `bool`, is not
    /// `false`. Used by [`crate::special::IfData`]'s predicate (§4.8): "data has
    /// this key and the value is not boolean false."
    pub fn is_truthy(&self, key: &str) -> bool {
        match self.get::<bool>(key) {
            Some(value) => *value,
            None => self.has(key),
        }
    }
}
