use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// A typed key into an [ActionContext].
///
/// The name identifies the entry. Two keys with the same name address the same entry, so names
/// should be namespaced (e.g., `sparql-bus:http:timeout`).
pub struct ContextKey<T> {
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Creates a new [ContextKey].
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    /// Returns the name of the key.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> Debug for ContextKey<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

type ContextValue = Arc<dyn Any + Send + Sync>;

/// An immutable key/value environment that is threaded through every action.
///
/// A context is created once per top-level query and derived as it flows down the operation
/// tree. Deriving never changes the receiver: [ActionContext::set] and [ActionContext::delete]
/// return a new context, so sibling branches holding the same ancestor never observe each
/// other's entries.
#[derive(Clone, Default)]
pub struct ActionContext {
    entries: Arc<BTreeMap<&'static str, ContextValue>>,
}

impl ActionContext {
    /// Creates an empty [ActionContext].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored for `key`.
    pub fn get<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> Option<&T> {
        self.entries
            .get(key.name())
            .and_then(|value| (**value).downcast_ref::<T>())
    }

    /// Returns whether a value is stored for `key`.
    pub fn has<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> bool {
        self.get(key).is_some()
    }

    /// Returns a new context in which `key` maps to `value`.
    #[must_use]
    pub fn set<T: Any + Send + Sync>(&self, key: &ContextKey<T>, value: T) -> Self {
        let mut entries = BTreeMap::clone(&self.entries);
        entries.insert(key.name(), Arc::new(value));
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns a new context without an entry for `key`.
    #[must_use]
    pub fn delete<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> Self {
        if !self.entries.contains_key(key.name()) {
            return self.clone();
        }

        let mut entries = BTreeMap::clone(&self.entries);
        entries.remove(key.name());
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns a new context that contains the entries of both contexts. Entries of `other` take
    /// precedence.
    #[must_use]
    pub fn merge(&self, other: &ActionContext) -> Self {
        if other.is_empty() {
            return self.clone();
        }

        let mut entries = BTreeMap::clone(&self.entries);
        for (name, value) in other.entries.iter() {
            entries.insert(*name, Arc::clone(value));
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns the names of all keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the context is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Debug for ActionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
