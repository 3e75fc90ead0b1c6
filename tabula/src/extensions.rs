//! Type-keyed storage for feature-contributed data
//!
//! Tables, columns, rows, cells and headers each carry an [`Extensions`] map.
//! A custom feature's construct hook can stash its own typed data there, and
//! the feature's API reads it back by type.

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A map from a type to one shared value of that type.
#[derive(Clone, Default)]
pub struct Extensions {
    map: HashMap<TypeId, Rc<dyn Any>>,
}

impl Extensions {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, replacing any previous value of the same type.
    pub fn insert<X: 'static>(&mut self, value: X) {
        self.insert_rc(Rc::new(value));
    }

    /// Stores an already shared value.
    pub fn insert_rc<X: 'static>(&mut self, value: Rc<X>) {
        self.map.insert(TypeId::of::<X>(), value);
    }

    /// Returns the shared value of type `X`.
    pub fn get<X: 'static>(&self) -> Option<Rc<X>> {
        self.map
            .get(&TypeId::of::<X>())
            .cloned()
            .and_then(|value| value.downcast::<X>().ok())
    }

    /// Borrows the value of type `X`.
    pub fn get_ref<X: 'static>(&self) -> Option<&X> {
        self.map
            .get(&TypeId::of::<X>())
            .and_then(|value| value.downcast_ref::<X>())
    }

    /// Returns `true` if a value of type `X` is stored.
    pub fn contains<X: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<X>())
    }

    /// Removes the value of type `X`.
    pub fn remove<X: 'static>(&mut self) -> Option<Rc<X>> {
        self.map
            .remove(&TypeId::of::<X>())
            .and_then(|value| value.downcast::<X>().ok())
    }

    /// Copies every value of `other` into `self`, replacing same-typed values.
    pub fn extend(&mut self, other: &Extensions) {
        for (key, value) in &other.map {
            self.map.insert(*key, value.clone());
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Density(u8);

    #[test]
    fn test_insert_and_get_by_type() {
        let mut ext = Extensions::new();
        ext.insert(Density(2));
        ext.insert(String::from("meta"));

        assert_eq!(ext.get_ref::<Density>(), Some(&Density(2)));
        assert_eq!(ext.get::<String>().as_deref(), Some(&String::from("meta")));
        assert!(!ext.contains::<u32>());
        assert_eq!(ext.len(), 2);
    }

    #[test]
    fn test_insert_replaces_same_type() {
        let mut ext = Extensions::new();
        ext.insert(Density(1));
        ext.insert(Density(3));
        assert_eq!(ext.get_ref::<Density>(), Some(&Density(3)));
        assert_eq!(ext.remove::<Density>().as_deref(), Some(&Density(3)));
        assert!(ext.is_empty());
    }
}
