//! The `Common` bag — opaque configuration carried alongside `start`.
//!
//! Simulations often need to thread experiment-wide data (parameters,
//! lookup tables, output channels) down to every model's `init` without the
//! kernel knowing its shape.  `Common` is that carrier: a string-keyed bag
//! of type-erased values, passed by reference through the `start` cascade
//! and retained by executive models so children inserted at runtime receive
//! the same data.
//!
//! Values are stored behind `Arc`, so cloning the bag is cheap and the
//! executive's retained copy shares storage with the driver's.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// String-keyed bag of type-erased, shareable values.
#[derive(Clone, Default)]
pub struct Common {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Common {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Fetch the entry under `key`, if present and of type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Common {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Common")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
