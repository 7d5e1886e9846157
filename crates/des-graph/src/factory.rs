//! The dynamics factory — named constructors for atomic models.
//!
//! A graph description refers to models by dynamics name; the factory maps
//! each name to a constructor closure producing a fresh owned model.
//! Constructors must be `Send + Sync` so a factory can be shared across
//! experiment setups.

use std::collections::HashMap;

use des_core::Time;
use des_kernel::Model;

use crate::error::{GraphError, GraphResult};

type Constructor<T, V> = Box<dyn Fn() -> Model<T, V> + Send + Sync>;

/// Registry of dynamics names to model constructors.
///
/// # Example
///
/// ```rust,ignore
/// let mut factory: Factory<f64, i32> = Factory::new();
/// factory.register("Gen", || Model::atomic(Gen::default(), &[], &["out"]));
/// let model = factory.build("Gen")?;
/// ```
pub struct Factory<T: Time, V> {
    constructors: HashMap<String, Constructor<T, V>>,
}

impl<T: Time, V> Factory<T, V> {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register a constructor under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Model<T, V> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Construct a fresh model for `name`.
    pub fn build(&self, name: &str) -> GraphResult<Model<T, V>> {
        match self.constructors.get(name) {
            Some(constructor) => Ok(constructor()),
            None => Err(GraphError::UnknownDynamics(name.to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

impl<T: Time, V> Default for Factory<T, V> {
    fn default() -> Self {
        Self::new()
    }
}
