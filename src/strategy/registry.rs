//! Name-keyed strategy construction.
//!
//! The registry is an explicit context object created by the caller and
//! passed where needed; there is no process-wide global. Constructors
//! take no arguments — parameterisation happens through
//! `Strategy::configure` after creation.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{MeanReversionStrategy, StatArbStrategy, Strategy};

type StrategyCtor = Box<dyn Fn() -> Box<dyn Strategy + Send> + Send>;

/// Thread-safe mapping from strategy name to constructor.
#[derive(Default)]
pub struct StrategyRegistry {
    creators: Mutex<HashMap<String, StrategyCtor>>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in strategies.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register("MeanReversion", || {
            Box::new(MeanReversionStrategy::new())
        });
        registry.register("StatArbitrage", || Box::new(StatArbStrategy::new()));
        registry
    }

    /// Register (or replace) a constructor under `name`.
    pub fn register<F>(&self, name: &str, ctor: F)
    where
        F: Fn() -> Box<dyn Strategy + Send> + Send + 'static,
    {
        let mut creators = self
            .creators
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        creators.insert(name.to_string(), Box::new(ctor));
    }

    /// Create a fresh strategy instance, or `None` for an unknown name.
    pub fn create(&self, name: &str) -> Option<Box<dyn Strategy + Send>> {
        let creators = self
            .creators
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        creators.get(name).map(|ctor| ctor())
    }

    /// Registered strategy names, sorted for stable listings.
    pub fn names(&self) -> Vec<String> {
        let creators = self
            .creators
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut names: Vec<String> = creators.keys().cloned().collect();
        names.sort();
        names
    }
}
