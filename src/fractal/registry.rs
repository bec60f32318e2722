//! Name-keyed directory of fractal generators.
//!
//! The registry is populated once at startup and then shared read-only by
//! every request handler. The tile service checks [`FractalRegistry::contains`]
//! before it builds anything from the request path, so only registered names
//! ever reach page rendering, cache keys or the disk mirror.

use std::collections::BTreeMap;

use tracing::debug;

use super::generator::{Fractal, FractalGenerator};
use super::generators::{DebugGenerator, JuliaGenerator, MandelbrotGenerator, SolidGenerator};
use super::options::Options;
use crate::error::FractalError;

/// Registry of fractal constructors, ordered by name.
#[derive(Default)]
pub struct FractalRegistry {
    generators: BTreeMap<&'static str, Box<dyn FractalGenerator>>,
}

impl FractalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in families.
    pub fn with_defaults() -> Self {
        Self::new()
            .with(DebugGenerator)
            .with(SolidGenerator)
            .with(MandelbrotGenerator)
            .with(JuliaGenerator)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, generator: impl FractalGenerator + 'static) -> Self {
        self.register(generator);
        self
    }

    /// Register a generator, replacing any previous one with the same name.
    pub fn register(&mut self, generator: impl FractalGenerator + 'static) {
        let name = generator.name();
        if self.generators.insert(name, Box::new(generator)).is_some() {
            debug!(fractal_type = name, "Replaced registered generator");
        }
    }

    /// Look up a generator by name.
    pub fn get(&self, name: &str) -> Option<&dyn FractalGenerator> {
        self.generators.get(name).map(|g| g.as_ref())
    }

    /// Whether `name` is a registered type.
    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.generators.keys().copied()
    }

    /// Registered generators in name order.
    pub fn generators(&self) -> impl Iterator<Item = &dyn FractalGenerator> {
        self.generators.values().map(|g| g.as_ref())
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Build the named fractal.
    pub fn generate(&self, name: &str, options: &Options) -> Result<Box<dyn Fractal>, FractalError> {
        let generator = self
            .get(name)
            .ok_or_else(|| FractalError::UnknownType(name.to_string()))?;
        generator.generate(options)
    }
}

// =============================================================================
// Tests
// =============================================================================
