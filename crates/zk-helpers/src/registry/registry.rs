// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::circuits::{CredentialCircuit, PresentationCircuit};

/// Errors produced by the circuit registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unknown circuit: {name}")]
    UnknownCircuit { name: String },
}

/// Trait for circuit metadata.
pub trait Circuit: Send + Sync {
    const NAME: &'static str;
    const PREFIX: &'static str;
    /// Witness signal names, in circuit declaration order.
    const INPUTS: &'static [&'static str];
    /// Attested outputs returned by the verifier on success.
    const OUTPUTS: &'static [&'static str];

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn prefix(&self) -> &'static str {
        Self::PREFIX
    }
}

pub trait CircuitMetadata: Send + Sync {
    fn name(&self) -> &'static str;
    fn prefix(&self) -> &'static str;
    fn inputs(&self) -> &'static [&'static str];
    fn outputs(&self) -> &'static [&'static str];
}

impl<T: Circuit> CircuitMetadata for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn prefix(&self) -> &'static str {
        T::PREFIX
    }

    fn inputs(&self) -> &'static [&'static str] {
        T::INPUTS
    }

    fn outputs(&self) -> &'static [&'static str] {
        T::OUTPUTS
    }
}

/// Registry of the circuits a witness can be prepared for.
#[derive(Default)]
pub struct CircuitRegistry {
    circuits: HashMap<String, Arc<dyn CircuitMetadata>>,
}

impl CircuitRegistry {
    /// Build an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the credential and presentation circuits.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CredentialCircuit));
        registry.register(Arc::new(PresentationCircuit));
        registry
    }

    /// Register a circuit descriptor under its name.
    pub fn register(&mut self, circuit: Arc<dyn CircuitMetadata>) {
        self.circuits.insert(circuit.name().to_lowercase(), circuit);
    }

    /// Get a circuit descriptor from the registry.
    pub fn get(&self, name: &str) -> Result<Arc<dyn CircuitMetadata>, RegistryError> {
        self.circuits
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCircuit {
                name: name.to_string(),
            })
    }

    pub fn inputs(&self, name: &str) -> Result<&'static [&'static str], RegistryError> {
        Ok(self.get(name)?.inputs())
    }

    pub fn outputs(&self, name: &str) -> Result<&'static [&'static str], RegistryError> {
        Ok(self.get(name)?.outputs())
    }

    /// List all registered circuit names, sorted.
    pub fn list_circuits(&self) -> Vec<String> {
        let mut names: Vec<String> = self.circuits.keys().cloned().collect();
        names.sort();
        names
    }
}
