// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use async_trait::async_trait;
use zkid_zk_helpers::{ToWitnessMap, WitnessMap};

use crate::error::ZkError;

/// Answer of the constraint verifier for one witness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifierOutcome {
    pub accepted: bool,
    /// Attested outputs, named as in the circuit's output list.
    pub outputs: WitnessMap,
}

impl VerifierOutcome {
    pub fn accept(outputs: WitnessMap) -> Self {
        Self {
            accepted: true,
            outputs,
        }
    }

    pub fn reject() -> Self {
        Self::default()
    }
}

/// The external system that checks a witness against a circuit's constraints.
///
/// Implementations must not return partial results: either an outcome or an error.
#[async_trait]
pub trait ConstraintVerifier: Send + Sync {
    async fn check(&self, circuit: &str, witness: &WitnessMap)
        -> Result<VerifierOutcome, ZkError>;
}

/// Trait for circuits whose witness can be handed to a [`ConstraintVerifier`].
///
/// Implementors define how to build witness data from their inputs;
/// [`crate::ZkProver::prove`] runs the verifier on it.
pub trait Provable: Send + Sync {
    type Params: Send + Sync;
    type Input: Send + Sync;
    type Witness: ToWitnessMap + Send + Sync;

    fn circuit(&self) -> &'static str;

    fn build_witness(
        &self,
        params: &Self::Params,
        input: &Self::Input,
    ) -> Result<Self::Witness, ZkError>;
}
