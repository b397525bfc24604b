// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Device-binding circuit type and implementations of [`Circuit`], [`CircuitCodegen`], [`CircuitComputation`].

use zkid_config::PresentationCircuitParams;

use crate::circuits::presentation::computation::PresentationWitness;
use crate::codec::DeviceKey;
use crate::codegen::{Artifacts, CircuitCodegen};
use crate::computation::{CircuitComputation, Computation, ToWitnessMap};
use crate::errors::{ArtifactError, WitnessError};
use crate::registry::Circuit;

/// Show-phase circuit (name: `presentation`).
/// Proves control of the device key attested during Register.
#[derive(Debug)]
pub struct PresentationCircuit;

/// Input for [`PresentationCircuit`].
#[derive(Debug, Clone)]
pub struct PresentationCircuitInput {
    /// Verifier-issued challenge.
    pub nonce: String,
    /// Compact base64url signature over `nonce` by the device key.
    pub device_signature: String,
    /// Key attested by the credential circuit; supplied by the caller.
    pub device_key: DeviceKey,
}

impl Circuit for PresentationCircuit {
    const NAME: &'static str = "presentation";
    const PREFIX: &'static str = "PRESENTATION";
    const INPUTS: &'static [&'static str] = &[
        "deviceKeyX",
        "deviceKeyY",
        "sig_r",
        "sig_s_inverse",
        "messageHash",
    ];
    const OUTPUTS: &'static [&'static str] = &[];
}

impl CircuitComputation for PresentationCircuit {
    type Params = PresentationCircuitParams;
    type Input = PresentationCircuitInput;
    type Output = PresentationWitness;
    type Error = WitnessError;

    fn compute(
        &self,
        params: &Self::Params,
        input: &Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        PresentationWitness::compute(params, input)
    }
}

impl CircuitCodegen for PresentationCircuit {
    type Params = PresentationCircuitParams;
    type Input = PresentationCircuitInput;
    type Error = ArtifactError;

    fn codegen(&self, params: &Self::Params, input: &Self::Input) -> Result<Artifacts, Self::Error> {
        let witness = CircuitComputation::compute(self, params, input)?;
        Artifacts::from_witness(&witness.to_witness_map()?)
    }
}
