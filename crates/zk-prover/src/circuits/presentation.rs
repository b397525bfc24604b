// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use zkid_config::PresentationCircuitParams;
use zkid_zk_helpers::circuits::{
    CircuitComputation, PresentationCircuit, PresentationCircuitInput, PresentationWitness,
};
use zkid_zk_helpers::Circuit;

use crate::error::ZkError;
use crate::traits::Provable;

impl Provable for PresentationCircuit {
    type Params = PresentationCircuitParams;
    type Input = PresentationCircuitInput;
    type Witness = PresentationWitness;

    fn circuit(&self) -> &'static str {
        <PresentationCircuit as Circuit>::NAME
    }

    fn build_witness(
        &self,
        params: &Self::Params,
        input: &Self::Input,
    ) -> Result<Self::Witness, ZkError> {
        Ok(CircuitComputation::compute(self, params, input)?)
    }
}
