// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use zkid_config::CredentialCircuitParams;
use zkid_zk_helpers::circuits::{
    CircuitComputation, CredentialCircuit, CredentialCircuitInput, CredentialWitness,
};
use zkid_zk_helpers::Circuit;

use crate::error::ZkError;
use crate::traits::Provable;

impl Provable for CredentialCircuit {
    type Params = CredentialCircuitParams;
    type Input = CredentialCircuitInput;
    type Witness = CredentialWitness;

    fn circuit(&self) -> &'static str {
        <CredentialCircuit as Circuit>::NAME
    }

    fn build_witness(
        &self,
        params: &Self::Params,
        input: &Self::Input,
    ) -> Result<Self::Witness, ZkError> {
        Ok(CircuitComputation::compute(self, params, input)?)
    }
}
