// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Computation traits.
//!
//! [`Computation`] computes one witness component from parameters and input.
//! [`CircuitComputation`] assembles the full witness for a registered circuit, and
//! [`ToWitnessMap`] flattens it into the named signals the verifier consumes.

use crate::errors::WitnessError;
use crate::witness::WitnessMap;

/// Generic computation from parameters and input to a result.
pub trait Computation: Sized {
    type Params;
    type Input;
    type Error;

    fn compute(params: &Self::Params, input: &Self::Input) -> Result<Self, Self::Error>;
}

/// Circuit-specific computation: parameters and input produce the circuit witness.
pub trait CircuitComputation: crate::registry::Circuit {
    type Params;
    type Input;
    type Output;
    type Error;

    fn compute(&self, params: &Self::Params, input: &Self::Input)
        -> Result<Self::Output, Self::Error>;
}

/// Conversion of an assembled witness into named circuit signals.
pub trait ToWitnessMap {
    fn to_witness_map(&self) -> Result<WitnessMap, WitnessError>;
}
