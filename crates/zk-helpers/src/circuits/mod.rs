// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod codegen;
pub mod computation;
pub mod errors;
pub mod sample;

pub use codegen::*;
pub use computation::*;
pub use errors::*;
pub use sample::*;

pub mod credential;
pub use credential::{
    CredentialCircuit, CredentialCircuitInput, CredentialWitness, SignedMessage, SubstringMatches,
};

pub mod presentation;
pub use presentation::{PresentationCircuit, PresentationCircuitInput, PresentationWitness};
