// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod circuit;
pub mod computation;

pub use circuit::{CredentialCircuit, CredentialCircuitInput};
pub use computation::{CredentialWitness, SignedMessage, SubstringMatches};
