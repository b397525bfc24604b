// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod circuits;
mod error;
mod prover;
mod session;
mod traits;

pub use error::ZkError;
pub use prover::{Attested, ZkProver};
pub use session::{Session, SessionState};
pub use traits::{ConstraintVerifier, Provable, VerifierOutcome};
