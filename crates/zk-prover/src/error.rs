// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::time::Duration;

use thiserror::Error;
use zkid_zk_helpers::WitnessError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZkError {
    #[error(transparent)]
    Witness(#[from] WitnessError),

    #[error("Circuit '{0}' rejected the witness")]
    VerifierRejected(String),

    #[error("Constraint verifier did not answer within {0:?}")]
    VerifierTimeout(Duration),

    #[error("Constraint verifier failed: {0}")]
    VerifierBackend(String),

    #[error("Verifier output '{0}' is missing or malformed")]
    MissingOutput(String),

    #[error("Verifier attested {attested} where the credential holds {expected}")]
    AttestationMismatch { expected: String, attested: String },

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Session has failed: {0}")]
    SessionFailed(String),
}
