// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

#![allow(dead_code)]

pub mod verifiers;

use std::sync::Arc;

use zkid_config::{CredentialCircuitParams, PresentationCircuitParams};
use zkid_zk_prover::{ConstraintVerifier, Session, ZkProver};

pub const NONCE: &str = "challenge-nonce-12345";

pub fn session_with(verifier: Arc<dyn ConstraintVerifier>) -> Session {
    Session::new(
        ZkProver::new(verifier),
        CredentialCircuitParams::default(),
        PresentationCircuitParams::default(),
    )
}
