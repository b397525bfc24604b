// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use zkid_config::WitnessConfig;
use zkid_zk_helpers::{ToWitnessMap, WitnessMap};

use crate::error::ZkError;
use crate::traits::{ConstraintVerifier, Provable};

/// A witness together with what the verifier attested about it.
#[derive(Debug, Clone)]
pub struct Attested<W> {
    pub witness: W,
    pub outputs: WitnessMap,
}

/// Builds witnesses and hands them to the constraint verifier, with an optional timeout.
#[derive(Clone)]
pub struct ZkProver {
    verifier: Arc<dyn ConstraintVerifier>,
    timeout: Option<Duration>,
}

impl ZkProver {
    pub fn new(verifier: Arc<dyn ConstraintVerifier>) -> Self {
        Self {
            verifier,
            timeout: None,
        }
    }

    pub fn from_config(verifier: Arc<dyn ConstraintVerifier>, config: &WitnessConfig) -> Self {
        Self {
            verifier,
            timeout: config.verifier_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Build the witness for `circuit` and run the verifier on it.
    ///
    /// Witness errors are returned before the verifier is invoked. A rejection is
    /// [`ZkError::VerifierRejected`]; nothing is retried.
    pub async fn prove<P: Provable>(
        &self,
        circuit: &P,
        params: &P::Params,
        input: &P::Input,
    ) -> Result<Attested<P::Witness>, ZkError> {
        let witness = circuit.build_witness(params, input)?;
        let map = witness.to_witness_map()?;
        let outputs = self.check(circuit.circuit(), &map).await?;
        Ok(Attested { witness, outputs })
    }

    /// Run the verifier on an already assembled witness map.
    pub async fn check(&self, circuit: &str, witness: &WitnessMap) -> Result<WitnessMap, ZkError> {
        debug!(
            "checking {} witness ({} signals) against constraint verifier",
            circuit,
            witness.len()
        );
        let started = Instant::now();

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.verifier.check(circuit, witness))
                .await
                .map_err(|_| {
                    warn!("constraint verifier timed out on {} after {:?}", circuit, limit);
                    ZkError::VerifierTimeout(limit)
                })??,
            None => self.verifier.check(circuit, witness).await?,
        };

        if !outcome.accepted {
            warn!("constraint verifier rejected {} witness", circuit);
            return Err(ZkError::VerifierRejected(circuit.to_string()));
        }

        info!(
            "{} witness accepted in {:?} ({} outputs)",
            circuit,
            started.elapsed(),
            outcome.outputs.len()
        );
        Ok(outcome.outputs)
    }
}

impl std::fmt::Debug for ZkProver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZkProver")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
