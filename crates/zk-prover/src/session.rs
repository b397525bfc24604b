// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Register → Show sequencing for one credential.
//!
//! ```text
//! Unregistered --register--> Registered --receive_nonce--> Presenting --present--> Presented
//!                                 ^                                                    |
//!                                 +------------------ receive_nonce -------------------+
//! ```
//!
//! Any witness, verifier or attestation failure moves the session to `Failed`, which
//! is terminal. The device key and the attested claims travel inside the state;
//! nothing is shared between sessions.

use num_bigint::BigUint;
use tracing::{debug, info, warn};
use zkid_config::{CredentialCircuitParams, LimbLayout, PresentationCircuitParams, WitnessConfig};
use zkid_zk_helpers::{
    from_limbs, Circuit, ClaimValue, CredentialCircuit, CredentialCircuitInput, CredentialWitness,
    CurvePoint, DeviceKey, DisclosedClaim, FieldElement, PresentationCircuit,
    PresentationCircuitInput, WitnessMap, WitnessValue,
};

use crate::error::ZkError;
use crate::prover::ZkProver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unregistered,
    Registered {
        device_key: DeviceKey,
        claims: Vec<DisclosedClaim>,
    },
    Presenting {
        device_key: DeviceKey,
        claims: Vec<DisclosedClaim>,
        nonce: String,
    },
    Presented {
        device_key: DeviceKey,
        claims: Vec<DisclosedClaim>,
    },
    Failed { error: ZkError },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Registered { .. } => "registered",
            Self::Presenting { .. } => "presenting",
            Self::Presented { .. } => "presented",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn device_key(&self) -> Option<&DeviceKey> {
        match self {
            Self::Registered { device_key, .. }
            | Self::Presenting { device_key, .. }
            | Self::Presented { device_key, .. } => Some(device_key),
            Self::Unregistered | Self::Failed { .. } => None,
        }
    }

    /// Claims attested at Register, empty before Register and after failure.
    pub fn claims(&self) -> &[DisclosedClaim] {
        match self {
            Self::Registered { claims, .. }
            | Self::Presenting { claims, .. }
            | Self::Presented { claims, .. } => claims,
            Self::Unregistered | Self::Failed { .. } => &[],
        }
    }
}

/// Protocol orchestrator for one credential and its device key.
#[derive(Debug, Clone)]
pub struct Session {
    prover: ZkProver,
    credential: CredentialCircuitParams,
    presentation: PresentationCircuitParams,
    state: SessionState,
}

impl Session {
    pub fn new(
        prover: ZkProver,
        credential: CredentialCircuitParams,
        presentation: PresentationCircuitParams,
    ) -> Self {
        Self {
            prover,
            credential,
            presentation,
            state: SessionState::Unregistered,
        }
    }

    pub fn from_config(prover: ZkProver, config: &WitnessConfig) -> Self {
        Self::new(
            prover,
            config.credential.clone(),
            config.presentation.clone(),
        )
    }

    /// Resume from the device key and claims attested by an earlier Register.
    pub fn resume(mut self, device_key: DeviceKey, claims: Vec<DisclosedClaim>) -> Self {
        self.state = SessionState::Registered { device_key, claims };
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn device_key(&self) -> Option<&DeviceKey> {
        self.state.device_key()
    }

    pub fn claims(&self) -> &[DisclosedClaim] {
        self.state.claims()
    }

    /// Register phase: check the credential and take the device key the circuit attests.
    pub async fn register(&mut self, input: &CredentialCircuitInput) -> Result<DeviceKey, ZkError> {
        self.guard("register", |state| matches!(state, SessionState::Unregistered))?;

        let result = self.attest_credential(input).await;
        let (device_key, claims) = self.settle(result)?;

        info!(
            "registered device key {} with {} attested claims",
            device_key.did_key(),
            claims.len()
        );
        self.state = SessionState::Registered {
            device_key: device_key.clone(),
            claims,
        };
        Ok(device_key)
    }

    /// Accept a verifier nonce. Allowed after Register and after each completed Show.
    pub fn receive_nonce(&mut self, nonce: impl Into<String>) -> Result<(), ZkError> {
        self.guard("receive a nonce", |state| {
            matches!(
                state,
                SessionState::Registered { .. } | SessionState::Presented { .. }
            )
        })?;

        let (SessionState::Registered { device_key, claims }
        | SessionState::Presented { device_key, claims }) = &self.state
        else {
            return Err(self.invalid("receive a nonce"));
        };
        let nonce = nonce.into();
        debug!("presenting for nonce {:?}", nonce);
        self.state = SessionState::Presenting {
            device_key: device_key.clone(),
            claims: claims.clone(),
            nonce,
        };
        Ok(())
    }

    /// Show phase: prove control of the registered key with a signature over the pending nonce.
    pub async fn present(&mut self, device_signature: &str) -> Result<(), ZkError> {
        self.guard("present", |state| {
            matches!(state, SessionState::Presenting { .. })
        })?;

        let SessionState::Presenting {
            device_key,
            claims,
            nonce,
        } = &self.state
        else {
            return Err(self.invalid("present"));
        };
        let input = PresentationCircuitInput {
            nonce: nonce.clone(),
            device_signature: device_signature.to_string(),
            device_key: device_key.clone(),
        };
        let (device_key, claims) = (device_key.clone(), claims.clone());

        let result = self
            .prover
            .prove(&PresentationCircuit, &self.presentation, &input)
            .await
            .map(|_| ());
        self.settle(result)?;

        info!("presentation accepted for {}", device_key.did_key());
        self.state = SessionState::Presented { device_key, claims };
        Ok(())
    }

    async fn attest_credential(
        &self,
        input: &CredentialCircuitInput,
    ) -> Result<(DeviceKey, Vec<DisclosedClaim>), ZkError> {
        let attested = self
            .prover
            .prove(&CredentialCircuit, &self.credential, input)
            .await?;
        let limbs = self.credential.limbs.as_ref();
        let [x_name, y_name, messages_name] = <CredentialCircuit as Circuit>::OUTPUTS else {
            return Err(ZkError::MissingOutput("KeyBindingX".to_string()));
        };
        let x = scalar_output(&attested.outputs, x_name, limbs)?;
        let y = scalar_output(&attested.outputs, y_name, limbs)?;
        let key = CurvePoint::new(x, y)?;

        let expected = &attested.witness.device_key;
        if &key != expected {
            return Err(ZkError::AttestationMismatch {
                expected: expected.did_key(),
                attested: key.did_key(),
            });
        }

        let claims = attested_claims(&attested.outputs, messages_name, &attested.witness)?;
        Ok((key, claims))
    }

    /// A failed session stays failed; other states must satisfy `allowed`.
    fn guard(
        &self,
        action: &'static str,
        allowed: impl Fn(&SessionState) -> bool,
    ) -> Result<(), ZkError> {
        if let SessionState::Failed { error } = &self.state {
            return Err(ZkError::SessionFailed(error.to_string()));
        }
        if !allowed(&self.state) {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> ZkError {
        ZkError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    fn settle<T>(&mut self, result: Result<T, ZkError>) -> Result<T, ZkError> {
        result.inspect_err(|error| {
            warn!("session failed in state {}: {}", self.state.name(), error);
            self.state = SessionState::Failed {
                error: error.clone(),
            };
        })
    }
}

/// Read an attested scalar, native or as limbs.
fn scalar_output(
    outputs: &WitnessMap,
    name: &str,
    limbs: Option<&LimbLayout>,
) -> Result<BigUint, ZkError> {
    let missing = || ZkError::MissingOutput(name.to_string());
    match (outputs.get(name).ok_or_else(missing)?, limbs) {
        (WitnessValue::Field(value), None) => Ok(value.value().clone()),
        (WitnessValue::Array(values), Some(layout)) if values.len() == layout.count => {
            let limbs = values
                .iter()
                .map(|v| v.as_field().map(|f| f.value().clone()))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(missing)?;
            Ok(from_limbs(&limbs, layout.bits))
        }
        _ => Err(missing()),
    }
}

/// Decode the attested `messages` rows and compare them with the disclosed claims.
fn attested_claims(
    outputs: &WitnessMap,
    name: &str,
    witness: &CredentialWitness,
) -> Result<Vec<DisclosedClaim>, ZkError> {
    let missing = || ZkError::MissingOutput(name.to_string());
    let rows = outputs.array(name).ok_or_else(missing)?;

    witness
        .disclosed
        .iter()
        .zip(&witness.decode_flags)
        .enumerate()
        .map(|(i, (expected, mode))| {
            let row = rows
                .get(i)
                .and_then(WitnessValue::as_array)
                .and_then(|row| {
                    row.iter()
                        .map(|v| v.as_field().cloned())
                        .collect::<Option<Vec<FieldElement>>>()
                })
                .ok_or_else(missing)?;

            let mismatch = |attested: String| ZkError::AttestationMismatch {
                expected: expected.to_string(),
                attested,
            };
            let value = ClaimValue::from_row(*mode, &row)
                .ok_or_else(|| mismatch(format!("undecodable {name} row {i}")))?;
            let claim = DisclosedClaim {
                name: expected.name.clone(),
                value,
            };
            if &claim != expected {
                return Err(mismatch(claim.to_string()));
            }
            Ok(claim)
        })
        .collect()
}
