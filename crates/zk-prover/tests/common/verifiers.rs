// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Stand-ins for the constraint verifier. [`MockVerifier`] re-checks the witness
//! relations off-circuit and attests the `cnf` key and the decoded claims like the
//! credential circuit does.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use zkid_zk_helpers::{
    base64url_decode, digest_mod_n, sha256_unpad, verify_relation, ClaimValue, CurvePoint,
    DecodeMode, Disclosure, FieldElement, Jwk, SignatureCheck, WitnessMap, WitnessValue,
};
use zkid_zk_prover::{ConstraintVerifier, VerifierOutcome, ZkError};

#[derive(Debug, Default)]
pub struct MockVerifier {
    calls: AtomicUsize,
}

impl MockVerifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConstraintVerifier for MockVerifier {
    async fn check(
        &self,
        circuit: &str,
        witness: &WitnessMap,
    ) -> Result<VerifierOutcome, ZkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outputs = match circuit {
            "credential" => check_credential(witness),
            "presentation" => check_presentation(witness),
            other => return Err(ZkError::VerifierBackend(format!("unknown circuit {other}"))),
        };
        Ok(outputs.map_or_else(VerifierOutcome::reject, VerifierOutcome::accept))
    }
}

/// Delays every answer by `delay`, then defers to [`MockVerifier`].
#[derive(Debug, Default)]
pub struct SlowVerifier {
    pub delay: Duration,
    pub inner: MockVerifier,
}

#[async_trait]
impl ConstraintVerifier for SlowVerifier {
    async fn check(
        &self,
        circuit: &str,
        witness: &WitnessMap,
    ) -> Result<VerifierOutcome, ZkError> {
        tokio::time::sleep(self.delay).await;
        self.inner.check(circuit, witness).await
    }
}

/// Defers to [`MockVerifier`] but swaps the first attested claim for `value`.
#[derive(Debug)]
pub struct TamperingVerifier {
    pub value: ClaimValue,
    pub inner: MockVerifier,
}

#[async_trait]
impl ConstraintVerifier for TamperingVerifier {
    async fn check(
        &self,
        circuit: &str,
        witness: &WitnessMap,
    ) -> Result<VerifierOutcome, ZkError> {
        let mut outcome = self.inner.check(circuit, witness).await?;
        let Some(rows) = outcome.outputs.array("messages") else {
            return Ok(outcome);
        };
        let mut rows = rows.to_vec();
        let width = rows.first().and_then(WitnessValue::as_array).map_or(0, <[_]>::len);
        let row = self
            .value
            .to_row(width)
            .map_err(|e| ZkError::VerifierBackend(e.to_string()))?;
        rows[0] = WitnessValue::Array(row.into_iter().map(WitnessValue::Field).collect());
        outcome.outputs.insert("messages", WitnessValue::Array(rows));
        Ok(outcome)
    }
}

/// Accepts everything and attests `key` as the device key.
#[derive(Debug)]
pub struct LyingVerifier {
    pub key: CurvePoint,
}

#[async_trait]
impl ConstraintVerifier for LyingVerifier {
    async fn check(
        &self,
        _circuit: &str,
        _witness: &WitnessMap,
    ) -> Result<VerifierOutcome, ZkError> {
        Ok(VerifierOutcome::accept(key_binding(&self.key)))
    }
}

fn key_binding(key: &CurvePoint) -> WitnessMap {
    let mut outputs = WitnessMap::new();
    outputs
        .insert("KeyBindingX", WitnessValue::Field(key.x_field()))
        .insert("KeyBindingY", WitnessValue::Field(key.y_field()));
    outputs
}

fn usize_at(witness: &WitnessMap, name: &str) -> Option<usize> {
    witness.field(name)?.to_usize()
}

fn usizes(witness: &WitnessMap, name: &str) -> Option<Vec<usize>> {
    witness
        .array(name)?
        .iter()
        .map(|v| v.as_field()?.to_usize())
        .collect()
}

fn rows(witness: &WitnessMap, name: &str) -> Option<Vec<Vec<u8>>> {
    witness.array(name)?.iter().map(WitnessValue::to_bytes).collect()
}

fn point(witness: &WitnessMap, x: &str, y: &str) -> Option<CurvePoint> {
    let x = witness.field(x)?.value().clone();
    let y = witness.field(y)?.value().clone();
    CurvePoint::new(x, y).ok()
}

fn relation_holds(witness: &WitnessMap, digest: &FieldElement, key: &CurvePoint) -> bool {
    match (witness.field("sig_r"), witness.field("sig_s_inverse")) {
        (Some(r), Some(s_inverse)) => {
            verify_relation(digest.value(), r.value(), s_inverse.value(), key)
                == SignatureCheck::Valid
        }
        _ => false,
    }
}

fn check_credential(witness: &WitnessMap) -> Option<WitnessMap> {
    let message = witness.get("message")?.to_bytes()?;
    let length = usize_at(witness, "messageLength")?;
    let signing_input = sha256_unpad(message.get(..length)?)?;

    let issuer = point(witness, "pubKeyX", "pubKeyY")?;
    let digest = FieldElement::reduce(digest_mod_n(signing_input));
    if !relation_holds(witness, &digest, &issuer) {
        return None;
    }

    let period = usize_at(witness, "periodIndex")?;
    let payload_b64 = std::str::from_utf8(signing_input.get(period + 1..)?).ok()?;
    let payload = base64url_decode(payload_b64).ok()?;

    let count = usize_at(witness, "matchesCount")?;
    let substrings = rows(witness, "matchSubstring")?;
    let match_lengths = usizes(witness, "matchLength")?;
    let indices = usizes(witness, "matchIndex")?;
    let claims = rows(witness, "claims")?;
    let claim_lengths = usizes(witness, "claimLengths")?;
    let flags = usizes(witness, "decodeFlags")?;
    let width = claims.first()?.len();
    let mut messages = vec![vec![FieldElement::zero(); width]; flags.len()];

    for i in 0..count {
        let digest = substrings.get(i)?.get(..match_lengths[i])?;
        if payload.get(indices[i]..indices[i] + match_lengths[i])? != digest {
            return None;
        }
        let claim = std::str::from_utf8(claims.get(i)?.get(..claim_lengths[i])?).ok()?;
        let disclosure = Disclosure::parse(claim).ok()?;
        if disclosure.digest().as_bytes() != digest {
            return None;
        }
        let mode = DecodeMode::try_from(u8::try_from(*flags.get(i)?).ok()?).ok()?;
        let value = mode.decode(&disclosure.claim().value).ok()?;
        messages[i] = value.to_row(width).ok()?;
    }

    let payload: serde_json::Value = serde_json::from_slice(&payload).ok()?;
    let jwk: Jwk = serde_json::from_value(payload["cnf"]["jwk"].clone()).ok()?;
    let mut outputs = key_binding(&jwk.to_point().ok()?);
    outputs.insert(
        "messages",
        WitnessValue::Array(
            messages
                .into_iter()
                .map(|row| WitnessValue::Array(row.into_iter().map(WitnessValue::Field).collect()))
                .collect(),
        ),
    );
    Some(outputs)
}

fn check_presentation(witness: &WitnessMap) -> Option<WitnessMap> {
    let device = point(witness, "deviceKeyX", "deviceKeyY")?;
    let digest = witness.field("messageHash")?;
    relation_holds(witness, digest, &device).then(WitnessMap::new)
}
