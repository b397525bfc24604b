// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! ES256 signature witnesses.
//!
//! The circuits check `R = (z * s^-1) G + (r * s^-1) Q` and `R.x = r` using only
//! multiplications, so the witness carries `s^-1 mod n` and the digest already
//! reduced mod n. Before a witness is released the same relation is recomputed
//! here; a signature that fails it never reaches the constraint verifier.

use num_bigint::BigUint;
use num_traits::Zero;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::group::{Curve, Group};
use p256::elliptic_curve::point::AffineCoordinates;
use p256::elliptic_curve::PrimeField;
use p256::{FieldBytes, ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::codec::{base64url_decode, base64url_encode, biguint_to_bytes32, CurvePoint, Jwk};
use crate::errors::WitnessError;
use crate::field::{mod_inverse, SCALAR_FIELD_ORDER};

/// Length of a compact `r || s` signature.
pub const COMPACT_SIGNATURE_BYTES: usize = 64;

/// Inputs the circuit needs to check one ECDSA signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureWitness {
    pub r: BigUint,
    /// `s^-1 mod n`.
    pub s_inverse: BigUint,
    /// `SHA-256(message) mod n`.
    pub digest: BigUint,
}

/// Outcome of the off-circuit verification gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Invalid(String),
}

impl SignatureCheck {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

/// A decoded compact signature. Components are range checked before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactSignature {
    pub r: BigUint,
    pub s: BigUint,
}

impl CompactSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WitnessError> {
        if bytes.len() != COMPACT_SIGNATURE_BYTES {
            return Err(WitnessError::InputEncoding(format!(
                "compact signature must be {COMPACT_SIGNATURE_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        let (r, s) = bytes.split_at(COMPACT_SIGNATURE_BYTES / 2);
        Ok(Self {
            r: BigUint::from_bytes_be(r),
            s: BigUint::from_bytes_be(s),
        })
    }

    pub fn from_base64url(text: &str) -> Result<Self, WitnessError> {
        Self::from_bytes(&base64url_decode(text)?)
    }

    pub fn to_base64url(&self) -> Result<String, WitnessError> {
        let mut bytes = Vec::with_capacity(COMPACT_SIGNATURE_BYTES);
        bytes.extend_from_slice(&biguint_to_bytes32(&self.r)?);
        bytes.extend_from_slice(&biguint_to_bytes32(&self.s)?);
        Ok(base64url_encode(&bytes))
    }

    /// Degenerate or out-of-range components can never verify.
    fn check_range(&self) -> SignatureCheck {
        let n = &*SCALAR_FIELD_ORDER;
        if self.r.is_zero() || self.s.is_zero() {
            return SignatureCheck::invalid("r and s must be non-zero");
        }
        if &self.r >= n || &self.s >= n {
            return SignatureCheck::invalid("r and s must be below the group order");
        }
        SignatureCheck::Valid
    }
}

/// `SHA-256(message)` read big-endian and reduced mod n.
pub fn digest_mod_n(message: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&Sha256::digest(message)) % &*SCALAR_FIELD_ORDER
}

fn to_scalar(value: &BigUint) -> Option<Scalar> {
    let bytes = biguint_to_bytes32(value).ok()?;
    Option::from(Scalar::from_repr(FieldBytes::from(bytes)))
}

/// Recompute the relation the circuit enforces.
///
/// `digest` must already be reduced mod n. Computes
/// `R = (digest * s_inverse) G + (r * s_inverse) Q` and accepts iff `R.x mod n == r`.
pub fn verify_relation(
    digest: &BigUint,
    r: &BigUint,
    s_inverse: &BigUint,
    public_key: &CurvePoint,
) -> SignatureCheck {
    let n = &*SCALAR_FIELD_ORDER;
    if r.is_zero() || s_inverse.is_zero() || r >= n || s_inverse >= n || digest >= n {
        return SignatureCheck::invalid("witness scalars out of range");
    }

    let (Some(u1), Some(u2)) = (
        to_scalar(&((digest * s_inverse) % n)),
        to_scalar(&((r * s_inverse) % n)),
    ) else {
        return SignatureCheck::invalid("witness scalars out of range");
    };

    let point = ProjectivePoint::GENERATOR * u1 + ProjectivePoint::from(*public_key.affine()) * u2;
    if bool::from(point.is_identity()) {
        return SignatureCheck::invalid("recomputed point is at infinity");
    }

    let x = BigUint::from_bytes_be(&Curve::to_affine(&point).x());
    if &(x % n) != r {
        return SignatureCheck::invalid("recomputed point does not match r");
    }
    SignatureCheck::Valid
}

/// Builds [`SignatureWitness`] values for messages up to a fixed length.
#[derive(Debug, Clone, Copy)]
pub struct EcdsaWitnessBuilder {
    max_message_length: usize,
}

impl EcdsaWitnessBuilder {
    pub fn new(max_message_length: usize) -> Self {
        Self { max_message_length }
    }

    /// Decode `signature`, invert `s`, and release a witness only if the signature
    /// verifies against `public_key`.
    ///
    /// # Arguments
    /// * `message` - The signed bytes; rejected before hashing if longer than the maximum
    /// * `public_key` - Validated P-256 point of the signer
    /// * `signature` - Compact `r || s`, base64url
    pub fn build(
        &self,
        message: &[u8],
        public_key: &CurvePoint,
        signature: &str,
    ) -> Result<SignatureWitness, WitnessError> {
        WitnessError::ensure_capacity("message", message.len(), self.max_message_length)?;

        let signature = CompactSignature::from_base64url(signature)?;
        if let SignatureCheck::Invalid(reason) = signature.check_range() {
            warn!("Signature rejected: {}", reason);
            return Err(WitnessError::SignatureInvalid(reason));
        }

        let n = &*SCALAR_FIELD_ORDER;
        let s_inverse = mod_inverse(&signature.s, n).ok_or_else(|| {
            WitnessError::InternalArithmetic("s has no inverse modulo the group order".to_string())
        })?;
        let digest = digest_mod_n(message);

        match verify_relation(&digest, &signature.r, &s_inverse, public_key) {
            SignatureCheck::Valid => {
                debug!("Built signature witness for {} byte message", message.len());
                Ok(SignatureWitness {
                    r: signature.r,
                    s_inverse,
                    digest,
                })
            }
            SignatureCheck::Invalid(reason) => {
                warn!("Signature rejected: {}", reason);
                Err(WitnessError::SignatureInvalid(reason))
            }
        }
    }

    /// As [`EcdsaWitnessBuilder::build`], validating the key from its JWK first.
    pub fn build_for_jwk(
        &self,
        message: &[u8],
        public_key: &Jwk,
        signature: &str,
    ) -> Result<SignatureWitness, WitnessError> {
        let point = public_key.to_point()?;
        self.build(message, &point, signature)
    }
}

/// ES256 signer over a P-256 secret scalar.
#[derive(Debug, Clone)]
pub struct EcdsaSigner {
    key: SigningKey,
}

impl EcdsaSigner {
    pub fn random() -> Self {
        Self {
            key: SigningKey::random(&mut OsRng),
        }
    }

    /// Big-endian 32-byte secret scalar.
    pub fn from_scalar_bytes(bytes: &[u8]) -> Result<Self, WitnessError> {
        let key = SigningKey::from_slice(bytes)
            .map_err(|_| WitnessError::InvalidKey("invalid P-256 secret scalar".to_string()))?;
        Ok(Self { key })
    }

    pub fn from_hex(secret: &str) -> Result<Self, WitnessError> {
        let bytes = hex::decode(secret)
            .map_err(|e| WitnessError::InputEncoding(format!("secret scalar hex: {e}")))?;
        Self::from_scalar_bytes(&bytes)
    }

    pub fn public_key(&self) -> Result<CurvePoint, WitnessError> {
        CurvePoint::from_affine(self.key.verifying_key().as_affine())
    }

    pub fn public_jwk(&self) -> Result<Jwk, WitnessError> {
        Ok(self.public_key()?.to_jwk())
    }

    /// Sign `SHA-256(message)`; returns compact `r || s` as base64url.
    pub fn sign(&self, message: &[u8]) -> String {
        let signature: Signature = self.key.sign(message);
        base64url_encode(&signature.to_bytes())
    }
}
