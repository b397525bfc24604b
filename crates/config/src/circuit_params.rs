// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Capacity parameters for the credential and presentation circuits.
//!
//! Every value here is a compile-time template parameter on the circuit side, so a
//! witness built with different capacities will not fit the circuit it is handed to.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// SHA-256 processes input in 64-byte blocks; padded buffers must be whole blocks.
pub const SHA256_BLOCK_BYTES: usize = 64;

/// Errors produced while building or validating circuit parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("expected {expected} circuit parameters, got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
    #[error("{name} = {value} is not a multiple of the {block}-byte SHA-256 block")]
    NotBlockAligned {
        name: &'static str,
        value: usize,
        block: usize,
    },
    #[error("max_b64_payload_length ({payload}) must be smaller than max_message_length ({message})")]
    PayloadExceedsMessage { payload: usize, message: usize },
    #[error("limb layout of {count} x {bits} bits cannot hold a 256-bit value")]
    LimbLayoutTooSmall { bits: usize, count: usize },
    #[error("limb layout of {count} x {bits} bits overflows")]
    LimbLayoutOverflow { bits: usize, count: usize },
    #[error("limb layout of {count} x {bits} bits is out of range")]
    LimbLayoutOutOfRange { bits: usize, count: usize },
}

/// Widest limb that always stays below the P-256 base field modulus.
pub const MAX_LIMB_BITS: usize = 255;
/// A 256-bit value never needs more limbs than this.
pub const MAX_LIMB_COUNT: usize = 256;

/// Optional limb decomposition for scalar witness values.
///
/// When absent, scalars are emitted as single field elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimbLayout {
    /// Bits per limb (n).
    pub bits: usize,
    /// Number of limbs (k).
    pub count: usize,
}

impl LimbLayout {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.bits == 0 {
            return Err(ParamsError::Zero { name: "limb bits" });
        }
        if self.count == 0 {
            return Err(ParamsError::Zero { name: "limb count" });
        }
        if self.bits > MAX_LIMB_BITS || self.count > MAX_LIMB_COUNT {
            return Err(ParamsError::LimbLayoutOutOfRange {
                bits: self.bits,
                count: self.count,
            });
        }
        if self.total_bits()? < 256 {
            return Err(ParamsError::LimbLayoutTooSmall {
                bits: self.bits,
                count: self.count,
            });
        }
        Ok(())
    }

    /// `bits * count`, or [`ParamsError::LimbLayoutOverflow`].
    pub fn total_bits(&self) -> Result<usize, ParamsError> {
        self.bits
            .checked_mul(self.count)
            .ok_or(ParamsError::LimbLayoutOverflow {
                bits: self.bits,
                count: self.count,
            })
    }
}

/// Capacities of the credential (Register) circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialCircuitParams {
    /// Bytes of SHA-256 padded signing input (`header.payload`).
    pub max_message_length: usize,
    /// Characters of the base64url payload segment.
    pub max_b64_payload_length: usize,
    /// Disclosures the circuit can match; also the claim row count.
    pub max_matches: usize,
    /// Bytes of a single disclosure digest.
    pub max_substring_length: usize,
    /// Bytes of a single SHA-256 padded disclosure.
    pub max_claim_length: usize,
    pub limbs: Option<LimbLayout>,
}

impl Default for CredentialCircuitParams {
    fn default() -> Self {
        Self {
            max_message_length: 2048,
            max_b64_payload_length: 2000,
            max_matches: 4,
            max_substring_length: 50,
            max_claim_length: 128,
            limbs: None,
        }
    }
}

impl CredentialCircuitParams {
    pub const ARITY: usize = 5;

    /// Build from values in circuit template order:
    /// `[max_message_length, max_b64_payload_length, max_matches, max_substring_length, max_claim_length]`.
    pub fn from_values(values: &[usize]) -> Result<Self, ParamsError> {
        let [max_message_length, max_b64_payload_length, max_matches, max_substring_length, max_claim_length] =
            values
        else {
            return Err(ParamsError::Arity {
                expected: Self::ARITY,
                actual: values.len(),
            });
        };

        let params = Self {
            max_message_length: *max_message_length,
            max_b64_payload_length: *max_b64_payload_length,
            max_matches: *max_matches,
            max_substring_length: *max_substring_length,
            max_claim_length: *max_claim_length,
            limbs: None,
        };
        params.validate()?;
        Ok(params)
    }

    /// Values in circuit template order.
    pub fn to_values(&self) -> [usize; Self::ARITY] {
        [
            self.max_message_length,
            self.max_b64_payload_length,
            self.max_matches,
            self.max_substring_length,
            self.max_claim_length,
        ]
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        non_zero("max_message_length", self.max_message_length)?;
        non_zero("max_b64_payload_length", self.max_b64_payload_length)?;
        non_zero("max_matches", self.max_matches)?;
        non_zero("max_substring_length", self.max_substring_length)?;
        non_zero("max_claim_length", self.max_claim_length)?;
        block_aligned("max_message_length", self.max_message_length)?;
        block_aligned("max_claim_length", self.max_claim_length)?;

        if self.max_b64_payload_length >= self.max_message_length {
            return Err(ParamsError::PayloadExceedsMessage {
                payload: self.max_b64_payload_length,
                message: self.max_message_length,
            });
        }

        if let Some(limbs) = &self.limbs {
            limbs.validate()?;
        }
        Ok(())
    }
}

/// Capacities of the presentation (Show) circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationCircuitParams {
    /// Bytes of the verifier nonce.
    pub max_nonce_length: usize,
    pub limbs: Option<LimbLayout>,
}

impl Default for PresentationCircuitParams {
    fn default() -> Self {
        Self {
            max_nonce_length: 256,
            limbs: None,
        }
    }
}

impl PresentationCircuitParams {
    pub const ARITY: usize = 1;

    /// Build from values in circuit template order: `[max_nonce_length]`.
    pub fn from_values(values: &[usize]) -> Result<Self, ParamsError> {
        let [max_nonce_length] = values else {
            return Err(ParamsError::Arity {
                expected: Self::ARITY,
                actual: values.len(),
            });
        };

        let params = Self {
            max_nonce_length: *max_nonce_length,
            limbs: None,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        non_zero("max_nonce_length", self.max_nonce_length)?;
        if let Some(limbs) = &self.limbs {
            limbs.validate()?;
        }
        Ok(())
    }
}

fn non_zero(name: &'static str, value: usize) -> Result<(), ParamsError> {
    if value == 0 {
        return Err(ParamsError::Zero { name });
    }
    Ok(())
}

fn block_aligned(name: &'static str, value: usize) -> Result<(), ParamsError> {
    if value % SHA256_BLOCK_BYTES != 0 {
        return Err(ParamsError::NotBlockAligned {
            name,
            value,
            block: SHA256_BLOCK_BYTES,
        });
    }
    Ok(())
}
