// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Error types for witness preparation and artifact output.

use thiserror::Error;
use zkid_config::ParamsError;

/// Every witness operation returns a complete witness or exactly one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    /// Malformed base64url, JSON, token structure or field encoding.
    #[error("Input encoding error: {0}")]
    InputEncoding(String),
    /// Wrong key type or curve, or a point that is not on the curve.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// The off-circuit verification gate rejected the signature.
    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),
    #[error("Capacity exceeded: {what} has length {len}, maximum is {max}")]
    CapacityExceeded {
        what: &'static str,
        len: usize,
        max: usize,
    },
    /// Guards conditions that well-formed inputs never reach.
    #[error("Internal arithmetic error: {0}")]
    InternalArithmetic(String),
    #[error("Disclosure digest {0} does not occur in the credential payload")]
    ClaimDigestNotFound(String),
    #[error("Invalid circuit parameters: {0}")]
    InvalidParams(#[from] ParamsError),
}

impl WitnessError {
    pub(crate) fn capacity(what: &'static str, len: usize, max: usize) -> Self {
        Self::CapacityExceeded { what, len, max }
    }

    /// Fail with [`WitnessError::CapacityExceeded`] when `len > max`.
    pub(crate) fn ensure_capacity(what: &'static str, len: usize, max: usize) -> Result<(), Self> {
        if len > max {
            return Err(Self::capacity(what, len, max));
        }
        Ok(())
    }
}

/// Errors that can occur while writing witness artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Witness error: {0}")]
    Witness(#[from] WitnessError),
}
