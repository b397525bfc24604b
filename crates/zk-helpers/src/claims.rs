// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Fixed-capacity encoding of selectively disclosed claims.
//!
//! Each claim is SHA-256 block padded so the circuit can hash it with a fixed
//! number of compression rounds, then zero-extended to the row width. The true
//! length of every claim is kept alongside the rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::WitnessError;
use crate::field::FieldElement;

const SHA256_BLOCK: usize = 64;
const SHA256_LENGTH_FIELD: usize = 8;

/// SHA-256 message padding, zero-extended to `capacity`.
///
/// Appends `0x80`, zeros up to 56 mod 64, and the 64-bit big-endian bit length.
///
/// # Returns
/// The `capacity`-byte buffer and the length of the padded message inside it.
pub fn sha256_pad(message: &[u8], capacity: usize) -> Result<(Vec<u8>, usize), WitnessError> {
    let bit_length = (message.len() as u64) * 8;
    let mut padded = Vec::with_capacity(capacity.max(message.len() + SHA256_BLOCK));
    padded.extend_from_slice(message);
    padded.push(0x80);
    while padded.len() % SHA256_BLOCK != SHA256_BLOCK - SHA256_LENGTH_FIELD {
        padded.push(0);
    }
    padded.extend_from_slice(&bit_length.to_be_bytes());

    let padded_length = padded.len();
    WitnessError::ensure_capacity("padded message", padded_length, capacity)?;
    padded.resize(capacity, 0);
    Ok((padded, padded_length))
}

/// Recover the original message from a block-padded buffer.
///
/// `padded` is the padded message without trailing zero extension. Returns `None`
/// if the buffer is not a well-formed padding.
pub fn sha256_unpad(padded: &[u8]) -> Option<&[u8]> {
    if padded.len() < SHA256_BLOCK || padded.len() % SHA256_BLOCK != 0 {
        return None;
    }
    let (body, length_field) = padded.split_at(padded.len() - SHA256_LENGTH_FIELD);
    let bit_length = u64::from_be_bytes(length_field.try_into().ok()?);
    if bit_length % 8 != 0 {
        return None;
    }
    let message_length = usize::try_from(bit_length / 8).ok()?;
    if message_length >= body.len() || body[message_length] != 0x80 {
        return None;
    }
    if body[message_length + 1..].iter().any(|&b| b != 0) {
        return None;
    }
    Some(&body[..message_length])
}

/// Copy `bytes` into a zeroed buffer of `capacity` bytes.
pub fn zero_extend(
    what: &'static str,
    bytes: &[u8],
    capacity: usize,
) -> Result<Vec<u8>, WitnessError> {
    WitnessError::ensure_capacity(what, bytes.len(), capacity)?;
    let mut out = vec![0u8; capacity];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

/// How the circuit interprets a disclosed claim value.
///
/// The circuit reads these positionally by ordinal:
///
/// | ordinal | mode          | meaning                                            |
/// |---------|---------------|----------------------------------------------------|
/// | 0       | `Utf8String`  | value bytes are used as-is                         |
/// | 1       | `DecimalDate` | value is a decimal digit string read as an integer |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum DecodeMode {
    #[default]
    Utf8String = 0,
    DecimalDate = 1,
}

impl DecodeMode {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Interpret a disclosed JSON value the way the circuit does in this mode.
    ///
    /// Strings are taken without their quotes; other JSON values by their text.
    /// `DecimalDate` only accepts a non-empty run of ASCII digits (or a JSON
    /// integer) that fits in 64 bits.
    pub fn decode(self, value: &Value) -> Result<ClaimValue, WitnessError> {
        match (self, value) {
            (Self::Utf8String, Value::String(text)) => Ok(ClaimValue::Text(text.clone())),
            (Self::Utf8String, other) => Ok(ClaimValue::Text(other.to_string())),
            (Self::DecimalDate, Value::String(digits)) => parse_decimal(digits),
            (Self::DecimalDate, Value::Number(number)) => {
                number.as_u64().map(ClaimValue::Number).ok_or_else(|| {
                    WitnessError::InputEncoding(format!("{number} is not a decimal date"))
                })
            }
            (Self::DecimalDate, other) => Err(WitnessError::InputEncoding(format!(
                "{other} is not a decimal date"
            ))),
        }
    }
}

fn parse_decimal(digits: &str) -> Result<ClaimValue, WitnessError> {
    let invalid = || WitnessError::InputEncoding(format!("{digits:?} is not a decimal date"));
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse().map(ClaimValue::Number).map_err(|_| invalid())
}

/// A disclosed claim value after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValue {
    Text(String),
    Number(u64),
}

impl ClaimValue {
    /// One `messages` row of `width` elements: text as UTF-8 bytes, a number in the
    /// first element. The rest of the row is zero.
    pub fn to_row(&self, width: usize) -> Result<Vec<FieldElement>, WitnessError> {
        match self {
            Self::Text(text) => Ok(zero_extend("claim value", text.as_bytes(), width)?
                .into_iter()
                .map(FieldElement::from)
                .collect()),
            Self::Number(number) => {
                let mut row = vec![FieldElement::zero(); width];
                if let Some(first) = row.first_mut() {
                    *first = FieldElement::from(*number);
                }
                Ok(row)
            }
        }
    }

    /// Inverse of [`ClaimValue::to_row`]. Trailing zero bytes are not part of a text value.
    pub fn from_row(mode: DecodeMode, row: &[FieldElement]) -> Option<Self> {
        match mode {
            DecodeMode::Utf8String => {
                let mut bytes = row
                    .iter()
                    .map(|element| element.to_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect::<Option<Vec<u8>>>()?;
                while bytes.last() == Some(&0) {
                    bytes.pop();
                }
                String::from_utf8(bytes).ok().map(Self::Text)
            }
            DecodeMode::DecimalDate => {
                let (first, rest) = row.split_first()?;
                if rest.iter().any(|element| element != &FieldElement::zero()) {
                    return None;
                }
                first.to_u64().map(Self::Number)
            }
        }
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// A claim name with the value the credential circuit attests for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosedClaim {
    pub name: String,
    pub value: ClaimValue,
}

impl fmt::Display for DisclosedClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

impl TryFrom<u8> for DecodeMode {
    type Error = WitnessError;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        match ordinal {
            0 => Ok(Self::Utf8String),
            1 => Ok(Self::DecimalDate),
            other => Err(WitnessError::InputEncoding(format!(
                "unknown decode mode ordinal {other}"
            ))),
        }
    }
}

impl From<DecodeMode> for u8 {
    fn from(mode: DecodeMode) -> Self {
        mode.ordinal()
    }
}

/// `max_claims` rows of `max_claim_length` bytes plus the true length of each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedClaimArray {
    rows: Vec<Vec<u8>>,
    lengths: Vec<usize>,
    used: usize,
    width: usize,
}

impl PaddedClaimArray {
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Number of rows holding a claim. An empty claim still occupies its row.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes per row.
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Encodes ordered claim strings into a [`PaddedClaimArray`].
#[derive(Debug, Clone, Copy)]
pub struct ClaimEncoder {
    max_claims: usize,
    max_claim_length: usize,
}

impl ClaimEncoder {
    pub fn new(max_claims: usize, max_claim_length: usize) -> Self {
        Self {
            max_claims,
            max_claim_length,
        }
    }

    /// Encode up to `max_claims` claims. Claims past the capacity are dropped, so
    /// callers that care must check the count first. A claim whose padding does not
    /// fit a row is an error. Input must not already be padded.
    pub fn encode<S: AsRef<str>>(&self, claims: &[S]) -> Result<PaddedClaimArray, WitnessError> {
        let mut rows = vec![vec![0u8; self.max_claim_length]; self.max_claims];
        let mut lengths = vec![0usize; self.max_claims];
        let used = claims.len().min(self.max_claims);

        for (i, claim) in claims.iter().take(used).enumerate() {
            let bytes = claim.as_ref().as_bytes();
            let (padded, _) = sha256_pad(bytes, self.max_claim_length)?;
            rows[i] = padded;
            lengths[i] = bytes.len();
        }

        if claims.len() > self.max_claims {
            debug!(
                "Dropped {} claims beyond capacity {}",
                claims.len() - self.max_claims,
                self.max_claims
            );
        }
        Ok(PaddedClaimArray {
            rows,
            lengths,
            used,
            width: self.max_claim_length,
        })
    }
}
