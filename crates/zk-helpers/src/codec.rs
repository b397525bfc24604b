// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Byte, base64url, big-integer, limb and key conversions.
//!
//! Everything here is a pure function of its input. Malformed input is an
//! [`WitnessError::InputEncoding`]; keys of the wrong type or off the curve are
//! [`WitnessError::InvalidKey`].

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::pkcs8::DecodePublicKey;
use p256::{AffinePoint, EncodedPoint, FieldBytes, PublicKey};
use serde::{Deserialize, Serialize};
use zkid_config::ParamsError;

use crate::errors::WitnessError;
use crate::field::{FieldElement, BASE_FIELD_MODULUS};

pub const JWK_KTY_EC: &str = "EC";
pub const JWK_CRV_P256: &str = "P-256";

/// Width of a P-256 coordinate or scalar in bytes.
pub const COORDINATE_BYTES: usize = 32;

/// Multicodec prefix of an uncompressed P-256 key in `did:key` identifiers.
const DID_KEY_PREFIX: [u8; 3] = [0xeb, 0x01, 0x00];
const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

pub fn base64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode base64url, tolerating trailing `=` padding.
pub fn base64url_decode(text: &str) -> Result<Vec<u8>, WitnessError> {
    URL_SAFE_NO_PAD
        .decode(text.trim_end_matches('='))
        .map_err(|e| WitnessError::InputEncoding(format!("invalid base64url {text:?}: {e}")))
}

/// Rewrite base64url as standard base64: swap the two alphabet characters and restore padding.
pub fn base64url_to_base64(text: &str) -> String {
    let mut b64: String = text
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let pad = (4 - b64.len() % 4) % 4;
    b64.extend(std::iter::repeat('=').take(pad));
    b64
}

/// Rewrite standard base64 as unpadded base64url.
pub fn base64_to_base64url(text: &str) -> String {
    text.trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

pub fn base64_decode(text: &str) -> Result<Vec<u8>, WitnessError> {
    STANDARD
        .decode(text)
        .map_err(|e| WitnessError::InputEncoding(format!("invalid base64 {text:?}: {e}")))
}

/// Interpret base64url text as a big-endian unsigned integer.
pub fn base64url_to_biguint(text: &str) -> Result<BigUint, WitnessError> {
    Ok(BigUint::from_bytes_be(&base64url_decode(text)?))
}

/// Left-pad `value` to exactly 32 big-endian bytes.
pub fn biguint_to_bytes32(value: &BigUint) -> Result<[u8; COORDINATE_BYTES], WitnessError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > COORDINATE_BYTES {
        return Err(WitnessError::InputEncoding(format!(
            "{value} does not fit in {COORDINATE_BYTES} bytes"
        )));
    }
    let mut out = [0u8; COORDINATE_BYTES];
    out[COORDINATE_BYTES - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// Fixed-width (32 byte) base64url rendering of `value`.
pub fn biguint_to_base64url(value: &BigUint) -> Result<String, WitnessError> {
    Ok(base64url_encode(&biguint_to_bytes32(value)?))
}

/// Split `value` into `count` limbs of `bits` bits, least significant first.
///
/// # Arguments
/// * `value` - Integer to decompose; must be below `2^(bits * count)`
/// * `bits` - Width of each limb
/// * `count` - Number of limbs
///
/// # Returns
/// `limb[i] = floor(value / 2^(bits * i)) mod 2^bits`
pub fn to_limbs(value: &BigUint, bits: usize, count: usize) -> Result<Vec<BigUint>, WitnessError> {
    let capacity = bits
        .checked_mul(count)
        .ok_or(ParamsError::LimbLayoutOverflow { bits, count })?;
    let width = value.bits() as usize;
    WitnessError::ensure_capacity("limb decomposition", width, capacity)?;

    let mask = (BigUint::one() << bits) - BigUint::one();
    let mut rest = value.clone();
    let mut limbs = Vec::with_capacity(count);
    for _ in 0..count {
        limbs.push(&rest & &mask);
        rest >>= bits;
    }
    Ok(limbs)
}

/// Inverse of [`to_limbs`]: `sum(limb[i] * 2^(bits * i))`.
pub fn from_limbs(limbs: &[BigUint], bits: usize) -> BigUint {
    limbs
        .iter()
        .rev()
        .fold(BigUint::zero(), |acc, limb| (acc << bits) + limb)
}

/// A point on P-256, verified on-curve at construction. The identity is not representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurvePoint {
    x: BigUint,
    y: BigUint,
    affine: AffinePoint,
}

/// Device binding key carried in a credential's confirmation claim.
pub type DeviceKey = CurvePoint;

impl CurvePoint {
    pub fn new(x: BigUint, y: BigUint) -> Result<Self, WitnessError> {
        for (name, coordinate) in [("x", &x), ("y", &y)] {
            if coordinate >= &*BASE_FIELD_MODULUS {
                return Err(WitnessError::InvalidKey(format!(
                    "{name} coordinate is not a canonical field element"
                )));
            }
        }
        let x_bytes = FieldBytes::from(biguint_to_bytes32(&x)?);
        let y_bytes = FieldBytes::from(biguint_to_bytes32(&y)?);
        let encoded = EncodedPoint::from_affine_coordinates(&x_bytes, &y_bytes, false);
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or_else(|| WitnessError::InvalidKey("point is not on P-256".to_string()))?;
        Ok(Self { x, y, affine })
    }

    pub fn from_affine(affine: &AffinePoint) -> Result<Self, WitnessError> {
        let encoded = affine.to_encoded_point(false);
        match (encoded.x(), encoded.y()) {
            (Some(x), Some(y)) => Ok(Self {
                x: BigUint::from_bytes_be(x),
                y: BigUint::from_bytes_be(y),
                affine: *affine,
            }),
            _ => Err(WitnessError::InvalidKey(
                "point at infinity is not a valid key".to_string(),
            )),
        }
    }

    /// Parse a DER encoded SubjectPublicKeyInfo.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, WitnessError> {
        let key = PublicKey::from_public_key_der(der)
            .map_err(|e| WitnessError::InvalidKey(format!("not a P-256 public key: {e}")))?;
        Self::from_affine(key.as_affine())
    }

    /// Parse a PEM `PUBLIC KEY` block.
    pub fn from_spki_pem(pem: &str) -> Result<Self, WitnessError> {
        let key = PublicKey::from_public_key_pem(pem)
            .map_err(|e| WitnessError::InvalidKey(format!("not a P-256 public key: {e}")))?;
        Self::from_affine(key.as_affine())
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }

    pub fn x_field(&self) -> FieldElement {
        FieldElement::reduce(self.x.clone())
    }

    pub fn y_field(&self) -> FieldElement {
        FieldElement::reduce(self.y.clone())
    }

    pub fn affine(&self) -> &AffinePoint {
        &self.affine
    }

    pub fn to_jwk(&self) -> Jwk {
        Jwk::from_point(self)
    }

    /// `did:key:z` followed by base58btc of the multicodec-prefixed uncompressed point.
    pub fn did_key(&self) -> String {
        let encoded = self.affine.to_encoded_point(false);
        let mut key_bytes = Vec::with_capacity(DID_KEY_PREFIX.len() + encoded.len());
        key_bytes.extend_from_slice(&DID_KEY_PREFIX);
        key_bytes.push(SEC1_UNCOMPRESSED_TAG);
        // skip the SEC1 tag; the prefix above already carries it
        key_bytes.extend_from_slice(&encoded.as_bytes()[1..]);
        format!("did:key:z{}", bs58::encode(key_bytes).into_string())
    }
}

/// JSON Web Key for an EC public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Jwk {
    pub fn from_point(point: &CurvePoint) -> Self {
        let encoded = point.affine.to_encoded_point(false);
        // an affine point that is not the identity always has both coordinates
        let coordinate = |c: Option<&FieldBytes>| c.map(|b| base64url_encode(b)).unwrap_or_default();
        Self {
            kty: JWK_KTY_EC.to_string(),
            crv: JWK_CRV_P256.to_string(),
            x: coordinate(encoded.x()),
            y: coordinate(encoded.y()),
            kid: None,
        }
    }

    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Decode and validate the key. Only `EC` keys on `P-256` are accepted.
    pub fn to_point(&self) -> Result<CurvePoint, WitnessError> {
        if self.kty != JWK_KTY_EC || self.crv != JWK_CRV_P256 {
            return Err(WitnessError::InvalidKey(format!(
                "expected kty {JWK_KTY_EC} on {JWK_CRV_P256}, got kty {} on {}",
                self.kty, self.crv
            )));
        }
        CurvePoint::new(base64url_to_biguint(&self.x)?, base64url_to_biguint(&self.y)?)
    }
}
