// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Moduli of the target curve (P-256) and the witness field element type.
//!
//! The circuits run natively over the P-256 base field, so every witness value is
//! reduced modulo [`BASE_FIELD_MODULUS`]. Signature arithmetic happens modulo the
//! group order [`SCALAR_FIELD_ORDER`], which is smaller than the base field, so
//! reduced scalars embed without a second reduction.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::WitnessError;

const BASE_FIELD_MODULUS_BE: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

const SCALAR_FIELD_ORDER_BE: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63, 0x25, 0x51,
];

/// Prime p of the P-256 base field; the native field of the circuits.
pub static BASE_FIELD_MODULUS: Lazy<BigUint> =
    Lazy::new(|| BigUint::from_bytes_be(&BASE_FIELD_MODULUS_BE));

/// Order n of the P-256 group; the modulus of ECDSA scalar arithmetic.
pub static SCALAR_FIELD_ORDER: Lazy<BigUint> =
    Lazy::new(|| BigUint::from_bytes_be(&SCALAR_FIELD_ORDER_BE));

/// Modular inverse by the extended Euclidean algorithm.
///
/// Returns `None` when the modulus is zero or `value` shares a factor with it.
pub fn mod_inverse(value: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    if modulus.is_zero() {
        return None;
    }
    let m = BigInt::from(modulus.clone());
    let egcd = BigInt::from(value.clone()).extended_gcd(&m);
    if !egcd.gcd.is_one() {
        return None;
    }
    egcd.x.mod_floor(&m).to_biguint()
}

/// Integer canonically reduced into `[0, p)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// Reduces `value` modulo the base field.
    pub fn reduce(value: BigUint) -> Self {
        Self(value % &*BASE_FIELD_MODULUS)
    }

    /// Accepts `value` only if it is already reduced.
    pub fn from_canonical(value: BigUint) -> Result<Self, WitnessError> {
        if value >= *BASE_FIELD_MODULUS {
            return Err(WitnessError::InputEncoding(format!(
                "{value} is not a canonical field element"
            )));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn into_value(self) -> BigUint {
        self.0
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    pub fn to_usize(&self) -> Option<usize> {
        self.0.to_usize()
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::reduce(BigUint::from(value))
    }
}

impl From<usize> for FieldElement {
    fn from(value: usize) -> Self {
        Self::reduce(BigUint::from(value))
    }
}

impl From<u8> for FieldElement {
    fn from(value: u8) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FieldElement {
    type Err = WitnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = BigUint::from_str(s)
            .map_err(|e| WitnessError::InputEncoding(format!("field element {s:?}: {e}")))?;
        Self::from_canonical(value)
    }
}

// Field elements travel as decimal strings; they do not fit JSON numbers.
impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn moduli_match_p256() {
        assert_eq!(
            SCALAR_FIELD_ORDER.to_str_radix(16),
            "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"
        );
        assert_eq!(
            BASE_FIELD_MODULUS.to_str_radix(16),
            "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff"
        );
        assert!(*SCALAR_FIELD_ORDER < *BASE_FIELD_MODULUS);
    }

    #[test]
    fn reduce_is_canonical() {
        let p = BASE_FIELD_MODULUS.clone();
        assert_eq!(FieldElement::reduce(p.clone()), FieldElement::zero());
        assert_eq!(
            FieldElement::reduce(&p + 5u32),
            FieldElement::from(5u64)
        );
        assert!(FieldElement::from_canonical(p).is_err());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let element = FieldElement::from(1234567u64);
        let json = serde_json::to_string(&element).unwrap();
        assert_eq!(json, "\"1234567\"");
        let back: FieldElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, element);
        assert!(serde_json::from_str::<FieldElement>("\"-1\"").is_err());
    }

    #[test]
    fn inverse_of_non_unit_is_none() {
        let m = BigUint::from(12u32);
        assert_eq!(mod_inverse(&BigUint::from(4u32), &m), None);
        assert_eq!(mod_inverse(&BigUint::from(5u32), &BigUint::zero()), None);
        assert_eq!(mod_inverse(&BigUint::from(5u32), &m), Some(BigUint::from(5u32)));
    }

    proptest! {
        #[test]
        fn inverse_mod_n_multiplies_to_one(bytes in proptest::array::uniform32(any::<u8>())) {
            let n = &*SCALAR_FIELD_ORDER;
            let value = BigUint::from_bytes_be(&bytes) % n;
            prop_assume!(!value.is_zero());
            let inverse = mod_inverse(&value, n).unwrap();
            prop_assert!(inverse < *n);
            prop_assert_eq!((value * inverse) % n, BigUint::one());
        }
    }
}
