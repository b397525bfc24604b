// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Named witness values as handed to the constraint verifier.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zkid_config::LimbLayout;

use crate::codec::to_limbs;
use crate::errors::WitnessError;
use crate::field::FieldElement;

/// A single field element or a (possibly nested) fixed-size array of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WitnessValue {
    Field(FieldElement),
    Array(Vec<WitnessValue>),
}

impl WitnessValue {
    pub fn bytes(bytes: &[u8]) -> Self {
        Self::Array(bytes.iter().map(|&b| Self::Field(b.into())).collect())
    }

    pub fn usizes(values: &[usize]) -> Self {
        Self::Array(values.iter().map(|&v| Self::Field(v.into())).collect())
    }

    pub fn rows(rows: &[Vec<u8>]) -> Self {
        Self::Array(rows.iter().map(|row| Self::bytes(row)).collect())
    }

    /// A 256-bit scalar, as one field element or as limbs per `layout`.
    pub fn scalar(value: &BigUint, layout: Option<&LimbLayout>) -> Result<Self, WitnessError> {
        match layout {
            None => Ok(Self::Field(FieldElement::from_canonical(value.clone())?)),
            Some(layout) => Ok(Self::Array(
                to_limbs(value, layout.bits, layout.count)?
                    .into_iter()
                    .map(|limb| FieldElement::from_canonical(limb).map(Self::Field))
                    .collect::<Result<_, _>>()?,
            )),
        }
    }

    pub fn as_field(&self) -> Option<&FieldElement> {
        match self {
            Self::Field(element) => Some(element),
            Self::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[WitnessValue]> {
        match self {
            Self::Array(values) => Some(values),
            Self::Field(_) => None,
        }
    }

    /// Interpret a flat array of small elements as bytes.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        self.as_array()?
            .iter()
            .map(|v| v.as_field()?.to_u64().and_then(|b| u8::try_from(b).ok()))
            .collect()
    }
}

/// Ordered map from circuit signal name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitnessMap(BTreeMap<String, WitnessValue>);

impl WitnessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: WitnessValue) -> &mut Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&WitnessValue> {
        self.0.get(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldElement> {
        self.get(name)?.as_field()
    }

    pub fn array(&self, name: &str) -> Option<&[WitnessValue]> {
        self.get(name)?.as_array()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
