// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Witness for the device-binding circuit: the Register-phase device key and a
//! signature witness over the verifier nonce.

use tracing::info;
use zkid_config::{LimbLayout, PresentationCircuitParams};

use crate::circuits::presentation::circuit::PresentationCircuitInput;
use crate::codec::DeviceKey;
use crate::computation::{Computation, ToWitnessMap};
use crate::ecdsa::{EcdsaWitnessBuilder, SignatureWitness};
use crate::errors::WitnessError;
use crate::witness::{WitnessMap, WitnessValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationWitness {
    pub device_key: DeviceKey,
    /// Signature over the nonce; `digest` is `SHA-256(nonce) mod n`.
    pub signature: SignatureWitness,
    pub limbs: Option<LimbLayout>,
}

impl Computation for PresentationWitness {
    type Params = PresentationCircuitParams;
    type Input = PresentationCircuitInput;
    type Error = WitnessError;

    fn compute(params: &Self::Params, input: &Self::Input) -> Result<Self, Self::Error> {
        params.validate()?;
        // the only place nonce length is enforced
        WitnessError::ensure_capacity("nonce", input.nonce.len(), params.max_nonce_length)?;

        let signature = EcdsaWitnessBuilder::new(params.max_nonce_length).build(
            input.nonce.as_bytes(),
            &input.device_key,
            &input.device_signature,
        )?;
        info!("Built presentation witness for {}", input.device_key.did_key());

        Ok(PresentationWitness {
            device_key: input.device_key.clone(),
            signature,
            limbs: params.limbs,
        })
    }
}

impl ToWitnessMap for PresentationWitness {
    fn to_witness_map(&self) -> Result<WitnessMap, WitnessError> {
        let limbs = self.limbs.as_ref();
        let mut map = WitnessMap::new();
        map.insert("deviceKeyX", WitnessValue::scalar(self.device_key.x(), limbs)?)
            .insert("deviceKeyY", WitnessValue::scalar(self.device_key.y(), limbs)?)
            .insert("sig_r", WitnessValue::scalar(&self.signature.r, limbs)?)
            .insert(
                "sig_s_inverse",
                WitnessValue::scalar(&self.signature.s_inverse, limbs)?,
            )
            .insert(
                "messageHash",
                WitnessValue::scalar(&self.signature.digest, limbs)?,
            );
        Ok(map)
    }
}
