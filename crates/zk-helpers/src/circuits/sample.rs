// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Sample data generation for circuits.
//!
//! [`CredentialSample`] issues a signed SD-JWT bound to a fresh device key. The
//! issuer key is fixed so samples are checkable against a known public key; the
//! device key and disclosure salts are random per call. Not an issuance path.

use rand::{thread_rng, Rng};
use serde_json::json;

use crate::circuits::credential::CredentialCircuitInput;
use crate::circuits::presentation::PresentationCircuitInput;
use crate::claims::DecodeMode;
use crate::codec::{base64url_encode, Jwk};
use crate::ecdsa::EcdsaSigner;
use crate::errors::WitnessError;
use crate::sd_jwt::{Claim, Disclosure, SdJwt};

/// Secret scalar of the sample issuer, hex.
pub const SAMPLE_ISSUER_SECRET: &str =
    "c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721";
pub const SAMPLE_ISSUER_KID: &str = "key-1";

pub fn sample_issuer() -> Result<EcdsaSigner, WitnessError> {
    EcdsaSigner::from_hex(SAMPLE_ISSUER_SECRET)
}

/// `name = "Alice"` as a string and an ROC-calendar birth date as a decimal date.
pub fn default_claims() -> Vec<(Claim, DecodeMode)> {
    vec![
        (Claim::new("name", "Alice"), DecodeMode::Utf8String),
        (Claim::new("roc_birthday", "0750101"), DecodeMode::DecimalDate),
    ]
}

/// A signed credential, its issuer key and the device signer it binds.
#[derive(Debug, Clone)]
pub struct CredentialSample {
    pub token: SdJwt,
    pub issuer_key: Jwk,
    pub device: EcdsaSigner,
    pub decode_flags: Vec<DecodeMode>,
}

impl CredentialSample {
    /// Default claims, random device key.
    pub fn generate() -> Result<Self, WitnessError> {
        Self::with_claims(default_claims())
    }

    pub fn with_claims(claims: Vec<(Claim, DecodeMode)>) -> Result<Self, WitnessError> {
        Self::issue(EcdsaSigner::random(), claims)
    }

    /// Issue a credential whose `cnf.jwk` is the public key of `device`.
    pub fn issue(
        device: EcdsaSigner,
        claims: Vec<(Claim, DecodeMode)>,
    ) -> Result<Self, WitnessError> {
        let issuer = sample_issuer()?;
        let mut rng = thread_rng();

        let (claims, decode_flags): (Vec<Claim>, Vec<DecodeMode>) = claims.into_iter().unzip();
        let disclosures: Vec<Disclosure> = claims
            .into_iter()
            .map(|claim| Disclosure::new(base64url_encode(&rng.gen::<[u8; 16]>()), claim))
            .collect();
        let digests: Vec<String> = disclosures.iter().map(Disclosure::digest).collect();

        let header = json!({"alg": "ES256", "typ": "vc+sd-jwt", "kid": SAMPLE_ISSUER_KID});
        let payload = json!({
            "iss": "did:example:issuer",
            "cnf": {"jwk": device.public_jwk()?},
            "vc": {
                "type": ["VerifiableCredential"],
                "credentialSubject": {"_sd": digests, "_sd_alg": "sha-256"},
            },
        });

        let signing_input = format!(
            "{}.{}",
            base64url_encode(header.to_string().as_bytes()),
            base64url_encode(payload.to_string().as_bytes())
        );
        let signature = issuer.sign(signing_input.as_bytes());
        let token = SdJwt::from_parts(&format!("{signing_input}.{signature}"), disclosures)?;

        Ok(Self {
            token,
            issuer_key: issuer.public_jwk()?.with_kid(SAMPLE_ISSUER_KID),
            device,
            decode_flags,
        })
    }

    pub fn input(&self) -> CredentialCircuitInput {
        CredentialCircuitInput {
            token: self.token.clone(),
            issuer_key: self.issuer_key.clone(),
            decode_flags: self.decode_flags.clone(),
        }
    }

    /// Sign `nonce` with the bound device key.
    pub fn presentation_input(&self, nonce: &str) -> Result<PresentationCircuitInput, WitnessError> {
        Ok(PresentationCircuitInput {
            nonce: nonce.to_string(),
            device_signature: self.device.sign(nonce.as_bytes()),
            device_key: self.device.public_key()?,
        })
    }
}
