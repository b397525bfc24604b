// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Witness components of the credential circuit.
//!
//! [`SignedMessage`], [`SubstringMatches`] and [`CredentialWitness`] are produced
//! from [`CredentialCircuitParams`] and a parsed SD-JWT. The circuit itself checks
//! the issuer signature over `message`, locates each disclosure digest at
//! `matchIndex` inside the decoded payload, and outputs the `cnf` key.

use tracing::{debug, info};
use zkid_config::{CredentialCircuitParams, LimbLayout};

use crate::circuits::credential::circuit::CredentialCircuitInput;
use crate::claims::{
    sha256_pad, zero_extend, ClaimEncoder, DecodeMode, DisclosedClaim, PaddedClaimArray,
};
use crate::codec::{CurvePoint, DeviceKey};
use crate::computation::{Computation, ToWitnessMap};
use crate::ecdsa::{EcdsaWitnessBuilder, SignatureWitness};
use crate::errors::WitnessError;
use crate::sd_jwt::SdJwt;
use crate::field::FieldElement;
use crate::witness::{WitnessMap, WitnessValue};

/// The SHA-256 padded signing input and where the header ends inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    /// Padded `header.payload`, zero-extended to `max_message_length`.
    pub bytes: Vec<u8>,
    /// Length of the padded message before zero extension.
    pub length: usize,
    /// Index of the `.` separating header and payload.
    pub period_index: usize,
}

/// Where each disclosure digest occurs in the decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringMatches {
    pub count: usize,
    /// `max_matches` rows of `max_substring_length` bytes.
    pub substrings: Vec<Vec<u8>>,
    pub lengths: Vec<usize>,
    /// Byte offsets into the decoded payload JSON.
    pub indices: Vec<usize>,
}

/// Everything the credential circuit consumes, plus the key it is expected to attest.
#[derive(Debug, Clone)]
pub struct CredentialWitness {
    pub message: SignedMessage,
    pub signature: SignatureWitness,
    pub issuer_key: CurvePoint,
    pub matches: SubstringMatches,
    pub claims: PaddedClaimArray,
    /// One mode per claim row.
    pub decode_flags: Vec<DecodeMode>,
    /// Disclosed claims in row order, decoded with their flag.
    pub disclosed: Vec<DisclosedClaim>,
    /// The `cnf.jwk` key; the circuit must output exactly this.
    pub device_key: DeviceKey,
    pub limbs: Option<LimbLayout>,
}

impl Computation for SignedMessage {
    type Params = CredentialCircuitParams;
    type Input = SdJwt;
    type Error = WitnessError;

    fn compute(params: &Self::Params, token: &Self::Input) -> Result<Self, Self::Error> {
        WitnessError::ensure_capacity(
            "base64url payload",
            token.encoded_payload().len(),
            params.max_b64_payload_length,
        )?;

        let signing_input = token.signing_input();
        let (bytes, length) = sha256_pad(signing_input.as_bytes(), params.max_message_length)?;
        Ok(SignedMessage {
            bytes,
            length,
            period_index: token.encoded_header().len(),
        })
    }
}

impl Computation for SubstringMatches {
    type Params = CredentialCircuitParams;
    type Input = SdJwt;
    type Error = WitnessError;

    fn compute(params: &Self::Params, token: &Self::Input) -> Result<Self, Self::Error> {
        let disclosures = token.disclosures();
        WitnessError::ensure_capacity("disclosures", disclosures.len(), params.max_matches)?;

        let payload = token.payload_bytes()?;
        let mut substrings = vec![vec![0u8; params.max_substring_length]; params.max_matches];
        let mut lengths = vec![0usize; params.max_matches];
        let mut indices = vec![0usize; params.max_matches];

        for (i, disclosure) in disclosures.iter().enumerate() {
            let digest = disclosure.digest();
            let needle = digest.as_bytes();
            substrings[i] = zero_extend("disclosure digest", needle, params.max_substring_length)?;
            lengths[i] = needle.len();
            indices[i] = payload
                .windows(needle.len())
                .position(|window| window == needle)
                .ok_or_else(|| WitnessError::ClaimDigestNotFound(digest.clone()))?;
        }

        Ok(SubstringMatches {
            count: disclosures.len(),
            substrings,
            lengths,
            indices,
        })
    }
}

impl Computation for CredentialWitness {
    type Params = CredentialCircuitParams;
    type Input = CredentialCircuitInput;
    type Error = WitnessError;

    fn compute(params: &Self::Params, input: &Self::Input) -> Result<Self, Self::Error> {
        params.validate()?;
        let token = &input.token;
        let issuer_key = input.issuer_key.to_point()?;

        // capacity checks are cheap; run them all before any signature work
        let message = SignedMessage::compute(params, token)?;
        let matches = SubstringMatches::compute(params, token)?;
        WitnessError::ensure_capacity("decode flags", input.decode_flags.len(), params.max_matches)?;
        let disclosed = decode_disclosures(token, &input.decode_flags)?;

        let signature = EcdsaWitnessBuilder::new(params.max_message_length).build(
            token.signing_input().as_bytes(),
            &issuer_key,
            token.signature(),
        )?;

        let encoded: Vec<&str> = token.disclosures().iter().map(|d| d.encoded()).collect();
        let claims = ClaimEncoder::new(params.max_matches, params.max_claim_length).encode(&encoded)?;

        // every disclosure has a flag; only rows without one take the default
        let mut decode_flags = input.decode_flags.clone();
        decode_flags.resize(params.max_matches, DecodeMode::default());

        let device_key = token.confirmation_key()?;
        debug!("Credential binds device key {}", device_key.did_key());
        info!(
            "Built credential witness: {} byte message, {} disclosures",
            message.length, matches.count
        );

        Ok(CredentialWitness {
            message,
            signature,
            issuer_key,
            matches,
            claims,
            decode_flags,
            disclosed,
            device_key,
            limbs: params.limbs,
        })
    }
}

/// Decode each disclosure with its flag. A disclosure without a flag is an error.
fn decode_disclosures(
    token: &SdJwt,
    flags: &[DecodeMode],
) -> Result<Vec<DisclosedClaim>, WitnessError> {
    let disclosures = token.disclosures();
    if flags.len() < disclosures.len() {
        return Err(WitnessError::InputEncoding(format!(
            "{} disclosures but only {} decode flags",
            disclosures.len(),
            flags.len()
        )));
    }

    disclosures
        .iter()
        .zip(flags)
        .map(|(disclosure, mode)| {
            let claim = disclosure.claim();
            Ok(DisclosedClaim {
                name: claim.name.clone(),
                value: mode.decode(&claim.value)?,
            })
        })
        .collect()
}

impl CredentialWitness {
    /// The `messages` output the circuit must attest: one row of `max_claim_length`
    /// elements per claim row, all zero where no claim is disclosed.
    pub fn expected_messages(&self) -> Result<WitnessValue, WitnessError> {
        let width = self.claims.width();
        let rows = (0..self.decode_flags.len())
            .map(|i| match self.disclosed.get(i) {
                Some(claim) => claim.value.to_row(width),
                None => Ok(vec![FieldElement::zero(); width]),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WitnessValue::Array(
            rows.into_iter()
                .map(|row| WitnessValue::Array(row.into_iter().map(WitnessValue::Field).collect()))
                .collect(),
        ))
    }
}

impl ToWitnessMap for CredentialWitness {
    fn to_witness_map(&self) -> Result<WitnessMap, WitnessError> {
        let limbs = self.limbs.as_ref();
        let flags: Vec<usize> = self
            .decode_flags
            .iter()
            .map(|mode| usize::from(mode.ordinal()))
            .collect();

        let mut map = WitnessMap::new();
        map.insert("message", WitnessValue::bytes(&self.message.bytes))
            .insert("messageLength", WitnessValue::Field(self.message.length.into()))
            .insert("periodIndex", WitnessValue::Field(self.message.period_index.into()))
            .insert("sig_r", WitnessValue::scalar(&self.signature.r, limbs)?)
            .insert(
                "sig_s_inverse",
                WitnessValue::scalar(&self.signature.s_inverse, limbs)?,
            )
            .insert("pubKeyX", WitnessValue::scalar(self.issuer_key.x(), limbs)?)
            .insert("pubKeyY", WitnessValue::scalar(self.issuer_key.y(), limbs)?)
            .insert("matchesCount", WitnessValue::Field(self.matches.count.into()))
            .insert("matchSubstring", WitnessValue::rows(&self.matches.substrings))
            .insert("matchLength", WitnessValue::usizes(&self.matches.lengths))
            .insert("matchIndex", WitnessValue::usizes(&self.matches.indices))
            .insert("claims", WitnessValue::rows(self.claims.rows()))
            .insert("claimLengths", WitnessValue::usizes(self.claims.lengths()))
            .insert("decodeFlags", WitnessValue::usizes(&flags));
        Ok(map)
    }
}
