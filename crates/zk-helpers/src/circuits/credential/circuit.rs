// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Credential circuit type and implementations of [`Circuit`], [`CircuitCodegen`], [`CircuitComputation`].

use zkid_config::CredentialCircuitParams;

use crate::circuits::credential::computation::CredentialWitness;
use crate::claims::DecodeMode;
use crate::codec::Jwk;
use crate::codegen::{Artifacts, CircuitCodegen};
use crate::computation::{CircuitComputation, Computation, ToWitnessMap};
use crate::errors::{ArtifactError, WitnessError};
use crate::registry::Circuit;
use crate::sd_jwt::SdJwt;

/// Register-phase circuit (name: `credential`).
/// Verifies the issuer signature and selective disclosures, and outputs the bound device key
/// and the decoded claim values.
#[derive(Debug)]
pub struct CredentialCircuit;

/// Input for [`CredentialCircuit`]: the issued token, the issuer key and one decode mode per disclosure.
#[derive(Debug, Clone)]
pub struct CredentialCircuitInput {
    pub token: SdJwt,
    pub issuer_key: Jwk,
    pub decode_flags: Vec<DecodeMode>,
}

impl Circuit for CredentialCircuit {
    const NAME: &'static str = "credential";
    const PREFIX: &'static str = "CREDENTIAL";
    const INPUTS: &'static [&'static str] = &[
        "message",
        "messageLength",
        "periodIndex",
        "sig_r",
        "sig_s_inverse",
        "pubKeyX",
        "pubKeyY",
        "matchesCount",
        "matchSubstring",
        "matchLength",
        "matchIndex",
        "claims",
        "claimLengths",
        "decodeFlags",
    ];
    const OUTPUTS: &'static [&'static str] = &["KeyBindingX", "KeyBindingY", "messages"];
}

impl CircuitComputation for CredentialCircuit {
    type Params = CredentialCircuitParams;
    type Input = CredentialCircuitInput;
    type Output = CredentialWitness;
    type Error = WitnessError;

    fn compute(
        &self,
        params: &Self::Params,
        input: &Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        CredentialWitness::compute(params, input)
    }
}

impl CircuitCodegen for CredentialCircuit {
    type Params = CredentialCircuitParams;
    type Input = CredentialCircuitInput;
    type Error = ArtifactError;

    fn codegen(&self, params: &Self::Params, input: &Self::Input) -> Result<Artifacts, Self::Error> {
        let witness = CircuitComputation::compute(self, params, input)?;
        Artifacts::from_witness(&witness.to_witness_map()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{sha256_unpad, ClaimValue};
    use crate::codec::base64url_decode;
    use crate::ecdsa::{verify_relation, EcdsaSigner, SignatureCheck};
    use crate::sample::{CredentialSample, SAMPLE_ISSUER_SECRET};
    use tempfile::TempDir;
    use zkid_config::LimbLayout;

    fn params() -> CredentialCircuitParams {
        CredentialCircuitParams::default()
    }

    #[test]
    fn witness_contains_every_declared_input() {
        let sample = CredentialSample::generate().unwrap();
        let witness = CredentialCircuit.compute(&params(), &sample.input()).unwrap();
        let map = witness.to_witness_map().unwrap();

        let mut names: Vec<&str> = map.names().collect();
        let mut expected = CredentialCircuit::INPUTS.to_vec();
        names.sort();
        expected.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn message_and_period_index_locate_the_payload() {
        let sample = CredentialSample::generate().unwrap();
        let witness = CredentialCircuit.compute(&params(), &sample.input()).unwrap();

        assert_eq!(witness.message.bytes.len(), params().max_message_length);
        assert_eq!(witness.message.length % 64, 0);

        let signing_input = sha256_unpad(&witness.message.bytes[..witness.message.length]).unwrap();
        assert_eq!(signing_input, sample.token.signing_input().as_bytes());
        assert_eq!(signing_input[witness.message.period_index], b'.');
    }

    #[test]
    fn signature_witness_verifies_against_issuer_key() {
        let sample = CredentialSample::generate().unwrap();
        let witness = CredentialCircuit.compute(&params(), &sample.input()).unwrap();

        let issuer = EcdsaSigner::from_hex(SAMPLE_ISSUER_SECRET).unwrap();
        assert_eq!(witness.issuer_key, issuer.public_key().unwrap());
        assert_eq!(
            verify_relation(
                &witness.signature.digest,
                &witness.signature.r,
                &witness.signature.s_inverse,
                &witness.issuer_key,
            ),
            SignatureCheck::Valid
        );
    }

    #[test]
    fn match_index_points_at_each_disclosure_digest() {
        let sample = CredentialSample::generate().unwrap();
        let witness = CredentialCircuit.compute(&params(), &sample.input()).unwrap();
        let payload = base64url_decode(sample.token.encoded_payload()).unwrap();

        let matches = &witness.matches;
        assert_eq!(matches.count, 2);
        for (i, disclosure) in sample.token.disclosures().iter().enumerate() {
            let digest = disclosure.digest();
            let start = matches.indices[i];
            assert_eq!(&payload[start..start + matches.lengths[i]], digest.as_bytes());
            assert_eq!(&matches.substrings[i][..matches.lengths[i]], digest.as_bytes());
        }
        assert_eq!(matches.lengths[2..], [0, 0]);
        assert!(matches.substrings[3].iter().all(|&b| b == 0));
    }

    #[test]
    fn claims_rows_hold_disclosure_text_and_flags_are_padded() {
        let sample = CredentialSample::generate().unwrap();
        let witness = CredentialCircuit.compute(&params(), &sample.input()).unwrap();

        let first = sample.token.disclosures()[0].encoded();
        assert_eq!(witness.claims.lengths()[0], first.len());
        assert_eq!(&witness.claims.rows()[0][..first.len()], first.as_bytes());
        assert_eq!(witness.claims.used(), 2);
        assert_eq!(
            witness.decode_flags,
            vec![
                DecodeMode::Utf8String,
                DecodeMode::DecimalDate,
                DecodeMode::Utf8String,
                DecodeMode::Utf8String
            ]
        );
    }

    #[test]
    fn every_disclosure_needs_a_decode_flag() {
        let sample = CredentialSample::generate().unwrap();

        for flags in [vec![], vec![DecodeMode::Utf8String]] {
            let input = CredentialCircuitInput {
                decode_flags: flags,
                ..sample.input()
            };
            let err = CredentialCircuit.compute(&params(), &input).unwrap_err();
            assert!(matches!(err, WitnessError::InputEncoding(_)), "{err}");
        }
    }

    #[test]
    fn date_flag_on_a_name_is_rejected() {
        let sample = CredentialSample::generate().unwrap();
        let input = CredentialCircuitInput {
            decode_flags: vec![DecodeMode::DecimalDate, DecodeMode::DecimalDate],
            ..sample.input()
        };

        let err = CredentialCircuit.compute(&params(), &input).unwrap_err();
        assert!(matches!(err, WitnessError::InputEncoding(_)));
    }

    #[test]
    fn disclosed_claims_are_decoded_with_their_flag() {
        let sample = CredentialSample::generate().unwrap();
        let witness = CredentialCircuit.compute(&params(), &sample.input()).unwrap();

        let values: Vec<(&str, &ClaimValue)> = witness
            .disclosed
            .iter()
            .map(|claim| (claim.name.as_str(), &claim.value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("name", &ClaimValue::Text("Alice".to_string())),
                ("roc_birthday", &ClaimValue::Number(750101)),
            ]
        );

        let messages = witness.expected_messages().unwrap();
        let rows = messages.as_array().unwrap();
        assert_eq!(rows.len(), params().max_matches);
        assert!(rows
            .iter()
            .all(|row| row.as_array().unwrap().len() == params().max_claim_length));
        assert_eq!(
            rows[0].as_array().unwrap()[0].as_field(),
            Some(&crate::field::FieldElement::from(b'A'))
        );
        assert_eq!(
            rows[1].as_array().unwrap()[0].as_field(),
            Some(&crate::field::FieldElement::from(750101u64))
        );
        assert!(rows[3]
            .as_array()
            .unwrap()
            .iter()
            .all(|v| v.as_field().unwrap().to_u64() == Some(0)));
    }

    #[test]
    fn invalid_params_are_rejected_before_use() {
        let sample = CredentialSample::generate().unwrap();
        let broken = CredentialCircuitParams {
            limbs: Some(LimbLayout {
                bits: 64,
                count: usize::MAX,
            }),
            ..params()
        };

        let err = CredentialCircuit.compute(&broken, &sample.input()).unwrap_err();
        assert!(matches!(err, WitnessError::InvalidParams(_)));

        let unaligned = CredentialCircuitParams {
            max_claim_length: 100,
            ..params()
        };
        assert!(matches!(
            CredentialCircuit.compute(&unaligned, &sample.input()),
            Err(WitnessError::InvalidParams(_))
        ));
    }

    #[test]
    fn device_key_comes_from_confirmation_claim() {
        let sample = CredentialSample::generate().unwrap();
        let witness = CredentialCircuit.compute(&params(), &sample.input()).unwrap();
        assert_eq!(witness.device_key, sample.device.public_key().unwrap());
    }

    #[test]
    fn foreign_issuer_key_is_rejected() {
        let sample = CredentialSample::generate().unwrap();
        let mut input = sample.input();
        input.issuer_key = EcdsaSigner::random().public_jwk().unwrap();

        let err = CredentialCircuit.compute(&params(), &input).unwrap_err();
        assert!(matches!(err, WitnessError::SignatureInvalid(_)));
    }

    #[test]
    fn too_many_disclosures_is_capacity_error() {
        let sample = CredentialSample::generate().unwrap();
        let small = CredentialCircuitParams {
            max_matches: 1,
            ..params()
        };

        let err = CredentialCircuit.compute(&small, &sample.input()).unwrap_err();
        assert_eq!(
            err,
            WitnessError::CapacityExceeded {
                what: "disclosures",
                len: 2,
                max: 1
            }
        );
    }

    #[test]
    fn oversized_payload_is_rejected_before_signature_check() {
        let sample = CredentialSample::generate().unwrap();
        let mut input = sample.input();
        // a wrong key would fail the gate; capacity must be reported first
        input.issuer_key = EcdsaSigner::random().public_jwk().unwrap();
        let small = CredentialCircuitParams {
            max_b64_payload_length: 64,
            ..params()
        };

        let err = CredentialCircuit.compute(&small, &input).unwrap_err();
        assert!(matches!(
            err,
            WitnessError::CapacityExceeded {
                what: "base64url payload",
                ..
            }
        ));
    }

    #[test]
    fn unknown_disclosure_digest_is_reported() {
        let sample = CredentialSample::generate().unwrap();
        let stray = crate::sd_jwt::Disclosure::new("salt", crate::sd_jwt::Claim::new("x", "y"));
        let mut disclosures = sample.token.disclosures().to_vec();
        disclosures.push(stray.clone());
        let token = SdJwt::from_parts(&sample.token.serialize(), disclosures).unwrap();

        let input = CredentialCircuitInput {
            token,
            ..sample.input()
        };
        let err = CredentialCircuit.compute(&params(), &input).unwrap_err();
        assert_eq!(err, WitnessError::ClaimDigestNotFound(stray.digest()));
    }

    #[test]
    fn limb_layout_splits_scalars() {
        let sample = CredentialSample::generate().unwrap();
        let limbed = CredentialCircuitParams {
            limbs: Some(LimbLayout {
                bits: 120,
                count: 3,
            }),
            ..params()
        };
        let map = CredentialCircuit
            .compute(&limbed, &sample.input())
            .unwrap()
            .to_witness_map()
            .unwrap();

        for name in ["sig_r", "sig_s_inverse", "pubKeyX", "pubKeyY"] {
            assert_eq!(map.array(name).unwrap().len(), 3, "{name}");
        }
        assert!(map.field("messageLength").is_some());
    }

    #[test]
    fn codegen_writes_prover_toml_and_inputs_json() {
        let sample = CredentialSample::generate().unwrap();
        let artifacts = CredentialCircuit.codegen(&params(), &sample.input()).unwrap();

        assert!(artifacts.toml.contains("periodIndex"));
        let json: serde_json::Value = serde_json::from_str(&artifacts.json).unwrap();
        assert_eq!(json["matchesCount"], "2");

        let dir = TempDir::new().unwrap();
        crate::codegen::write_artifacts(&artifacts, Some(dir.path())).unwrap();
        assert!(dir.path().join("Prover.toml").exists());
        assert!(dir.path().join("inputs.json").exists());
    }
}
