// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Compact SD-JWT parsing: `header.payload.signature~disclosure~...~`.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::codec::{base64url_decode, base64url_encode, DeviceKey, Jwk};
use crate::errors::WitnessError;

/// A claim name and value as issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub name: String,
    pub value: Value,
}

impl Claim {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A disclosure: base64url of the JSON array `[salt, name, value]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Disclosure {
    encoded: String,
    salt: String,
    claim: Claim,
}

impl Disclosure {
    pub fn new(salt: impl Into<String>, claim: Claim) -> Self {
        let salt = salt.into();
        let array = json!([salt, claim.name, claim.value]);
        Self {
            encoded: base64url_encode(array.to_string().as_bytes()),
            salt,
            claim,
        }
    }

    pub fn parse(encoded: &str) -> Result<Self, WitnessError> {
        let bytes = base64url_decode(encoded)?;
        let array: Vec<Value> = serde_json::from_slice(&bytes)
            .map_err(|e| WitnessError::InputEncoding(format!("disclosure is not a JSON array: {e}")))?;
        let [Value::String(salt), Value::String(name), value] = <[Value; 3]>::try_from(array)
            .map_err(|a| {
                WitnessError::InputEncoding(format!(
                    "disclosure must have 3 elements, got {}",
                    a.len()
                ))
            })?
        else {
            return Err(WitnessError::InputEncoding(
                "disclosure salt and claim name must be strings".to_string(),
            ));
        };

        Ok(Self {
            encoded: encoded.to_string(),
            salt,
            claim: Claim { name, value },
        })
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn claim(&self) -> &Claim {
        &self.claim
    }

    /// `base64url(SHA-256(encoded))`, the value listed in the payload's `_sd` array.
    pub fn digest(&self) -> String {
        base64url_encode(&Sha256::digest(self.encoded.as_bytes()))
    }
}

/// A parsed compact SD-JWT.
#[derive(Debug, Clone)]
pub struct SdJwt {
    header: String,
    payload: String,
    signature: String,
    disclosures: Vec<Disclosure>,
}

impl SdJwt {
    /// Surrounding whitespace and empty `~` segments are ignored.
    pub fn parse(token: &str) -> Result<Self, WitnessError> {
        let mut segments = token.trim().split('~');
        let jwt = segments.next().unwrap_or_default();

        let parts: Vec<&str> = jwt.split('.').collect();
        let [header, payload, signature] = parts.as_slice() else {
            return Err(WitnessError::InputEncoding(format!(
                "JWT must have 3 segments, got {}",
                parts.len()
            )));
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(WitnessError::InputEncoding("JWT segment is empty".to_string()));
        }

        let disclosures = segments
            .filter(|segment| !segment.is_empty())
            .map(Disclosure::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            header: header.to_string(),
            payload: payload.to_string(),
            signature: signature.to_string(),
            disclosures,
        })
    }

    /// Assemble a token from an already signed JWT and its disclosures.
    pub fn from_parts(jwt: &str, disclosures: Vec<Disclosure>) -> Result<Self, WitnessError> {
        let mut token = Self::parse(jwt)?;
        token.disclosures = disclosures;
        Ok(token)
    }

    /// `header.payload`, the bytes covered by the issuer signature.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }

    pub fn encoded_header(&self) -> &str {
        &self.header
    }

    pub fn encoded_payload(&self) -> &str {
        &self.payload
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn disclosures(&self) -> &[Disclosure] {
        &self.disclosures
    }

    pub fn header(&self) -> Result<Value, WitnessError> {
        decode_json_segment("header", &self.header)
    }

    pub fn payload_bytes(&self) -> Result<Vec<u8>, WitnessError> {
        base64url_decode(&self.payload)
    }

    pub fn payload(&self) -> Result<Value, WitnessError> {
        decode_json_segment("payload", &self.payload)
    }

    /// The device key from the `cnf.jwk` confirmation claim.
    pub fn confirmation_key(&self) -> Result<DeviceKey, WitnessError> {
        let payload = self.payload()?;
        let jwk = payload
            .get("cnf")
            .and_then(|cnf| cnf.get("jwk"))
            .ok_or_else(|| WitnessError::InvalidKey("payload has no cnf.jwk claim".to_string()))?;
        let jwk: Jwk = serde_json::from_value(jwk.clone())
            .map_err(|e| WitnessError::InvalidKey(format!("cnf.jwk is not an EC JWK: {e}")))?;
        jwk.to_point()
    }

    /// Compact serialization, with a trailing `~` after the last disclosure.
    pub fn serialize(&self) -> String {
        let mut out = format!("{}.{}.{}~", self.header, self.payload, self.signature);
        for disclosure in &self.disclosures {
            out.push_str(disclosure.encoded());
            out.push('~');
        }
        out
    }
}

fn decode_json_segment(name: &str, segment: &str) -> Result<Value, WitnessError> {
    let bytes = base64url_decode(segment)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| WitnessError::InputEncoding(format!("JWT {name} is not JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ["p2oNtKAnhRxjqNMBi4Dimw","name","MyName"]
    const DISCLOSURE: &str = "WyJwMm9OdEtBbmhSeGpxTk1CaTREaW13IiwibmFtZSIsIk15TmFtZSJd";

    fn jwt(payload: &Value) -> String {
        let header = base64url_encode(br#"{"alg":"ES256","typ":"vc+sd-jwt"}"#);
        let payload = base64url_encode(payload.to_string().as_bytes());
        format!("{header}.{payload}.c2ln")
    }

    #[test]
    fn parses_disclosure() {
        let disclosure = Disclosure::parse(DISCLOSURE).unwrap();
        assert_eq!(disclosure.salt(), "p2oNtKAnhRxjqNMBi4Dimw");
        assert_eq!(disclosure.claim(), &Claim::new("name", "MyName"));
        assert_eq!(
            disclosure.digest(),
            "4-8dnDF_EcDsyiY2lYhdsyzcN0eAmSlixU5wvhuO1o4"
        );
    }

    #[test]
    fn new_disclosure_round_trips() {
        let disclosure = Disclosure::new("salt", Claim::new("age", 30));
        let parsed = Disclosure::parse(disclosure.encoded()).unwrap();
        assert_eq!(parsed, disclosure);
    }

    #[test]
    fn rejects_malformed_disclosures() {
        let two = base64url_encode(br#"["salt","name"]"#);
        let numeric_name = base64url_encode(br#"["salt",1,"v"]"#);
        for bad in [two.as_str(), numeric_name.as_str(), "%%%"] {
            assert!(matches!(
                Disclosure::parse(bad),
                Err(WitnessError::InputEncoding(_))
            ));
        }
    }

    #[test]
    fn splits_token_and_disclosures() {
        let token = format!("{}~{DISCLOSURE}~ ", jwt(&json!({"sub": "x"})));
        let parsed = SdJwt::parse(&token).unwrap();

        assert_eq!(parsed.disclosures().len(), 1);
        assert_eq!(parsed.signature(), "c2ln");
        assert_eq!(parsed.header().unwrap()["alg"], "ES256");
        assert_eq!(parsed.payload().unwrap()["sub"], "x");
        assert_eq!(
            parsed.signing_input(),
            format!("{}.{}", parsed.encoded_header(), parsed.encoded_payload())
        );
        assert_eq!(parsed.serialize(), token.trim());
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(matches!(
            SdJwt::parse("a.b~"),
            Err(WitnessError::InputEncoding(_))
        ));
        assert!(matches!(
            SdJwt::parse("a.b.c.d"),
            Err(WitnessError::InputEncoding(_))
        ));
    }

    #[test]
    fn reads_confirmation_key() {
        let payload = json!({
            "cnf": {"jwk": {
                "kty": "EC",
                "crv": "P-256",
                "x": "49rkqLPobREgcp6RHzJ52l5gcAzfHoreeWmkLM7aC2w",
                "y": "T6HPy9fg7QNWdoMkvPUNj0KxX-QR3y-x5GJnkgshsfs"
            }}
        });
        let parsed = SdJwt::parse(&jwt(&payload)).unwrap();
        let key = parsed.confirmation_key().unwrap();
        assert_eq!(key.to_jwk().x, "49rkqLPobREgcp6RHzJ52l5gcAzfHoreeWmkLM7aC2w");

        let missing = SdJwt::parse(&jwt(&json!({"sub": "x"}))).unwrap();
        assert!(matches!(
            missing.confirmation_key(),
            Err(WitnessError::InvalidKey(_))
        ));
    }
}
