// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::PathBuf;

use zkid_zk_helpers::{Jwk, SdJwt};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn load_token(name: &str) -> SdJwt {
    let text = std::fs::read_to_string(fixtures_dir().join(name)).unwrap();
    SdJwt::parse(&text).unwrap()
}

/// Issuer key published for the over-18 driving licence.
pub fn issuer_jwk() -> Jwk {
    serde_json::from_value(serde_json::json!({
        "kty": "EC",
        "crv": "P-256",
        "kid": "key-1",
        "x": "dnQ2W9ZTsILYac3XdcvxrYNgIgjSkGJUMecMXVJk7XM",
        "y": "0WhT_VgvnhNNj9aabTn4E4enR-iqbCrQtY9UWqD4XJY",
    }))
    .unwrap()
}

/// Key the under-18 licence was published with; its signature does not verify under it.
pub fn stale_issuer_jwk() -> Jwk {
    serde_json::from_value(serde_json::json!({
        "kty": "EC",
        "crv": "P-256",
        "kid": "key-1",
        "x": "h29tWfkCJ73nJbP51C4SotdI0CuttfQS3Svt0se6gFU",
        "y": "mBavlbiJLFhGsuIJRz7wYLiW15gpiWEDLjE1gfVh_7k",
    }))
    .unwrap()
}

/// Device key in the `cnf` claim of both licences.
pub const DEVICE_KEY_X: &str = "49rkqLPobREgcp6RHzJ52l5gcAzfHoreeWmkLM7aC2w";
pub const DEVICE_KEY_Y: &str = "T6HPy9fg7QNWdoMkvPUNj0KxX-QR3y-x5GJnkgshsfs";
