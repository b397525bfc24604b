// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::Path;

use tracing::info;

use crate::errors::ArtifactError;
use crate::witness::WitnessMap;

/// Prover.toml contents.
pub type Toml = String;
/// inputs.json contents.
pub type Json = String;

#[derive(Debug, Clone)]
pub struct Artifacts {
    pub toml: Toml,
    pub json: Json,
}

impl Artifacts {
    pub fn from_witness(witness: &WitnessMap) -> Result<Self, ArtifactError> {
        Ok(Self {
            toml: toml::to_string(witness)?,
            json: serde_json::to_string_pretty(witness)?,
        })
    }
}

pub trait CircuitCodegen: crate::registry::Circuit {
    type Params;
    type Input;
    type Error;

    /// Generate artifacts for a circuit.
    fn codegen(&self, params: &Self::Params, input: &Self::Input)
        -> Result<Artifacts, Self::Error>;
}

pub fn write_toml(toml: &Toml, path: Option<&Path>) -> Result<(), ArtifactError> {
    let dir = path.unwrap_or_else(|| Path::new("."));
    Ok(std::fs::write(dir.join("Prover.toml"), toml)?)
}

pub fn write_json(json: &Json, path: Option<&Path>) -> Result<(), ArtifactError> {
    let dir = path.unwrap_or_else(|| Path::new("."));
    Ok(std::fs::write(dir.join("inputs.json"), json)?)
}

/// Write `Prover.toml` and `inputs.json` into `path` (default: current directory),
/// creating it if needed.
pub fn write_artifacts(artifacts: &Artifacts, path: Option<&Path>) -> Result<(), ArtifactError> {
    if let Some(dir) = path {
        std::fs::create_dir_all(dir)?;
    }
    write_toml(&artifacts.toml, path)?;
    write_json(&artifacts.json, path)?;
    info!(
        "Wrote witness artifacts to {}",
        path.unwrap_or_else(|| Path::new(".")).display()
    );
    Ok(())
}
