// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::circuit_params::{CredentialCircuitParams, PresentationCircuitParams};
use crate::load_config::{find_in_parent, load_yaml_with_env, resolve_config_path};

pub const DEFAULT_CONFIG_NAME: &str = "zkid.config.yaml";
pub const ENV_PREFIX: &str = "ZKID_";

/// Configuration shared by the witness assemblers and the protocol session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WitnessConfig {
    pub credential: CredentialCircuitParams,
    pub presentation: PresentationCircuitParams,
    /// Upper bound on a single constraint verifier call. `None` waits indefinitely.
    pub verifier_timeout_ms: Option<u64>,
    /// Where exported witness artifacts are written.
    pub artifacts_dir: Option<PathBuf>,
    /// The file this configuration was read from, if any.
    #[serde(skip_serializing)]
    pub config_file: Option<PathBuf>,
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            credential: CredentialCircuitParams::default(),
            presentation: PresentationCircuitParams::default(),
            verifier_timeout_ms: Some(30_000),
            artifacts_dir: None,
            config_file: None,
        }
    }
}

impl WitnessConfig {
    pub fn verifier_timeout(&self) -> Option<Duration> {
        self.verifier_timeout_ms.map(Duration::from_millis)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("artifacts"))
    }

    pub fn validate(&self) -> Result<()> {
        self.credential
            .validate()
            .context("Invalid credential circuit parameters")?;
        self.presentation
            .validate()
            .context("Invalid presentation circuit parameters")?;
        Ok(())
    }
}

/// Load configuration: defaults, then the YAML file (explicit or discovered), then
/// `ZKID_` environment variables (`__` separates nested keys).
pub fn load_config(config_file: Option<&Path>) -> Result<WitnessConfig> {
    let cwd = env::current_dir()?;
    let resolved = resolve_config_path(find_in_parent, &cwd, DEFAULT_CONFIG_NAME, config_file);

    let mut figment = Figment::from(Serialized::defaults(WitnessConfig::default()));
    if let Some(path) = &resolved {
        debug!("Loading witness configuration from {}", path.display());
        let yaml = load_yaml_with_env(path).context("Configuration file not found")?;
        figment = figment.merge(Yaml::string(&yaml));
    }

    let mut config: WitnessConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("Could not parse configuration")?;
    config.config_file = resolved;
    config.validate()?;
    Ok(config)
}
