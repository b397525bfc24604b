// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use path_clean::clean;

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Walk from `start` towards the filesystem root looking for `filename`.
pub fn find_in_parent(start: &Path, filename: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.exists())
}

/// Pick the configuration file to load.
///
/// An explicit file wins (resolved against `cwd` when relative), then the nearest
/// `filename` above `cwd`. Returns `None` when neither exists so callers can fall
/// back to built-in defaults.
pub fn resolve_config_path(
    find_in_parent: FindInParent,
    cwd: &Path,
    filename: &str,
    explicit: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(explicit) = explicit {
        if explicit.is_absolute() {
            return Some(explicit.to_path_buf());
        }
        return Some(clean(cwd.join(explicit)));
    }

    find_in_parent(cwd, filename).or_else(|| {
        let fallback = default_config_dir()?.join(filename);
        fallback.exists().then_some(fallback)
    })
}

/// Per-user configuration directory, e.g. `~/.config/zkid`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zkid"))
}

/// Read a YAML file, expanding `${VAR}` references from the environment.
pub fn load_yaml_with_env(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)?;
    let expanded = shellexpand::env(&raw)
        .with_context(|| format!("Could not expand environment in {}", path.display()))?;
    Ok(expanded.into_owned())
}
