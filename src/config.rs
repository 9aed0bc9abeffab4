use crate::domain::BuildMode;
use crate::error::{DevflowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the devflow configuration
pub const CONFIG_FILE_NAME: &str = "devflow.toml";

/// Represents the complete configuration for devflow.
///
/// Contains the packages whose version files are generated and the build
/// settings that override branch defaults.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub packages: BTreeMap<String, PackageConfig>,

    #[serde(default)]
    pub build: BuildConfig,
}

/// A single path or a list of paths
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PathList {
    One(String),
    Many(Vec<String>),
}

impl PathList {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            PathList::One(path) => vec![path.clone()],
            PathList::Many(paths) => paths.clone(),
        }
    }
}

/// Version file settings of one package
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PackageConfig {
    #[serde(default)]
    pub version_file: Option<PathList>,

    #[serde(default)]
    pub version_template: Option<PathList>,
}

impl PackageConfig {
    /// Pairs each version file with its template, if templates are configured.
    ///
    /// # Returns
    /// * `Ok(pairs)` - One entry per version file, empty if none configured
    /// * `Err` - If both lists are given and their lengths differ
    pub fn version_files(&self, package: &str) -> Result<Vec<(String, Option<String>)>> {
        let files = self
            .version_file
            .as_ref()
            .map(PathList::to_vec)
            .unwrap_or_default();

        let Some(templates) = self.version_template.as_ref().map(PathList::to_vec) else {
            return Ok(files.into_iter().map(|f| (f, None)).collect());
        };

        if templates.len() != files.len() {
            return Err(DevflowError::config(format!(
                "Package '{}' has {} version files and {} version templates. \
                 The number of version files and templates must match.",
                package,
                files.len(),
                templates.len()
            )));
        }

        Ok(files.into_iter().zip(templates.into_iter().map(Some)).collect())
    }
}

/// Build settings.
///
/// Both values are optional; unset values are derived from the branch and
/// the host system.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BuildConfig {
    #[serde(default)]
    pub mode: Option<BuildMode>,

    #[serde(default)]
    pub codename: Option<String>,
}

/// Locate the configuration file.
///
/// Tries in order:
/// 1. Custom path provided as parameter
/// 2. `devflow.toml` in the repository top-level directory
/// 3. `devflow.toml` in the user config directory
pub fn find_config(config_path: Option<&Path>, toplevel: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    if let Some(candidate) = toplevel.map(|dir| dir.join(CONFIG_FILE_NAME)) {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|candidate| candidate.exists())
}

/// Loads configuration from file or returns defaults.
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file was found (or given) but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, toplevel: Option<&Path>) -> Result<Config> {
    match find_config(config_path, toplevel) {
        Some(path) => load_config_file(&path),
        None => Ok(Config::default()),
    }
}

/// Load and parse one configuration file
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        DevflowError::config(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    toml::from_str(&content)
        .map_err(|e| DevflowError::config(format!("Cannot parse '{}': {}", path.display(), e)))
}
