//! Configuration loading and parsing for `lambda-release.toml` files.
//!
//! Every component receives the resolved [`DeployConfig`] explicitly instead
//! of reading process-wide state such as the current directory.
use log::*;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{DeployError, Result, cli::Args};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "lambda-release.toml";

pub const DEFAULT_TAG_PREFIX: &str = "BE";
pub const DEFAULT_SCHEMA_PATH: &str = "sql";
pub const DEFAULT_ARTIFACT: &str = "lambda.zip";
pub const DEFAULT_REGION: &str = "eu-central-1";
pub const DEFAULT_LOCALE: &str = "en_US.UTF-8";
pub const DEFAULT_INSTALL_COMMAND: &str = "npm ci --production";

/// Contents of `lambda-release.toml`. All keys are optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Service prefix of release tags (default: "BE")
    pub tag_prefix: String,
    /// Path whose changes between releases require confirmation
    /// (default: "sql")
    pub schema_path: String,
    /// Archive file created in the working directory (default: "lambda.zip")
    pub artifact: String,
    /// Region used when none is given on the command line
    pub region: String,
    /// Locale forced on child processes so their output parses the same
    /// everywhere (default: "en_US.UTF-8")
    pub locale: String,
    /// Installs production dependencies before archiving
    pub install_command: String,
    /// Skips the branch check, tag creation and tag verification
    pub skip_tagging: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            tag_prefix: DEFAULT_TAG_PREFIX.into(),
            schema_path: DEFAULT_SCHEMA_PATH.into(),
            artifact: DEFAULT_ARTIFACT.into(),
            region: DEFAULT_REGION.into(),
            locale: DEFAULT_LOCALE.into(),
            install_command: DEFAULT_INSTALL_COMMAND.into(),
            skip_tagging: false,
        }
    }
}

impl FileConfig {
    /// Reads the config file at `path`, falling back to defaults when it
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        info!("loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        let config: FileConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("tag_prefix", &self.tag_prefix),
            ("schema_path", &self.schema_path),
            ("artifact", &self.artifact),
            ("region", &self.region),
            ("install_command", &self.install_command),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(DeployError::invalid_config(format!(
                    "{key} must not be empty"
                )));
            }
        }

        if Path::new(&self.artifact).components().count() != 1 {
            return Err(DeployError::invalid_config(
                "artifact must be a plain file name",
            ));
        }

        Ok(())
    }
}

/// Fully resolved settings for one run: file config merged with CLI
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Repository root, also the directory that gets archived.
    pub workdir: PathBuf,
    pub tag_prefix: String,
    pub schema_path: String,
    pub artifact: String,
    pub locale: String,
    pub install_command: String,
    pub skip_tagging: bool,
}

impl DeployConfig {
    pub fn new(workdir: PathBuf, file: FileConfig) -> Self {
        Self {
            workdir,
            tag_prefix: file.tag_prefix,
            schema_path: file.schema_path,
            artifact: file.artifact,
            locale: file.locale,
            install_command: file.install_command,
            skip_tagging: file.skip_tagging,
        }
    }

    /// Absolute location of the deployment archive.
    pub fn artifact_path(&self) -> PathBuf {
        self.workdir.join(&self.artifact)
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("."), FileConfig::default())
    }
}

/// Resolves the working directory, loads the config file and applies CLI
/// overrides. Returns the config together with the region to deploy to.
pub fn resolve(args: &Args) -> Result<(DeployConfig, String)> {
    let workdir = args.workdir.canonicalize().map_err(|e| {
        DeployError::InvalidArgs(format!(
            "working directory {} is not accessible: {e}",
            args.workdir.display()
        ))
    })?;

    // relative paths are read from the working directory, not the cwd
    let config_path = match &args.config {
        Some(path) => workdir.join(path),
        None => workdir.join(DEFAULT_CONFIG_FILE),
    };

    let file = FileConfig::load(&config_path)?;
    let region = args.region.clone().unwrap_or_else(|| file.region.clone());

    let mut config = DeployConfig::new(workdir, file);
    config.skip_tagging |= args.skip_tagging;

    Ok((config, region))
}
