//! CLI argument parsing.
use clap::Parser;
use std::path::PathBuf;

/// Tag the repository and ship its code to a cloud function.
///
/// Confirms intent, requires a clean working tree, creates and verifies a
/// release tag, asks for confirmation when the schema changed since the
/// previous release and finally packages and uploads the code.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Region of the target function. Defaults to the configured region
    /// (eu-central-1).
    pub region: Option<String>,

    /// Name of the function whose code is replaced.
    pub function_name: Option<String>,

    #[arg(long, default_value_t = false)]
    /// Deploy into the production environment.
    pub production: bool,

    #[arg(long, default_value_t = false)]
    /// Skip the branch check, tag creation and tag verification.
    pub skip_tagging: bool,

    #[arg(long)]
    /// Path to the config file, relative to the working directory.
    /// Defaults to lambda-release.toml.
    pub config: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    /// Repository root to release and package.
    pub workdir: PathBuf,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}
