use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::toolchain::{
    CompilerConfig, FileExtension, RuntimeConfig, WorkspaceConfig, timeout_from_secs,
};

mod loader;
pub mod toolchain;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../jrunner.example.toml");

/// Prefix for environment variable overrides (e.g. `JRUNNER_COMPILER__TIMEOUT`)
pub const ENV_PREFIX: &str = "JRUNNER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid characters in file extension")]
    InvalidFileExtChars,

    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("{stage} timeout must be a positive number of seconds, got {seconds}")]
    InvalidTimeout { stage: &'static str, seconds: f64 },
}

/// Config for jrunner
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// How submissions are compiled
    pub compiler: CompilerConfig,

    /// How compiled programs are launched
    pub runtime: RuntimeConfig,

    /// Where per-request workspaces are created
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// Create a new config from the embedded defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the compiler timeout (seconds)
    pub fn with_compile_timeout(mut self, seconds: f64) -> Result<Self, ConfigError> {
        timeout_from_secs("compiler", seconds)?;
        self.compiler.timeout = seconds;
        Ok(self)
    }

    /// Override the program timeout (seconds)
    pub fn with_run_timeout(mut self, seconds: f64) -> Result<Self, ConfigError> {
        timeout_from_secs("runtime", seconds)?;
        self.runtime.timeout = seconds;
        Ok(self)
    }

    /// Create workspaces under `root` instead of the system temp directory
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace.root = Some(root.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}
