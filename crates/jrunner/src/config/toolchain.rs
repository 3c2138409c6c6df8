use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::config::ConfigError;

const INVALID_FILE_EXT_CHARS: [char; 2] = ['/', '.'];

/// Configuration for the compilation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Command and arguments with placeholders
    /// Placeholders: {source}, {class}, {workspace}
    pub command: Vec<String>,

    /// Wall clock timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// Subtracted from every line number reported by the compiler
    #[serde(default)]
    pub line_offset: i64,

    /// Source file extension
    #[serde(default = "default_extension")]
    pub extension: FileExtension,

    /// Environment variables to set during compilation
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl CompilerConfig {
    pub fn timeout_duration(&self) -> Result<Duration, ConfigError> {
        timeout_from_secs("compiler", self.timeout)
    }

    /// Source file name for a class (e.g. "Hello1a2b3.java")
    pub fn source_name(&self, class_name: &str) -> String {
        format!("{class_name}.{}", self.extension)
    }
}

/// Configuration for the execution step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Command and arguments with placeholders
    /// Placeholders: {source}, {class}, {workspace}
    pub command: Vec<String>,

    /// Wall clock timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// Environment variables to set for the program
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl RuntimeConfig {
    pub fn timeout_duration(&self) -> Result<Duration, ConfigError> {
        timeout_from_secs("runtime", self.timeout)
    }
}

/// Where per-request workspaces live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory name prefix
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Parent directory (system temp dir if unset)
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            root: None,
        }
    }
}

/// Convert a timeout in seconds, rejecting zero, negative, NaN and
/// values too large for a [`Duration`]
pub fn timeout_from_secs(stage: &'static str, seconds: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(ConfigError::InvalidTimeout { stage, seconds }),
    }
}

/// Expand placeholders in the given command
pub fn expand_command(
    command: &[String],
    source: &Path,
    class_name: &str,
    workspace: &Path,
) -> Vec<String> {
    let source = source.to_string_lossy();
    let workspace = workspace.to_string_lossy();
    command
        .iter()
        .map(|arg| {
            arg.replace("{source}", &source)
                .replace("{class}", class_name)
                .replace("{workspace}", &workspace)
        })
        .collect()
}

/// File extension without dot (e.g., "java")
#[derive(Debug, Clone, Serialize)]
pub struct FileExtension(String);

impl FileExtension {
    pub fn new(extension: &str) -> Result<Self, ConfigError> {
        let contains_invalid = extension
            .chars()
            .any(|c| INVALID_FILE_EXT_CHARS.contains(&c));
        if contains_invalid {
            return Err(ConfigError::InvalidFileExtChars);
        }
        Ok(Self(extension.to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for FileExtension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileExtension::new(&s).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a file extension without '/' or '.' characters",
            )
        })
    }
}

impl std::fmt::Display for FileExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_timeout() -> f64 {
    5.0
}

fn default_extension() -> FileExtension {
    FileExtension("java".to_owned())
}

fn default_prefix() -> String {
    "java-compiler".to_owned()
}
