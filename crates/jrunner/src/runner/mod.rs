//! Compile-and-run pipeline
//!
//! Extract → rewrite → workspace → compile → execute → split output, with the
//! workspace removed before returning on every path.

use std::path::Path;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, instrument};

pub use crate::runner::compile::compile;
pub use crate::runner::diagnostics::format_diagnostics;
pub use crate::runner::execute::execute;
pub use crate::runner::output::{MEMORY_USAGE_MARKER, SplitOutput, split_output};

mod compile;
mod diagnostics;
mod execute;
mod output;

use crate::config::{Config, ConfigError};
use crate::source::CompilationUnit;
use crate::types::ExecutionResult;
use crate::workspace::Workspace;

/// Errors that end a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Error: Could not find a public class declaration.")]
    ClassNameNotFound,

    #[error("Compilation timed out.")]
    CompilationTimeout,

    #[error("Compilation failed\n\n{0}")]
    CompilationFailed(String),

    #[error("Execution timed out.")]
    ExecutionTimeout,

    #[error("Execution failed\n\n{0}")]
    ExecutionFailed(String),

    #[error("Unexpected error during execution: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected error during execution: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Whether the submission itself was malformed, as opposed to a failure
    /// while compiling or running it
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, PipelineError::ClassNameNotFound)
    }
}

/// High-level runner for submissions
#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
}

impl Runner {
    /// Create a new runner with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create a new runner with default configuration
    pub fn with_defaults() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile and run one submission
    ///
    /// Fails with [`PipelineError::ClassNameNotFound`] before touching the
    /// filesystem if the source has no `public class`. Otherwise a fresh
    /// workspace is created for the run and removed before this returns.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage as a [`PipelineError`]; no partial
    /// result is produced.
    #[instrument(skip_all)]
    pub async fn run(&self, source: &str) -> Result<ExecutionResult, PipelineError> {
        let unit = CompilationUnit::prepare(source)?;
        let source_name = self.config.compiler.source_name(&unit.class_name);

        Workspace::scope(&self.config.workspace, &source_name, async |workspace| {
            self.run_in(workspace, &unit).await
        })
        .await
    }

    async fn run_in(
        &self,
        workspace: &Workspace,
        unit: &CompilationUnit,
    ) -> Result<ExecutionResult, PipelineError> {
        workspace.write_source(&unit.source).await?;

        let started = Instant::now();
        compile(&self.config.compiler, workspace, unit).await?;
        let stdout = execute(&self.config.runtime, workspace, unit).await?;
        let elapsed = started.elapsed();

        let split = split_output(&stdout);
        debug!(
            elapsed = ?elapsed,
            memory_usage = ?split.memory_usage,
            "run complete"
        );

        Ok(ExecutionResult {
            output: split.output,
            execution_time: format!("{:.3}", elapsed.as_secs_f64()),
            memory_usage: split.memory_usage,
        })
    }
}

/// Read a sink file, replacing invalid UTF-8
pub(crate) async fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
