//! Compilation step
//!
//! Runs the compiler on the rewritten source already written to the workspace.

use tracing::{debug, instrument};

use crate::config::{CompilerConfig, toolchain::expand_command};
use crate::process::{ProcessOutcome, ProcessSpec};
use crate::runner::{PipelineError, read_lossy};
use crate::runner::diagnostics::format_diagnostics;
use crate::source::CompilationUnit;
use crate::workspace::Workspace;

/// Compile a unit whose source is already in its workspace
///
/// Compiler diagnostics go to the workspace's error sink; on a non-zero exit
/// they are condensed into the returned [`PipelineError::CompilationFailed`].
#[instrument(skip_all, fields(class = %unit.class_name))]
pub async fn compile(
    compiler: &CompilerConfig,
    workspace: &Workspace,
    unit: &CompilationUnit,
) -> Result<(), PipelineError> {
    let timeout = compiler.timeout_duration()?;
    let args = expand_command(
        &compiler.command,
        workspace.source_file(),
        &unit.class_name,
        workspace.path(),
    );
    let spec = ProcessSpec::new(args)
        .envs(&compiler.env)
        .working_dir(workspace.path())
        .stderr(workspace.errors_log());

    match spec.run(timeout).await? {
        ProcessOutcome::TimedOut => Err(PipelineError::CompilationTimeout),
        outcome if outcome.is_success() => {
            debug!("compilation complete");
            Ok(())
        }
        ProcessOutcome::Exited(status) => {
            let raw = read_lossy(workspace.errors_log()).await?;
            debug!(?status, "compilation failed");
            Err(PipelineError::CompilationFailed(format_diagnostics(
                &raw,
                compiler.line_offset,
            )))
        }
    }
}
