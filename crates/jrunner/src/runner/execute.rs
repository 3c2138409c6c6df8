//! Execution step
//!
//! Launches the compiled class with stdout and stderr captured in the workspace.

use tracing::{debug, instrument};

use crate::config::{RuntimeConfig, toolchain::expand_command};
use crate::process::{ProcessOutcome, ProcessSpec};
use crate::runner::{PipelineError, read_lossy};
use crate::source::CompilationUnit;
use crate::workspace::Workspace;

/// Run a compiled unit and return its raw stdout
#[instrument(skip_all, fields(class = %unit.class_name))]
pub async fn execute(
    runtime: &RuntimeConfig,
    workspace: &Workspace,
    unit: &CompilationUnit,
) -> Result<String, PipelineError> {
    let timeout = runtime.timeout_duration()?;
    let args = expand_command(
        &runtime.command,
        workspace.source_file(),
        &unit.class_name,
        workspace.path(),
    );
    let spec = ProcessSpec::new(args)
        .envs(&runtime.env)
        .working_dir(workspace.path())
        .stdout(workspace.output_log())
        .stderr(workspace.errors_log());

    match spec.run(timeout).await? {
        ProcessOutcome::TimedOut => Err(PipelineError::ExecutionTimeout),
        outcome if outcome.is_success() => {
            debug!("execution complete");
            Ok(read_lossy(workspace.output_log()).await?)
        }
        ProcessOutcome::Exited(status) => {
            let stderr = read_lossy(workspace.errors_log()).await?;
            debug!(?status, "program failed");
            Err(PipelineError::ExecutionFailed(stderr))
        }
    }
}
