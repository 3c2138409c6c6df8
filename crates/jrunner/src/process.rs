//! Child processes with a wall clock deadline
//!
//! Handles spawning the compiler and the program with their streams
//! redirected to workspace files, waiting under a timeout and hard-killing
//! on expiry.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// How a deadline-bounded child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process exited on its own
    Exited(ExitStatus),

    /// The deadline passed and the process was killed
    TimedOut,
}

impl ProcessOutcome {
    /// Check if the process exited with status 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Exited(status) if status.success())
    }
}

/// A command to run with its output redirected to files
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    args: Vec<String>,
    env: HashMap<String, String>,
    working_dir: Option<PathBuf>,
    stdout: Option<PathBuf>,
    stderr: Option<PathBuf>,
}

impl ProcessSpec {
    /// `args[0]` is the program, looked up on PATH if it has no `/`
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            env: HashMap::new(),
            working_dir: None,
            stdout: None,
            stderr: None,
        }
    }

    /// Set environment variables
    pub fn envs(mut self, env: &HashMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Set the working directory
    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    /// Redirect stdout to a file (truncated). Discarded if unset.
    pub fn stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    /// Redirect stderr to a file (truncated). Discarded if unset.
    pub fn stderr(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr = Some(path.into());
        self
    }

    /// Spawn the process and wait for it for at most `timeout`
    ///
    /// The child is spawned with kill-on-drop, so dropping the returned
    /// future mid-wait kills it as well. On expiry the child is killed and
    /// reaped before returning [`ProcessOutcome::TimedOut`].
    #[instrument(skip(self), fields(program = self.args.first().map(String::as_str)))]
    pub async fn run(&self, timeout: Duration) -> std::io::Result<ProcessOutcome> {
        let (program, rest) = self.args.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
        })?;

        let mut command = Command::new(program);
        command
            .args(rest)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(sink(self.stdout.as_deref())?)
            .stderr(sink(self.stderr.as_deref())?)
            .kill_on_drop(true);
        if let Some(ref dir) = self.working_dir {
            command.current_dir(dir);
        }

        debug!(args = ?self.args, "spawning process");
        let mut child = command.spawn()?;
        // Release our copies of the sink descriptors
        drop(command);

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(?status, "process exited");
                Ok(ProcessOutcome::Exited(status))
            }
            Err(_) => {
                warn!(?timeout, "process exceeded its deadline, killing");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill timed out process");
                }
                Ok(ProcessOutcome::TimedOut)
            }
        }
    }
}

fn sink(path: Option<&Path>) -> std::io::Result<Stdio> {
    match path {
        Some(path) => Ok(Stdio::from(File::create(path)?)),
        None => Ok(Stdio::null()),
    }
}
