//! Per-request workspace lifecycle
//!
//! A workspace is a fresh temporary directory holding the rewritten source,
//! the compiled classes and the two log sinks. It never outlives the request.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, instrument, warn};

use crate::config::WorkspaceConfig;

/// File receiving compiler diagnostics and the program's stderr
pub const ERRORS_LOG: &str = "errors.log";

/// File receiving the program's stdout
pub const OUTPUT_LOG: &str = "output.log";

/// A temporary directory scoped to one pipeline run
///
/// # Cleanup
///
/// Prefer [`Workspace::scope`], which removes the directory after the body
/// finishes no matter how it finished. A workspace that is simply dropped
/// (panic, cancelled future) is still removed by the underlying [`TempDir`],
/// but removal errors are then silently ignored.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    source_file: PathBuf,
    errors_log: PathBuf,
    output_log: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory for `source_name`
    #[instrument(skip(config))]
    pub fn create(config: &WorkspaceConfig, source_name: &str) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.prefix);
        let dir = match config.root {
            Some(ref root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let path = dir.path();
        debug!(path = %path.display(), "created workspace");

        Ok(Self {
            source_file: path.join(source_name),
            errors_log: path.join(ERRORS_LOG),
            output_log: path.join(OUTPUT_LOG),
            dir,
        })
    }

    /// Run `body` against a fresh workspace, then remove it
    ///
    /// The directory is destroyed after `body` returns, whether it returned
    /// `Ok` or `Err`. Removal failures are logged and never replace the
    /// body's own result.
    pub async fn scope<T, E>(
        config: &WorkspaceConfig,
        source_name: &str,
        body: impl AsyncFnOnce(&Workspace) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<std::io::Error>,
    {
        let workspace = Self::create(config, source_name)?;
        let result = body(&workspace).await;
        workspace.destroy();
        result
    }

    /// Workspace directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the rewritten source is written
    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    /// Compiler diagnostics / program stderr sink
    pub fn errors_log(&self) -> &Path {
        &self.errors_log
    }

    /// Program stdout sink
    pub fn output_log(&self) -> &Path {
        &self.output_log
    }

    /// Write the submission to [`Workspace::source_file`]
    pub async fn write_source(&self, source: &str) -> std::io::Result<()> {
        tokio::fs::write(&self.source_file, source).await?;
        debug!(source = %self.source_file.display(), "wrote source file");
        Ok(())
    }

    /// Recursively delete the workspace directory
    pub fn destroy(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "removed workspace"),
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "failed to remove workspace"
            ),
        }
    }
}
