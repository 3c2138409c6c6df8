//! A library for compiling and running single-file Java submissions.
//!
//! jrunner takes the text of one compilation unit, renames its public class
//! with a random suffix, compiles it in a throwaway directory, runs it under a
//! wall clock timeout and hands back the captured output. Nothing survives
//! the call.
//!
//! # Features
//!
//! - **Collision-free names** — Overlapping runs never share a class name or directory.
//! - **Bounded** — Compiler and program are hard-killed at their deadlines.
//! - **Always cleaned up** — The workspace is removed on success, failure and timeout.
//! - **Readable diagnostics** — javac errors condensed to `Error at line N: ...`.
//! - **Memory marker** — A `{MemoryUsage}: <value>` stdout line is reported separately.
//! - **TOML configuration** — Commands, timeouts and workspace location.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG};
pub use runner::{PipelineError, Runner};
pub use source::CompilationUnit;
pub use types::{CodeResponse, ExecutionResult};
pub use workspace::Workspace;

pub mod config;
pub mod process;
pub mod runner;
pub mod source;
pub mod types;
pub mod workspace;
