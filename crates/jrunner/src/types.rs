use serde::{Deserialize, Serialize};

use crate::runner::PipelineError;

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Program stdout without memory marker lines
    pub output: String,

    /// Compile + run wall clock time in seconds, three decimals (e.g. "0.734")
    pub execution_time: String,

    /// Memory usage reported by the program, if it printed a marker line
    pub memory_usage: Option<String>,
}

/// Response body handed to an API layer
///
/// On success `output`, `executionTime` and (optionally) `memoryUsage` are
/// set; on failure only `message` is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CodeResponse {
    /// Build a failure response carrying only the error message
    pub fn from_error(error: &PipelineError) -> Self {
        Self {
            message: Some(error.to_string()),
            ..Default::default()
        }
    }
}

impl From<ExecutionResult> for CodeResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            output: Some(result.output),
            execution_time: Some(result.execution_time),
            memory_usage: result.memory_usage,
            message: None,
        }
    }
}

impl From<Result<ExecutionResult, PipelineError>> for CodeResponse {
    fn from(result: Result<ExecutionResult, PipelineError>) -> Self {
        match result {
            Ok(result) => result.into(),
            Err(e) => Self::from_error(&e),
        }
    }
}
