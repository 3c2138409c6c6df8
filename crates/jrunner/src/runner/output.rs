//! Separating memory-usage metadata from program output

/// Reserved stdout prefix a program can use to report its memory usage
pub const MEMORY_USAGE_MARKER: &str = "{MemoryUsage}:";

/// Program stdout with marker lines removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutput {
    /// Remaining lines, newline-joined, trailing whitespace trimmed
    pub output: String,

    /// Value of the last marker line, if any
    pub memory_usage: Option<String>,
}

/// Split captured stdout into user output and memory-usage metadata
pub fn split_output(stdout: &str) -> SplitOutput {
    let mut output = String::with_capacity(stdout.len());
    let mut memory_usage = None;

    for line in stdout.lines() {
        if let Some(value) = line.strip_prefix(MEMORY_USAGE_MARKER) {
            memory_usage = Some(value.trim().to_owned());
        } else {
            output.push_str(line);
            output.push('\n');
        }
    }

    output.truncate(output.trim_end().len());
    SplitOutput {
        output,
        memory_usage,
    }
}
