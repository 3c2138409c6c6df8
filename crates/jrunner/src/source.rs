//! Class name discovery and identifier rewriting
//!
//! Every submission gets its public class renamed to `<Name><suffix>` so that
//! overlapping runs never share a class file name.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::debug;
use uuid::Uuid;

use crate::runner::PipelineError;

/// Length of the random suffix appended to the declared class name
pub const SUFFIX_LEN: usize = 5;

static PUBLIC_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"public\s+class\s+(\w+)").expect("valid class pattern"));

/// A submission after identifier rewriting, ready to be written and compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Name of the public class as written by the user
    pub declared_name: String,

    /// Random suffix appended to the declared name
    pub suffix: String,

    /// `declared_name` followed by `suffix`; names the source file and the entry point
    pub class_name: String,

    /// Source text with the public class declaration renamed
    pub source: String,
}

impl CompilationUnit {
    /// Extract the public class name and rewrite the source with a fresh suffix
    pub fn prepare(source: &str) -> Result<Self, PipelineError> {
        let declared_name = extract_class_name(source).ok_or(PipelineError::ClassNameNotFound)?;
        Ok(Self::with_suffix(source, declared_name, generate_suffix()))
    }

    fn with_suffix(source: &str, declared_name: &str, suffix: String) -> Self {
        let class_name = format!("{declared_name}{suffix}");
        let source = rewrite_declaration(source, declared_name, &class_name);
        debug!(declared_name, class_name, "rewrote public class declaration");

        Self {
            declared_name: declared_name.to_owned(),
            suffix,
            class_name,
            source,
        }
    }
}

/// Find the identifier of the first `public class` declaration
pub fn extract_class_name(source: &str) -> Option<&str> {
    PUBLIC_CLASS
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Generate a short random alphanumeric suffix
///
/// Drawn from a v4 UUID, so concurrent callers need no coordination.
pub fn generate_suffix() -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(SUFFIX_LEN);
    suffix
}

/// Replace the first `public class <declared>` with `public class <renamed>`
fn rewrite_declaration(source: &str, declared: &str, renamed: &str) -> String {
    let pattern = format!(r"public\s+class\s+{}", regex::escape(declared));
    let Ok(declaration) = Regex::new(&pattern) else {
        return source.to_owned();
    };
    let replacement = format!("public class {renamed}");
    declaration
        .replacen(source, 1, NoExpand(&replacement))
        .into_owned()
}
