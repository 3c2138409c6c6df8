//! Condensing raw compiler diagnostics
//!
//! Best-effort: javac's layout is matched line by line, and anything that
//! cannot be condensed falls back to the raw text.

/// Reformat compiler diagnostics into `Error at line N: message` lines
///
/// Error lines (`File.java:12: error: message`) are rewritten with their line
/// number reduced by `line_offset`, caret markers and `location:` annotations
/// are dropped, and every other non-blank line is kept as is. If nothing
/// survives, `raw` is returned unchanged.
pub fn format_diagnostics(raw: &str, line_offset: i64) -> String {
    let mut formatted = String::new();

    for line in raw.lines() {
        if line.contains(": error:") {
            match condense_error_line(line, line_offset) {
                Some(condensed) => formatted.push_str(&condensed),
                None => formatted.push_str(line),
            }
            formatted.push('\n');
        } else if is_caret_line(line) || is_location_line(line) {
            continue;
        } else if !line.trim().is_empty() {
            formatted.push_str(line);
            formatted.push('\n');
        }
    }

    if formatted.is_empty() {
        return raw.to_owned();
    }
    formatted
}

/// `<file>:<line>:<kind>:<message...>`
fn condense_error_line(line: &str, line_offset: i64) -> Option<String> {
    let mut fields = line.splitn(4, ':');
    let _file = fields.next()?;
    let line_number = fields.next()?.trim().parse::<i64>().ok()?;
    let _kind = fields.next()?;
    let message = fields.next()?.trim();

    let line_number = line_number.checked_sub(line_offset)?;

    Some(format!("Error at line {line_number}: {message}"))
}

fn is_caret_line(line: &str) -> bool {
    line.trim_start().starts_with('^')
}

fn is_location_line(line: &str) -> bool {
    line.trim_start().starts_with("location:")
}
