//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::transform::FileTransform;

/// Render computed edits as a table, one row per edit, followed by warnings
pub fn render_text(transforms: &[FileTransform]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<30} {:<6} {:<6} {:<9} {}\n",
        "FILE", "START", "END", "KIND", "TEXT"
    ));

    for transform in transforms {
        for edit in &transform.edits {
            output.push_str(&format!(
                "{:<30} {:<6} {:<6} {:<9} {}\n",
                truncate_or_pad(&transform.file, 30),
                edit.start,
                edit.end,
                edit.kind.as_str(),
                escape(&edit.text),
            ));
        }
    }

    for transform in transforms {
        for warning in &transform.warnings {
            output.push_str(&format!(
                "warning: {}:{}: {}\n",
                transform.file,
                warning.line,
                warning.message()
            ));
        }
    }

    output
}

/// Render computed edits and warnings as JSON
pub fn render_json(transforms: &[FileTransform]) -> String {
    serde_json::to_string_pretty(transforms).unwrap_or_else(|_| "[]".to_string())
}

/// Show line breaks in inserted text on one row
fn escape(text: &str) -> String {
    text.replace('\n', "\\n").replace('\t', "\\t")
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
