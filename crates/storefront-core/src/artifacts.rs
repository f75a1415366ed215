//! Naming helpers for files the suite leaves behind (screenshots, logs).

use chrono::Local;

/// Timestamp suffix used in artifact file names: `YYYYMMDD_HHMMSS`.
#[must_use]
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Make an arbitrary label (usually a CSS selector) safe to use in a file name.
///
/// Anything other than ASCII alphanumerics, `-` and `_` becomes `_`, and runs
/// of replacements collapse to one.
#[must_use]
pub fn sanitize(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<label>_<timestamp>.<ext>`
#[must_use]
pub fn stamped_file_name(label: &str, ext: &str) -> String {
    format!("{}_{}.{ext}", sanitize(label), timestamp())
}
