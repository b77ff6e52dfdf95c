//! Dotenv Reader
//!
//! Minimal `KEY=VALUE` reader. No quoting, escaping or `export` prefixes:
//! the value is everything after the first `=`, trimmed.

use std::fs;
use std::path::Path;

use super::env::EnvProvider;
use super::error::ConfigError;

/// Parse one line. Blank lines, `#` comments, lines without `=` and lines
/// with an empty key yield `None`.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key, value.trim()))
}

/// All assignments in `content`, in file order
pub fn parse(content: &str) -> Vec<(&str, &str)> {
    content.lines().filter_map(parse_line).collect()
}

/// Read `path` and write every assignment into `env`.
///
/// Returns the number of variables set.
pub fn load_into<E: EnvProvider>(path: &Path, env: &mut E) -> Result<usize, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;

    let mut count = 0;
    for (key, value) in parse(&content) {
        if key.contains('\0') || value.contains('\0') {
            continue;
        }
        env.set_var(key, value);
        count += 1;
    }

    Ok(count)
}
