//! Assertion helpers and macros for downstream test suites.

use anyhow::Result;
use regex::Regex;

use crate::{anyhow_loc, bail_loc, function_name};

/// Asserts that a Result is Ok, printing the error if not.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        assert!($result.is_ok(), "Expected Ok, got Err: {:#?}", $result);
    };
}

/// Asserts that a Result is Err, printing the value if not.
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        assert!($result.is_err(), "Expected Err, got Ok: {:#?}", $result);
    };
}

/// Check that `lines` pair up with `patterns`, each line fully matching its
/// pattern (anchored, never partial).
pub fn match_lines(patterns: &[&str], lines: &[&str]) -> Result<()> {
    if patterns.len() != lines.len() {
        bail_loc!("expected {} lines, got {}", patterns.len(), lines.len());
    }
    for (i, (pattern, line)) in patterns.iter().zip(lines.iter()).enumerate() {
        let re = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| anyhow_loc!("invalid pattern '{}' at index {}: {}", pattern, i, e))?;
        if !re.is_match(line) {
            bail_loc!("line {} '{}' does not match pattern '{}'", i, line, pattern);
        }
    }
    Ok(())
}

/// Character-wise comparison of `text` against `pattern`, where `wildcard`
/// in the pattern matches any single character. Length differences count as
/// mismatches. Failure names the first bad position and both prefixes up to
/// it.
pub fn match_text(pattern: &str, text: &str, wildcard: char) -> Result<()> {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    for i in 0..pattern_chars.len().max(text_chars.len()) {
        let a = pattern_chars.get(i);
        let b = text_chars.get(i);
        if a != b && a != Some(&wildcard) {
            bail_loc!(
                "mismatch on character {}: '{}' != '{}'",
                i,
                pattern_chars.iter().take(i + 1).collect::<String>(),
                text_chars.iter().take(i + 1).collect::<String>()
            );
        }
    }
    Ok(())
}
