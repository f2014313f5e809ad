//! Argument parsing and formatting helpers for CLI commands.

use std::collections::BTreeMap;

use rendition_common::types::SelectionItem;

/// Parses a `name=value` assignment given with `-p`.
///
/// # Errors
///
/// Returns an error if there is no `=` or the name is empty.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got {raw:?}")),
    }
}

/// Collects assignments into a map; later assignments win.
#[must_use]
pub fn assignments(pairs: Vec<(String, String)>) -> BTreeMap<String, String> {
    pairs.into_iter().collect()
}

/// Shows an optional value, or `-` when absent.
#[must_use]
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// Compact rendering of a selection list, e.g. `FR=France, DE=Germany`.
#[must_use]
pub fn format_choices(choices: Option<&[SelectionItem]>) -> String {
    match choices {
        None => "-".to_string(),
        Some([]) => "(none)".to_string(),
        Some(items) => items
            .iter()
            .map(|c| {
                if c.value == c.label {
                    c.value.clone()
                } else {
                    format!("{}={}", c.value, c.label)
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
    }
}
