//! Better error messages with actionable suggestions.

use convkit_core::Registry;
use std::path::Path;

/// Build an error message for an unknown operation ID.
pub fn unknown_operation_error(id: &str, registry: &Registry) -> String {
    let mut msg = format!("Converter '{id}' not found");

    let ids: Vec<&str> = registry.descriptors().map(|d| d.id.as_str()).collect();
    if let Some(suggestion) = find_similar(id, &ids) {
        msg.push_str(&format!(".\n\nDid you mean '{suggestion}'?"));
        return msg;
    }

    // Fall back to a tag/name search on the first word of the ID
    let term = id.split(['-', '_', ' ']).find(|w| !w.is_empty()).unwrap_or(id);
    let related: Vec<&str> = registry
        .search(term)
        .into_iter()
        .map(|op| op.id())
        .take(5)
        .collect();
    if !related.is_empty() {
        msg.push_str(&format!(".\n\nRelated operations: {}", related.join(", ")));
    } else {
        msg.push_str(".\n\nRun 'convkit list' to see available operations");
    }
    msg
}

/// Build an error message for an unknown category.
pub fn unknown_category_error(category: &str, registry: &Registry) -> String {
    let categories = registry.categories();
    let mut msg = format!("Unknown category '{category}'");
    if let Some(suggestion) = find_similar(category, &categories) {
        msg.push_str(&format!(". Did you mean '{suggestion}'?"));
    } else {
        msg.push_str(&format!(".\n\nCategories: {}", categories.join(", ")));
    }
    msg
}

/// Build an error message for an unknown preset.
pub fn unknown_preset_error(name: &str, known: &[&str]) -> String {
    let mut msg = format!("Unknown preset '{name}'");
    if let Some(suggestion) = find_similar(name, known) {
        msg.push_str(&format!(". Did you mean '{suggestion}'?"));
    } else {
        msg.push_str(". Run 'convkit presets' to list presets");
    }
    msg
}

/// Build an error message for file read errors.
pub fn file_read_error(path: &Path, err: &std::io::Error) -> String {
    use std::io::ErrorKind;

    let mut msg = format!("Failed to read '{}'", path.display());

    match err.kind() {
        ErrorKind::NotFound => {
            msg.push_str(": file not found");

            let suggestions = find_similar_files(path).unwrap_or_default();
            if !suggestions.is_empty() {
                msg.push_str(&format!(".\n\nDid you mean: {}?", suggestions.join(", ")));
            }
        }
        ErrorKind::PermissionDenied => {
            msg.push_str(": permission denied. Check file permissions.");
        }
        ErrorKind::InvalidData => {
            msg.push_str(": file is not valid UTF-8.");
        }
        _ => {
            msg.push_str(&format!(": {err}"));
        }
    }

    msg
}

/// Closest candidate within edit distance 2 (or 1 for very short input).
///
/// Comparison is case-insensitive, so a wrongly cased ID suggests itself.
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.to_lowercase();
    let limit = if input.chars().count() <= 3 { 1 } else { 2 };

    candidates
        .iter()
        .map(|c| (levenshtein(&input, c), *c))
        .filter(|(d, _)| *d <= limit)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

/// Simple Levenshtein distance for short strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find similar files in the same directory (for "did you mean" suggestions).
fn find_similar_files(path: &Path) -> Option<Vec<String>> {
    let filename = path.file_name()?.to_str()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let entries = std::fs::read_dir(parent).ok()?;
    let mut suggestions: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name != filename && levenshtein(filename, name) <= 2)
        .collect();

    suggestions.sort();
    suggestions.truncate(3);
    Some(suggestions)
}
