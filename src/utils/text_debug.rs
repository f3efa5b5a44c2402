// src/utils/text_debug.rs
use crate::utils::error::AppError;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Brackets every match of the named patterns in `text`: `⟦key⟧match⟦/key⟧`.
///
/// Overlapping matches are resolved by start position; a match starting inside an
/// earlier one is dropped.
pub fn annotate_text(text: &str, patterns: &[(&str, &Regex)]) -> String {
    let mut highlights: Vec<(usize, usize, &str)> = Vec::new();
    for (key, re) in patterns {
        for mat in re.find_iter(text) {
            highlights.push((mat.start(), mat.end(), *key));
        }
    }
    highlights.sort_by_key(|h| (h.0, std::cmp::Reverse(h.1)));

    let mut annotated = String::with_capacity(text.len() + highlights.len() * 16);
    let mut last_pos = 0;
    for (start, end, key) in highlights {
        if start < last_pos {
            continue;
        }
        annotated.push_str(&text[last_pos..start]);
        annotated.push_str(&format!("⟦{}⟧", key));
        annotated.push_str(&text[start..end]);
        annotated.push_str(&format!("⟦/{}⟧", key));
        last_pos = end;
    }
    annotated.push_str(&text[last_pos..]);
    annotated
}

/// Writes the annotated text to `path`, creating parent directories as needed.
pub fn save_debug_text(
    text: &str,
    path: &Path,
    patterns: &[(&str, &Regex)],
) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, annotate_text(text, patterns))?;

    tracing::info!("Saved debug text to {}", path.display());
    Ok(())
}
