// src/extractors/sections.rs

//! Marker-driven partitioning of a normalized document body.
//!
//! Two strategies live here:
//! - [`split_sections`] cuts the text into named spans using an ordered marker table.
//!   Boundaries follow the CONFIGURED order of the table, not the order in which the
//!   markers happen to appear in the text. A document whose headings are out of order
//!   gets wrong boundaries; that is a known limitation and is not corrected here.
//! - [`split_numbered`] walks a repeating item marker ("مبدأ N", "المادة N") and hands
//!   back each marker's number with the body that follows it.

use regex::Regex;
use std::collections::HashMap;

/// A named section start pattern.
#[derive(Debug, Clone)]
pub struct SectionMarker {
    pub key: &'static str,
    pub start: Regex,
}

impl SectionMarker {
    /// Builds a marker from a pattern that is known to be valid.
    ///
    /// Only used for the static marker tables, where a bad pattern is a programming error.
    pub fn new(key: &'static str, pattern: &str) -> Self {
        Self {
            key,
            start: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("Failed to compile section marker '{}': {}", key, e)),
        }
    }
}

/// Splits `text` into sections keyed by marker.
///
/// For marker `i` the span starts at its first match and ends at the first match of
/// marker `i + 1` found after that point, or at the end of text when marker `i` is the
/// last one or marker `i + 1` never matches there. The marker text itself is stripped and the
/// span trimmed. A marker that never matches contributes no key at all, so an absent
/// key and an empty string mean different things.
pub fn split_sections(text: &str, markers: &[SectionMarker]) -> HashMap<&'static str, String> {
    let mut sections = HashMap::new();

    for (i, marker) in markers.iter().enumerate() {
        let Some(found) = marker.start.find(text) else {
            continue;
        };

        let body_start = found.end();
        let body_end = markers
            .get(i + 1)
            .and_then(|next| next.start.find_at(text, body_start))
            .map(|m| m.start())
            .unwrap_or(text.len());

        let body = if body_end > body_start { &text[body_start..body_end] } else { "" };
        sections.insert(marker.key, body.trim().to_string());
    }

    sections
}

/// One item found by [`split_numbered`]: the captured number, verbatim, and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedItem<'a> {
    pub number: &'a str,
    pub body: &'a str,
}

/// Splits `text` on every match of `marker`, whose first capture group is the item number.
///
/// Each body runs from the end of its marker to the start of the next one (or end of
/// text) and is trimmed. Items keep source order; numbers are neither sorted, renumbered
/// nor de-duplicated.
pub fn split_numbered<'a>(text: &'a str, marker: &Regex) -> Vec<NumberedItem<'a>> {
    let mut items = Vec::new();
    let mut open: Option<(&'a str, usize)> = None;

    for caps in marker.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Some((prev_number, body_start)) = open.take() {
            items.push(NumberedItem {
                number: prev_number,
                body: text[body_start..whole.start()].trim(),
            });
        }
        open = Some((number.as_str(), whole.end()));
    }

    if let Some((number, body_start)) = open {
        items.push(NumberedItem { number, body: text[body_start..].trim() });
    }

    items
}
