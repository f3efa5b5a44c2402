// src/extractors/mod.rs
pub mod fatwa;
pub mod judgment;
pub mod law;
pub mod normalizer;
pub mod sections;

// Re-export key extraction functions for convenience
pub use normalizer::{normalize, normalize_date};
pub use sections::{split_numbered, split_sections, NumberedItem, SectionMarker};

use crate::documents::models::DocumentKind;
use regex::Regex;

/// Named patterns whose matches are worth seeing when debugging a document of `kind`.
pub fn debug_patterns(kind: DocumentKind) -> Vec<(&'static str, &'static Regex)> {
    let sections: &'static [SectionMarker] = match kind {
        DocumentKind::Fatwa => &fatwa::SECTION_MARKERS,
        DocumentKind::Law => &[],
        DocumentKind::Judgment => &judgment::SECTION_MARKERS,
    };
    let items: &'static Regex = match kind {
        DocumentKind::Fatwa => &fatwa::PRINCIPLE_MARKER_RE,
        DocumentKind::Law => &law::ARTICLE_MARKER_RE,
        DocumentKind::Judgment => &judgment::PRINCIPLE_MARKER_RE,
    };

    sections
        .iter()
        .map(|marker| (marker.key, &marker.start))
        .chain(std::iter::once(("item", items)))
        .collect()
}
