// src/extractors/fatwa.rs

//! Pattern rules for fatwas.
//!
//! Every rule takes normalized text. A rule that does not match yields `None` (or an
//! empty list); only an unreadable numeric capture is an error.

use crate::documents::models::{FatwaHeader, Principle};
use crate::extractors::normalizer::{normalize, parse_date_field, parse_number, DATE_TOKEN};
use crate::extractors::sections::{split_numbered, SectionMarker};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// "<authority> - الفتوى رقم <N> لسنة <Y> [رقم الملف <F>] بتاريخ <date> تاريخ الجلسة <date>"
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(.*?)\s*-\s*الفتوى\s+رقم\s*(\d+)\s*لسنة\s*(\d+)(?:\s*رقم\s+الملف\s*([\d/]+))?\s*بتاريخ\s*({date})\s*تاريخ\s+الجلسة\s*({date})",
        date = DATE_TOKEN
    ))
    .expect("Failed to compile fatwa HEADER_RE")
});

// Block under a "الجهة" line, up to a blank line or the subject heading.
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)الجهة\s*\n(.*?)(?:\n\n|موضوع\s+الفتوى)").expect("Failed to compile ENTITY_RE")
});

// "مبدأ 3" or "مبدأ رقم 3"
pub(crate) static PRINCIPLE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"مبدأ\s+(?:رقم\s*)?(\d+)").expect("Failed to compile fatwa PRINCIPLE_MARKER_RE")
});

/// Prose sections of a fatwa, in the order they are expected to appear.
pub static SECTION_MARKERS: Lazy<Vec<SectionMarker>> = Lazy::new(|| {
    vec![
        SectionMarker::new("facts", r"(?m)^الوقائع[ \t]*:?"),
        SectionMarker::new("application", r"(?m)^التطبيق[ \t]*:?"),
        SectionMarker::new("opinion", r"(?m)^الرأ[ىي][ \t]*:?"),
    ]
});

/// Parses the header, which must be the first line of the document.
pub fn extract_header(text: &str) -> Result<Option<FatwaHeader>, ExtractError> {
    let first_line = text.lines().next().unwrap_or_default();
    let Some(caps) = HEADER_RE.captures(first_line) else {
        return Ok(None);
    };

    Ok(Some(FatwaHeader {
        issuing_authority: caps[1].trim().to_string(),
        number: parse_number("number", &caps[2])?,
        year: parse_number("year", &caps[3])?,
        file_number: caps.get(4).map(|m| m.as_str().trim().to_string()),
        issue_date: parse_date_field(&caps[5]),
        session_date: parse_date_field(&caps[6]),
    }))
}

/// The requesting body named under the "الجهة" heading.
pub fn extract_entity(text: &str) -> Option<String> {
    let caps = ENTITY_RE.captures(text)?;
    let entity = normalize(&caps[1]);
    (!entity.is_empty()).then_some(entity)
}

/// Every "مبدأ N" item in `text`, in source order. The last item runs to the end of `text`.
pub fn extract_principles(text: &str) -> Result<Vec<Principle>, ExtractError> {
    split_numbered(text, &PRINCIPLE_MARKER_RE)
        .into_iter()
        .map(|item| {
            Ok(Principle {
                number: parse_number("principle", item.number)?,
                text: item.body.to_string(),
            })
        })
        .collect()
}

/// The part of `text` before the first prose section heading.
///
/// Principles are listed ahead of the prose sections, so this keeps the last principle
/// from swallowing them.
pub fn principles_region(text: &str) -> &str {
    let end = SECTION_MARKERS
        .iter()
        .filter_map(|marker| marker.start.find(text))
        .map(|m| m.start())
        .min()
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_LINE: &str =
        "مجلس الدولة - الفتوى رقم 123 لسنة 2021 بتاريخ 2021-05-10 تاريخ الجلسة 2021-04-28";

    #[test]
    fn test_header_full_template() {
        let header = extract_header(HEADER_LINE).unwrap().expect("Header should parse");

        assert_eq!(header.issuing_authority, "مجلس الدولة");
        assert_eq!(header.number, 123);
        assert_eq!(header.year, 2021);
        assert_eq!(header.file_number, None, "No file-number clause in the line");
        assert_eq!(header.issue_date.as_deref(), Some("2021-05-10"));
        assert_eq!(header.session_date.as_deref(), Some("2021-04-28"));
    }

    #[test]
    fn test_header_with_file_number_and_slash_dates() {
        let line = "مجلس الدولة - الفتوى رقم 7 لسنة 2019 رقم الملف 86/4/1520 بتاريخ 3/2/2019 تاريخ الجلسة 16 / 1 / 2019";
        let header = extract_header(line).unwrap().expect("Header should parse");

        assert_eq!(header.file_number.as_deref(), Some("86/4/1520"));
        assert_eq!(header.issue_date.as_deref(), Some("2019-02-03"));
        assert_eq!(header.session_date.as_deref(), Some("2019-01-16"));
    }

    #[test]
    fn test_header_unrecognized_date_is_absent_not_fatal() {
        let line = "مجلس الدولة - الفتوى رقم 8 لسنة 2019 بتاريخ 2019-13-45 تاريخ الجلسة 2019-01-02";
        let header = extract_header(line).unwrap().expect("Header should parse");
        assert_eq!(header.issue_date, None);
        assert_eq!(header.session_date.as_deref(), Some("2019-01-02"));
    }

    #[test]
    fn test_header_only_considers_first_line() {
        let text = format!("مقدمة\n{}", HEADER_LINE);
        assert_eq!(extract_header(&text).unwrap(), None);
        assert_eq!(extract_header("").unwrap(), None);
        assert_eq!(extract_header("الفتوى رقم 5 لسنة 2020").unwrap(), None);
    }

    #[test]
    fn test_header_overflowing_number_is_a_fault() {
        let line = "مجلس الدولة - الفتوى رقم 99999999999 لسنة 2021 بتاريخ 2021-05-10 تاريخ الجلسة 2021-04-28";
        let err = extract_header(line).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidNumber { field: "number", .. }));
    }

    #[test]
    fn test_entity_until_blank_line_or_subject() {
        let text = "الجهة\nوزارة المالية\nقطاع الموازنة\n\nباقي النص";
        assert_eq!(extract_entity(text).as_deref(), Some("وزارة المالية\nقطاع الموازنة"));

        let text = "الجهة\nهيئة قضايا الدولة موضوع الفتوى مدى أحقية";
        assert_eq!(extract_entity(text).as_deref(), Some("هيئة قضايا الدولة"));

        assert_eq!(extract_entity("بلا جهة"), None);
    }

    #[test]
    fn test_principles_out_of_order_numbers_kept() {
        let text = "مبدأ 1\nالنص الأول\nمبدأ 3\nالنص الثالث\nمبدأ 2\nالنص الثاني";
        let principles = extract_principles(text).unwrap();

        let numbers: Vec<u32> = principles.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 3, 2]);
        assert_eq!(principles[1].text, "النص الثالث");
        assert_eq!(principles[2].text, "النص الثاني");
    }

    #[test]
    fn test_principles_accept_raqm_form() {
        let principles = extract_principles("مبدأ رقم 4 نص المبدأ").unwrap();
        assert_eq!(principles, vec![Principle { number: 4, text: "نص المبدأ".to_string() }]);
    }

    #[test]
    fn test_principles_region_stops_at_first_section() {
        let text = "مبدأ 1 نص\nالوقائع\nوقائع\nالرأى\nرأي";
        assert_eq!(principles_region(text), "مبدأ 1 نص\n");
        assert_eq!(principles_region("مبدأ 1 نص"), "مبدأ 1 نص");
    }
}
