// src/extractors/judgment.rs

//! Pattern rules for court judgments.
//!
//! Unlike fatwas and laws, the header is not one template line. Each field has its own
//! rule and is looked for anywhere in the text, so a header is always produced and
//! carries whatever could be found.

use crate::documents::models::{JudgmentHeader, JudgmentPrinciple};
use crate::extractors::normalizer::{normalize_date, parse_number};
use crate::extractors::sections::{split_numbered, split_sections, SectionMarker};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// "جمهورية مصر العربية - محكمة النقض - مدني"
static FIRST_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s*-\s*(.+?)\s*-\s*(.+)$").expect("Failed to compile FIRST_LINE_RE")
});

static CASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"الطعن\s+رقم\s+(\d+)\s+لسنة\s+(\d+)").expect("Failed to compile CASE_RE")
});

static SESSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"تاريخ\s+الجلسة\s*:?\s*([^\n]+)").expect("Failed to compile SESSION_RE")
});

static TECHNICAL_OFFICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"مكتب\s+فني\s+(\d+)").expect("Failed to compile TECHNICAL_OFFICE_RE")
});

static VOLUME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"رقم\s+الجزء\s+(\d+)").expect("Failed to compile VOLUME_RE")
});

static PAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"رقم\s+الصفحة\s+(\d+)").expect("Failed to compile PAGE_RE")
});

static RULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"القاعدة\s+رقم\s+(\d+)").expect("Failed to compile RULE_RE")
});

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"الرقم\s+المرجعي\s*:?\s*(\d+)").expect("Failed to compile REFERENCE_RE")
});

static PANEL_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^الهيئة[ \t]*:?[ \t]*\n").expect("Failed to compile PANEL_START_RE")
});

static PANEL_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*(?:المبادئ\s*القانونية|مبدأ\s*رقم)").expect("Failed to compile PANEL_END_RE")
});

static PRINCIPLES_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"المبادئ\s*القانونية").expect("Failed to compile PRINCIPLES_HEADING_RE")
});

pub(crate) static PRINCIPLE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"مبدأ\s*رقم\s*(\d+)").expect("Failed to compile judgment PRINCIPLE_MARKER_RE")
});

const FACTS_MARKER: &str = r"(?m)^الوقائع[ \t]*:?";
const RULING_MARKER: &str = r"و?لما\s+تقدم";

static FACTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(FACTS_MARKER).expect("Failed to compile judgment FACTS_RE")
});

static RULING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(RULING_MARKER).expect("Failed to compile RULING_RE")
});

/// Facts, reasoning and the ruling phrase, in the order they are expected to appear.
pub static SECTION_MARKERS: Lazy<Vec<SectionMarker>> = Lazy::new(|| {
    vec![
        SectionMarker::new("facts", FACTS_MARKER),
        SectionMarker::new("reasoning", r"(?m)^الحيثيات[ \t]*:?"),
        SectionMarker::new("ruling", RULING_MARKER),
    ]
});

/// Composes the header from independent field rules.
///
/// Unmatched fields fall back to the defaults of [`JudgmentHeader`]: the unspecified
/// court name and `0` for case number and year.
pub fn extract_header(text: &str) -> Result<JudgmentHeader, ExtractError> {
    let mut header = JudgmentHeader::default();

    let first_line = text.lines().next().unwrap_or_default();
    if let Some(caps) = FIRST_LINE_RE.captures(first_line) {
        header.issuing_authority = Some(caps[1].trim().to_string());
        header.court_name = caps[2].trim().to_string();
        header.case_type = Some(caps[3].trim().to_string());
    }

    if let Some(caps) = CASE_RE.captures(text) {
        header.case_number = parse_number("case_number", &caps[1])?;
        header.case_year = parse_number("case_year", &caps[2])?;
    }

    header.session_date = SESSION_RE
        .captures(text)
        .and_then(|caps| normalize_date(Some(&caps[1])));

    header.technical_office = find_number(&TECHNICAL_OFFICE_RE, "technical_office", text)?;
    header.volume_number = find_number(&VOLUME_RE, "volume_number", text)?;
    header.page_number = find_number(&PAGE_RE, "page_number", text)?;
    header.rule_number = find_number(&RULE_RE, "rule_number", text)?;
    header.reference_number = REFERENCE_RE.captures(text).map(|caps| caps[1].trim().to_string());

    Ok(header)
}

fn find_number(re: &Regex, field: &'static str, text: &str) -> Result<Option<u32>, ExtractError> {
    re.captures(text)
        .map(|caps| parse_number(field, &caps[1]))
        .transpose()
}

/// The bench listed under "الهيئة", up to the principles heading or the first principle.
pub fn extract_panel(text: &str) -> Option<String> {
    let start = PANEL_START_RE.find(text)?.end();
    let end = PANEL_END_RE.find_at(text, start)?.start();
    let panel = text[start..end].trim();
    (!panel.is_empty()).then(|| panel.to_string())
}

/// Principles listed between "المبادئ القانونية" and the facts heading.
///
/// No such section means no principles. Items with an empty body are dropped; numbers
/// are kept as written, duplicates included.
pub fn extract_principles(text: &str) -> Result<Vec<JudgmentPrinciple>, ExtractError> {
    let Some(heading) = PRINCIPLES_HEADING_RE.find(text) else {
        return Ok(Vec::new());
    };
    let Some(facts) = FACTS_RE.find_at(text, heading.end()) else {
        return Ok(Vec::new());
    };
    let section = &text[heading.end()..facts.start()];

    let mut principles = Vec::new();
    for item in split_numbered(section, &PRINCIPLE_MARKER_RE) {
        if item.body.is_empty() {
            continue;
        }
        principles.push(JudgmentPrinciple {
            number: parse_number("principle", item.number)?,
            text: item.body.to_string(),
        });
    }
    Ok(principles)
}

/// Facts and reasoning spans. Empty spans are treated as missing.
pub fn extract_facts_and_reasoning(text: &str) -> (Option<String>, Option<String>) {
    let mut sections = split_sections(text, &SECTION_MARKERS);
    let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
    (non_empty(sections.remove("facts")), non_empty(sections.remove("reasoning")))
}

/// The operative part: from the first "لما تقدم" / "ولما تقدم" to the end, phrase included.
pub fn extract_ruling(text: &str) -> Option<String> {
    let start = RULING_RE.find(text)?.start();
    let ruling = text[start..].trim();
    (!ruling.is_empty()).then(|| ruling.to_string())
}
