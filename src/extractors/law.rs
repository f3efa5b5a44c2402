// src/extractors/law.rs

//! Pattern rules for laws: header, preamble and numbered articles.

use crate::documents::models::{LawArticle, LawHeader};
use crate::extractors::normalizer::{parse_date_field, parse_number, DATE_TOKEN};
use crate::extractors::sections::split_numbered;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

const EGYPT_AUTHORITY: &str = "جمهورية مصر العربية";

// Required: "قانون رقم <N> لسنة <YYYY>"
static LAW_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"قانون\s+رقم\s+(\d+)\s+لسنة\s+(\d{4})").expect("Failed to compile LAW_NUMBER_RE")
});

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"بشأن\s+([^\n]+)").expect("Failed to compile TITLE_RE")
});

// Trailing gazette reference sometimes shares the title line.
static TITLE_GAZETTE_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"الجريدة\s+الرسمية.*$").expect("Failed to compile TITLE_GAZETTE_TAIL_RE")
});

static GAZETTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(الجريدة\s+الرسمية[^\n]+)").expect("Failed to compile GAZETTE_RE")
});

// "توقيع : عبد الفتاح السيسي - رئيس الجمهورية" -> name only
static PRESIDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"توقيع\s*[:\-]?\s*([^\n\-]+)").expect("Failed to compile PRESIDENT_RE")
});

static ISSUE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"الصادر\s+بتاريخ\s+({})", DATE_TOKEN))
        .expect("Failed to compile ISSUE_DATE_RE")
});

static PUBLISH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"نشر\s+بتاريخ\s+({})", DATE_TOKEN))
        .expect("Failed to compile PUBLISH_DATE_RE")
});

static EFFECTIVE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"يعمل\s+به\s+(?:اعتبارا|إعتبارا|اعتباراً|إعتباراً)\s+من\s+({})",
        DATE_TOKEN
    ))
    .expect("Failed to compile EFFECTIVE_DATE_RE")
});

// "المادة 3" or "المادة 3 مكرر" at the start of a line.
pub(crate) static ARTICLE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*المادة[ \t]+(\d+(?:[ \t]+مكرر)?)")
        .expect("Failed to compile ARTICLE_MARKER_RE")
});

/// Parses the law header.
///
/// Law number and year are required: when they are missing nothing else is read,
/// even if other header fields are present.
pub fn extract_header(text: &str) -> Result<Option<LawHeader>, ExtractError> {
    let Some(caps) = LAW_NUMBER_RE.captures(text) else {
        return Ok(None);
    };

    let law_number = parse_number("law_number", &caps[1])?;
    let law_year = parse_number("law_year", &caps[2])?;

    Ok(Some(LawHeader {
        issuing_authority: text.contains(EGYPT_AUTHORITY).then(|| EGYPT_AUTHORITY.to_string()),
        law_number,
        law_year,
        title: extract_title(text),
        gazette_ref: GAZETTE_RE.captures(text).map(|c| c[1].trim().to_string()),
        president_name: PRESIDENT_RE
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .filter(|name| !name.is_empty()),
        issue_date: find_date(&ISSUE_DATE_RE, text),
        publish_date: find_date(&PUBLISH_DATE_RE, text),
        effective_date: find_date(&EFFECTIVE_DATE_RE, text),
    }))
}

fn extract_title(text: &str) -> Option<String> {
    let caps = TITLE_RE.captures(text)?;
    let title = TITLE_GAZETTE_TAIL_RE.replace(&caps[1], "");
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn find_date(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).and_then(|c| parse_date_field(&c[1]))
}

/// All articles in document order. Labels are kept verbatim.
pub fn extract_articles(text: &str) -> Vec<LawArticle> {
    split_numbered(text, &ARTICLE_MARKER_RE)
        .into_iter()
        .map(|item| LawArticle {
            number: item.number.to_string(),
            text: item.body.to_string(),
        })
        .collect()
}

/// Everything before the first article marker, trimmed. Empty when there is no article.
pub fn extract_preamble(text: &str) -> String {
    match ARTICLE_MARKER_RE.find(text) {
        Some(first) => text[..first.start()].trim().to_string(),
        None => String::new(),
    }
}
