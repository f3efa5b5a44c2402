// src/documents/assembler.rs

//! Per-type composition of the extraction rules into a typed record.
//!
//! Every document goes through the same stages exactly once:
//! raw text -> normalized -> header attempted -> assembled | rejected.
//! Nothing here logs or touches storage; the caller decides what to do with the result.

use crate::documents::models::{Fatwa, Judgment, Law};
use crate::extractors::normalizer::normalize;
use crate::extractors::sections::split_sections;
use crate::extractors::{fatwa, judgment, law};
use crate::utils::error::ExtractError;
use std::fmt;

/// Why an assembled record is not usable as a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The mandatory header could not be parsed.
    MissingHeader,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingHeader => f.write_str("Missing header"),
        }
    }
}

/// Outcome of assembling one document.
///
/// A rejected document still carries the partial record (with a null header) so the
/// caller can inspect or report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly<T> {
    Assembled(T),
    Rejected { reason: RejectReason, record: T },
}

impl<T> Assembly<T> {
    pub fn is_assembled(&self) -> bool {
        matches!(self, Assembly::Assembled(_))
    }

    pub fn record(&self) -> &T {
        match self {
            Assembly::Assembled(record) | Assembly::Rejected { record, .. } => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            Assembly::Assembled(record) | Assembly::Rejected { record, .. } => record,
        }
    }
}

/// Builds a fatwa record. Rejected when the header line does not match its template.
pub fn assemble_fatwa(raw: &str) -> Result<Assembly<Fatwa>, ExtractError> {
    let text = normalize(raw);

    let header = fatwa::extract_header(&text)?;
    let entity = fatwa::extract_entity(&text);
    let principles = fatwa::extract_principles(fatwa::principles_region(&text))?;

    let mut sections = split_sections(&text, &fatwa::SECTION_MARKERS);
    let mut section = |key: &str| sections.remove(key).filter(|body| !body.is_empty());
    let facts = section("facts");
    let application = section("application");
    let opinion = section("opinion");

    let record = Fatwa {
        header,
        entity,
        principles,
        facts,
        application,
        opinion,
        full_text: text,
    };

    Ok(if record.header.is_some() {
        Assembly::Assembled(record)
    } else {
        Assembly::Rejected { reason: RejectReason::MissingHeader, record }
    })
}

/// Builds a law record. Rejected when the law number and year are not both present.
pub fn assemble_law(raw: &str) -> Result<Assembly<Law>, ExtractError> {
    let text = normalize(raw);

    let header = law::extract_header(&text)?;
    let articles = law::extract_articles(&text);
    let preamble = law::extract_preamble(&text);

    let record = Law {
        header,
        preamble,
        articles,
        full_text: text,
    };

    Ok(if record.header.is_some() {
        Assembly::Assembled(record)
    } else {
        Assembly::Rejected { reason: RejectReason::MissingHeader, record }
    })
}

/// Builds a judgment record.
///
/// Never rejected: the header always exists, possibly with every field defaulted. A
/// caller that needs a case identity has to check
/// [`JudgmentHeader::case_identity`](crate::documents::models::JudgmentHeader::case_identity).
pub fn assemble_judgment(raw: &str) -> Result<Assembly<Judgment>, ExtractError> {
    let text = normalize(raw);

    let header = judgment::extract_header(&text)?;
    let panel = judgment::extract_panel(&text);
    let principles = judgment::extract_principles(&text)?;
    let (facts, reasoning) = judgment::extract_facts_and_reasoning(&text);
    let ruling = judgment::extract_ruling(&text);

    Ok(Assembly::Assembled(Judgment {
        header,
        panel,
        principles,
        facts,
        reasoning,
        ruling,
        full_text: text,
    }))
}
