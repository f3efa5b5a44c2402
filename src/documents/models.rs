// src/documents/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Court name used when a judgment's first line does not name one.
pub const UNSPECIFIED_COURT: &str = "غير محدد";

/// The three document families the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Fatwa,
    Law,
    Judgment,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] =
        [DocumentKind::Fatwa, DocumentKind::Law, DocumentKind::Judgment];

    /// Directory name used both for sample input and for store output.
    pub fn dir_name(&self) -> &'static str {
        match self {
            DocumentKind::Fatwa => "fatwas",
            DocumentKind::Law => "laws",
            DocumentKind::Judgment => "judgments",
        }
    }

    /// What the store does when a record with the same natural key already exists.
    pub fn on_conflict(&self) -> ConflictPolicy {
        match self {
            DocumentKind::Fatwa | DocumentKind::Law => ConflictPolicy::KeepExisting,
            DocumentKind::Judgment => ConflictPolicy::Replace,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Fatwa => "fatwa",
            DocumentKind::Law => "law",
            DocumentKind::Judgment => "judgment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    KeepExisting,
    Replace,
}

/// Natural de-duplication key shared by all three families: (number, year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub number: u32,
    pub year: u32,
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number, self.year)
    }
}

/// A typed record produced by one of the assemblers.
pub trait LegalDocument: Serialize {
    const KIND: DocumentKind;

    /// The key the store de-duplicates on, or `None` when the record has no usable identity.
    fn natural_key(&self) -> Option<NaturalKey>;

    fn full_text(&self) -> &str;
}

// --- Fatwa ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatwaHeader {
    pub issuing_authority: String,
    pub number: u32,
    pub year: u32,
    pub file_number: Option<String>,
    pub issue_date: Option<String>,   // YYYY-MM-DD
    pub session_date: Option<String>, // YYYY-MM-DD
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principle {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fatwa {
    /// `None` when the header line could not be parsed.
    pub header: Option<FatwaHeader>,
    pub entity: Option<String>,
    pub principles: Vec<Principle>,
    pub facts: Option<String>,
    pub application: Option<String>,
    pub opinion: Option<String>,
    pub full_text: String,
}

impl LegalDocument for Fatwa {
    const KIND: DocumentKind = DocumentKind::Fatwa;

    fn natural_key(&self) -> Option<NaturalKey> {
        self.header.as_ref().map(|h| NaturalKey { number: h.number, year: h.year })
    }

    fn full_text(&self) -> &str {
        &self.full_text
    }
}

// --- Law ---

/// Law header. Number and year are both required; without them there is no header at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawHeader {
    pub issuing_authority: Option<String>,
    pub law_number: u32,
    pub law_year: u32,
    pub title: Option<String>,
    pub gazette_ref: Option<String>,
    pub president_name: Option<String>,
    pub issue_date: Option<String>,
    pub publish_date: Option<String>,
    pub effective_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawArticle {
    /// Verbatim article label, e.g. "3" or "3 مكرر".
    pub number: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Law {
    pub header: Option<LawHeader>,
    /// Text before the first article; empty when there is no article marker.
    pub preamble: String,
    pub articles: Vec<LawArticle>,
    pub full_text: String,
}

impl LegalDocument for Law {
    const KIND: DocumentKind = DocumentKind::Law;

    fn natural_key(&self) -> Option<NaturalKey> {
        self.header.as_ref().map(|h| NaturalKey { number: h.law_number, year: h.law_year })
    }

    fn full_text(&self) -> &str {
        &self.full_text
    }
}

// --- Judgment ---

/// Judgment header, composed field by field.
///
/// `case_number` and `case_year` fall back to `0` when no case pattern matched; a `0`
/// in either is a "missing" sentinel, not a real value. Use [`JudgmentHeader::case_identity`]
/// for the typed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentHeader {
    pub issuing_authority: Option<String>,
    pub court_name: String,
    pub case_type: Option<String>,
    pub case_number: u32,
    pub case_year: u32,
    pub session_date: Option<String>,
    pub technical_office: Option<u32>,
    pub volume_number: Option<u32>,
    pub page_number: Option<u32>,
    pub rule_number: Option<u32>,
    pub reference_number: Option<String>,
}

impl Default for JudgmentHeader {
    fn default() -> Self {
        Self {
            issuing_authority: None,
            court_name: UNSPECIFIED_COURT.to_string(),
            case_type: None,
            case_number: 0,
            case_year: 0,
            session_date: None,
            technical_office: None,
            volume_number: None,
            page_number: None,
            rule_number: None,
            reference_number: None,
        }
    }
}

impl JudgmentHeader {
    /// `(case_number, case_year)` when both were actually found.
    pub fn case_identity(&self) -> Option<(u32, u32)> {
        if self.case_number == 0 || self.case_year == 0 {
            None
        } else {
            Some((self.case_number, self.case_year))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentPrinciple {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub header: JudgmentHeader,
    pub panel: Option<String>,
    pub principles: Vec<JudgmentPrinciple>,
    pub facts: Option<String>,
    pub reasoning: Option<String>,
    pub ruling: Option<String>,
    pub full_text: String,
}

impl LegalDocument for Judgment {
    const KIND: DocumentKind = DocumentKind::Judgment;

    fn natural_key(&self) -> Option<NaturalKey> {
        self.header
            .case_identity()
            .map(|(number, year)| NaturalKey { number, year })
    }

    fn full_text(&self) -> &str {
        &self.full_text
    }
}
