// src/documents/mod.rs
pub mod assembler;
pub mod models;
pub mod reader;

pub use assembler::{assemble_fatwa, assemble_judgment, assemble_law, Assembly, RejectReason};
pub use models::{DocumentKind, LegalDocument, NaturalKey};
pub use reader::extract_raw_text;
