// src/lib.rs

//! Extraction engine for Arabic legal documents (fatwas, laws, judgments).
//!
//! The engine (`extractors`, `documents::assembler`) turns one document's text into a
//! typed record without doing any I/O. `documents::reader`, `storage` and `batch` are
//! the collaborators the command-line driver wires around it.

pub mod batch;
pub mod documents;
pub mod extractors;
pub mod storage;
pub mod utils;
