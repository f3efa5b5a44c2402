// src/utils/error.rs
use thiserror::Error;

/// Faults raised by the extraction engine.
///
/// A pattern that does not match is never an error; only a capture the engine
/// cannot interpret ends up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Captured value for '{field}' is not a valid number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid .docx container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid document XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Document part not found: {0}")]
    MissingPart(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Record has no usable natural key: {0}")]
    MissingKey(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Reading document failed: {0}")]
    Reader(#[from] ReaderError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
