// src/documents/reader.rs
use crate::utils::error::ReaderError;
use roxmltree::{Document, Node};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";
const BYTE_ORDER_MARK: char = '\u{FEFF}';
const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Extensions the reader knows how to turn into text.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["docx", "txt"];

/// Reads a document file and returns its raw text.
///
/// `.docx` files yield one paragraph per block separated by a blank line; `.txt` files
/// are read as UTF-8. No normalization happens here.
pub fn extract_raw_text(path: &Path) -> Result<String, ReaderError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("docx") => read_docx(path),
        Some("txt") => {
            let text = fs::read_to_string(path)?;
            Ok(text.strip_prefix(BYTE_ORDER_MARK).map(str::to_string).unwrap_or(text))
        }
        _ => Err(ReaderError::UnsupportedFormat(path.display().to_string())),
    }
}

fn read_docx(path: &Path) -> Result<String, ReaderError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut xml = String::new();
    {
        let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => {
                ReaderError::MissingPart(DOCUMENT_PART.to_string())
            }
            other => ReaderError::Zip(other),
        })?;
        part.read_to_string(&mut xml)?;
    }

    tracing::debug!("Read {} bytes of document XML from {}", xml.len(), path.display());
    document_xml_to_text(&xml)
}

/// Flattens WordprocessingML body XML into plain text.
///
/// Text runs (`w:t`) are concatenated, `w:tab` becomes a tab and `w:br`/`w:cr` a line
/// break. Paragraphs nested in text boxes are emitted on their own, not merged into the
/// enclosing paragraph.
pub fn document_xml_to_text(xml: &str) -> Result<String, ReaderError> {
    let doc = Document::parse(xml)?;

    let paragraphs: Vec<String> = doc
        .descendants()
        .filter(|n| is_word(n, "p"))
        .map(paragraph_text)
        .collect();

    Ok(paragraphs.join("\n\n"))
}

fn paragraph_text(para: Node) -> String {
    let mut line = String::new();

    for node in para.descendants().filter(|n| n.is_element()) {
        let owner = node.ancestors().find(|a| is_word(a, "p"));
        if owner != Some(para) {
            continue;
        }
        match node.tag_name().name() {
            "t" if is_word(&node, "t") => line.push_str(node.text().unwrap_or_default()),
            "tab" if is_word(&node, "tab") => line.push('\t'),
            "br" | "cr" if node.tag_name().namespace() == Some(WORD_NS) => line.push('\n'),
            _ => {}
        }
    }

    line
}

fn is_word(node: &Node, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace() == Some(WORD_NS)
}
