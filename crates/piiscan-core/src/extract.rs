//! Format-specific text extraction.
//!
//! Pure bytes-to-text transforms; the caller owns the byte buffer and any
//! file lifecycle around it. Three adapters: plain text (lenient UTF-8),
//! paged documents (PDF via `lopdf`), and paragraph documents (OOXML
//! wordprocessing packages via `zip` + `quick-xml`).
use std::io::Read;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Document formats accepted at the pipeline boundary. Anything else is
/// rejected before extraction is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Plain,
    Paged,
    Paragraph,
}

/// Extraction failures, scoped to a single document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document format `{0}`")]
    UnsupportedFormat(String),
    #[error("failed to parse document: {cause}")]
    ParseFailure { cause: String },
}

impl DocumentFormat {
    /// Map a file extension to a format.
    pub fn from_extension(ext: &str) -> Result<Self, ExtractionError> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "text" | "md" | "log" => Ok(Self::Plain),
            "pdf" => Ok(Self::Paged),
            "docx" | "doc" => Ok(Self::Paragraph),
            other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Paged => "paged",
            Self::Paragraph => "paragraph",
        }
    }
}

fn parse_failure(cause: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::ParseFailure {
        cause: cause.to_string(),
    }
}

/// Convert a document's raw bytes into a single text string.
pub fn extract(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractionError> {
    match format {
        // Lenient decode: undecodable sequences are substituted, never fatal.
        DocumentFormat::Plain => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DocumentFormat::Paged => extract_paged(bytes),
        DocumentFormat::Paragraph => extract_paragraph(bytes),
    }
}

/// Paged documents: one text block per page in page order, joined by
/// newlines. A page that yields no text contributes an empty string; a bad
/// page never aborts the whole extraction.
fn extract_paged(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|err| parse_failure(format!("unreadable paged document: {err}")))?;
    let pages: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|&number| doc.extract_text(&[number]).unwrap_or_default())
        .collect();
    Ok(pages.join("\n"))
}

/// Paragraph documents: `<w:t>` runs concatenated per `<w:p>` paragraph,
/// paragraphs joined by newlines.
fn extract_paragraph(bytes: &[u8]) -> Result<String, ExtractionError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|err| parse_failure(format!("unreadable document package: {err}")))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|err| parse_failure(format!("document body missing from package: {err}")))?
        .read_to_string(&mut xml)
        .map_err(|err| parse_failure(format!("unreadable document body: {err}")))?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let piece = t
                    .unescape()
                    .map_err(|err| parse_failure(format!("malformed document body: {err}")))?;
                current.push_str(&piece);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(parse_failure(format!("malformed document body: {err}"))),
        }
    }
    // Text outside any closed paragraph still counts.
    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}
