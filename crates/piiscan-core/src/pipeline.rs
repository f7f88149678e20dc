//! Document pipeline: declared format and raw bytes in, findings out.
//!
//! Thin coordination only: size cap, extraction, emptiness check, then the
//! detection engine. Holds no state and performs no pattern work itself.
use thiserror::Error;

use crate::engine;
use crate::extract::{self, DocumentFormat, ExtractionError};
use crate::findings::Findings;
use crate::options::ScanOptions;
use crate::registry::Registry;

/// Failures scoped to a single scanned document; none of them abort a batch
/// or the process.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// Extraction succeeded but produced no usable text. Distinct from a
    /// clean scan that found no PII in real text.
    #[error("document contains no extractable text")]
    EmptyText,
    #[error("input size {size} exceeds the {cap}-byte scan cap")]
    InputTooLarge { size: usize, cap: usize },
    #[error("scan exceeded its time budget")]
    Timeout,
}

/// Extract text from `bytes` per the declared format and scan it against
/// `registry`.
pub fn scan_document(
    bytes: &[u8],
    format: DocumentFormat,
    registry: &Registry,
    options: &ScanOptions,
) -> Result<Findings, ScanError> {
    if let Some(cap) = options.max_input_size {
        if bytes.len() > cap {
            return Err(ScanError::InputTooLarge {
                size: bytes.len(),
                cap,
            });
        }
    }
    let text = extract::extract(bytes, format)?;
    if text.trim().is_empty() {
        return Err(ScanError::EmptyText);
    }
    engine::detect_bounded(&text, registry, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_document_end_to_end() {
        let registry = Registry::builtin();
        let findings = scan_document(
            b"reach me at a@b.com",
            DocumentFormat::Plain,
            &registry,
            &ScanOptions::default(),
        )
        .unwrap();
        assert!(findings.has_pii);
        assert_eq!(findings.categories["email"].matches[0].value, "a@b.com");
    }

    #[test]
    fn whitespace_only_text_is_empty_not_clean() {
        let registry = Registry::builtin();
        let err = scan_document(
            b"  \n\t  ",
            DocumentFormat::Plain,
            &registry,
            &ScanOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::EmptyText));
    }

    #[test]
    fn clean_text_reports_no_pii_rather_than_empty() {
        let registry = Registry::builtin();
        let findings = scan_document(
            b"nothing sensitive here",
            DocumentFormat::Plain,
            &registry,
            &ScanOptions::default(),
        )
        .unwrap();
        assert!(!findings.has_pii);
        assert_eq!(findings.total_matches, 0);
    }

    #[test]
    fn oversized_document_is_rejected_before_extraction() {
        let registry = Registry::builtin();
        let options = ScanOptions {
            max_input_size: Some(4),
            ..ScanOptions::default()
        };
        let err = scan_document(b"a@b.com", DocumentFormat::Plain, &registry, &options)
            .unwrap_err();
        assert!(matches!(err, ScanError::InputTooLarge { size: 7, cap: 4 }));
    }

    #[test]
    fn extraction_failure_propagates_as_typed_error() {
        let registry = Registry::builtin();
        let err = scan_document(
            b"garbage",
            DocumentFormat::Paragraph,
            &registry,
            &ScanOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScanError::Extraction(ExtractionError::ParseFailure { .. })
        ));
    }
}
