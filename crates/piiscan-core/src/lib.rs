//! Document PII scanning core.
//!
//! Pipeline: raw bytes plus a declared format become text (`extract`), text
//! is scanned against an immutable detector registry (`detect`), and the
//! result is a position-ordered findings report. The registry is built once
//! at startup and shared read-only by all concurrent scans; extraction and
//! detection are stateless pure functions, so independent documents scan
//! fully in parallel (`scan_and_write`).

mod engine;
mod extract;
mod findings;
mod options;
mod patterns;
mod pipeline;
mod registry;
mod scan;
mod sources;

pub use engine::{detect, detect_bounded};
pub use extract::{extract, DocumentFormat, ExtractionError};
pub use findings::{CategorySummary, Findings, GlobalMatchRecord, Match};
pub use options::{ScanOptions, ScanStats, DEFAULT_MAX_INPUT_SIZE};
pub use patterns::{builtin_sources, DescriptorSource, DetectorDescriptor};
pub use pipeline::{scan_document, ScanError};
pub use registry::{Detector, Registry, RegistryError};
pub use scan::{scan_and_write, DocumentReport};
pub use sources::sources_from_dir;
