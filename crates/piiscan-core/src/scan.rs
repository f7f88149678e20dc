//! Batch scanning and parallel scheduling.
//!
//! Documents are independent, so they extract and scan fully in parallel;
//! the registry is shared read-only across workers. Output order is
//! reproducible: files are sorted by name up front and a single writer
//! re-serializes worker results back into input order.
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::extract::DocumentFormat;
use crate::findings::Findings;
use crate::options::{ScanOptions, ScanStats};
use crate::pipeline;
use crate::registry::Registry;

/// One document's entry in the batch report. Exactly one of `findings` and
/// `error` is present.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<Findings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Scan a document file, or a directory of documents (depth 1), and stream
/// one JSON report per document into `out` as a JSON array.
///
/// Per-document failures (unsupported format, parse failure, empty text,
/// timeout) are recorded in that document's report entry; they never abort
/// the batch.
pub fn scan_and_write(
    input: &Path,
    out: &mut dyn Write,
    registry: &Registry,
    options: &ScanOptions,
) -> io::Result<ScanStats> {
    let files = collect_files(input);
    debug!(files = files.len(), "collected batch inputs");

    let threads = options.threads.unwrap_or_else(num_cpus::get);
    let mut stats = ScanStats::default();

    if threads > 1 && files.len() > 1 {
        scan_parallel(&files, out, registry, options, &mut stats, threads)?;
        return Ok(stats);
    }

    write!(out, "[")?;
    let mut first = true;
    for path in &files {
        let report = scan_path(path, registry, options);
        record(&mut stats, &report);
        if !first {
            write!(out, ",")?;
        }
        first = false;
        serde_json::to_writer(&mut *out, &report)?;
    }
    write!(out, "]")?;
    Ok(stats)
}

/// Files to scan, sorted by name so output order is reproducible.
fn collect_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

/// Workers scan on a rayon pool and send `(index, report)` to the single
/// writer, which re-orders by index and streams JSON.
fn scan_parallel(
    files: &[PathBuf],
    out: &mut dyn Write,
    registry: &Registry,
    options: &ScanOptions,
    stats: &mut ScanStats,
    threads: usize,
) -> io::Result<()> {
    write!(out, "[")?;
    let mut first = true;

    let (tx, rx) = crossbeam_channel::bounded::<(usize, DocumentReport)>(256);

    std::thread::scope(|scope| -> io::Result<()> {
        scope.spawn(move || {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .expect("build rayon pool");
            pool.install(|| {
                files.par_iter().enumerate().for_each(|(idx, path)| {
                    let report = scan_path(path, registry, options);
                    let _ = tx.send((idx, report));
                });
            });
            // tx drops here, closing the channel for the writer below.
        });

        // Owned here so an early writer error drops the receiver and
        // unblocks any worker waiting on the bounded channel.
        let rx = rx;
        let mut next_idx = 0usize;
        let mut buffer: BTreeMap<usize, DocumentReport> = BTreeMap::new();
        while let Ok((idx, report)) = rx.recv() {
            buffer.insert(idx, report);
            while let Some(report) = buffer.remove(&next_idx) {
                record(stats, &report);
                if !first {
                    write!(out, ",")?;
                }
                first = false;
                serde_json::to_writer(&mut *out, &report)?;
                next_idx += 1;
            }
        }
        Ok(())
    })?;

    write!(out, "]")?;
    Ok(())
}

/// Scan one file: format from extension, bytes from disk, then the document
/// pipeline. Every failure ends up in the report, not in a panic or an
/// early return.
fn scan_path(path: &Path, registry: &Registry, options: &ScanOptions) -> DocumentReport {
    let file = path.display().to_string();
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let format = match DocumentFormat::from_extension(ext) {
        Ok(format) => format,
        Err(err) => {
            return DocumentReport {
                file,
                format: None,
                findings: None,
                error: Some(err.to_string()),
            }
        }
    };
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            return DocumentReport {
                file,
                format: Some(format.as_str()),
                findings: None,
                error: Some(format!("failed to read file: {err}")),
            }
        }
    };
    match pipeline::scan_document(&bytes, format, registry, options) {
        Ok(findings) => DocumentReport {
            file,
            format: Some(format.as_str()),
            findings: Some(findings),
            error: None,
        },
        Err(err) => DocumentReport {
            file,
            format: Some(format.as_str()),
            findings: None,
            error: Some(err.to_string()),
        },
    }
}

fn record(stats: &mut ScanStats, report: &DocumentReport) {
    match &report.findings {
        Some(findings) => {
            stats.files_scanned += 1;
            stats.total_matches += findings.total_matches;
        }
        None => stats.files_failed += 1,
    }
}
