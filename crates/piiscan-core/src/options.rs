//! Scan options and batch statistics.
use std::time::Duration;

/// Recommended per-document input cap (bytes).
pub const DEFAULT_MAX_INPUT_SIZE: usize = 10 * 1024 * 1024; // 10 MiB

/// Knobs for a single scan or a batch run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Hard cap on document/text byte size; larger inputs are rejected
    /// before any pattern work happens. `None` disables the cap.
    pub max_input_size: Option<usize>,
    /// Wall-clock budget per scan; an overrunning scan fails with
    /// `ScanError::Timeout` and produces no partial findings.
    pub timeout: Option<Duration>,
    /// Worker threads for batch scans; `None` means one per CPU core.
    pub threads: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_input_size: Some(DEFAULT_MAX_INPUT_SIZE),
            timeout: Some(Duration::from_secs(10)),
            threads: None,
        }
    }
}

/// Batch counters for CLI reporting.
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_failed: usize,
    pub total_matches: usize,
}
