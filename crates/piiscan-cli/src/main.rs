use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use piiscan_core::{
    builtin_sources, scan_and_write, sources_from_dir, Registry, ScanOptions,
    DEFAULT_MAX_INPUT_SIZE,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "piiscan", version, about = "Scan documents for personally identifiable information")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a document file or a directory of documents
    Scan {
        /// Input file or directory
        #[arg(long)]
        input: PathBuf,

        /// Output file (JSON array of per-document reports); stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,

        /// Directory of additional TOML detector descriptors
        #[arg(long)]
        detectors: Option<PathBuf>,

        /// Worker threads ("auto" = CPU core count)
        #[arg(long, default_value = "auto")]
        threads: String,

        /// Per-document size cap in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_INPUT_SIZE)]
        max_input_size: usize,

        /// Per-document scan budget in milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            input,
            output,
            detectors,
            threads,
            max_input_size,
            timeout_ms,
        } => {
            let mut sources = builtin_sources();
            if let Some(dir) = &detectors {
                sources.extend(
                    sources_from_dir(dir).context("read detector descriptor directory")?,
                );
            }
            let registry = Registry::load(sources).context("load detector registry")?;
            for warning in registry.warnings() {
                warn!(%warning, "descriptor dropped during registry load");
            }
            info!(detectors = registry.len(), ?input, "starting scan");

            let options = ScanOptions {
                max_input_size: Some(max_input_size),
                timeout: Some(Duration::from_millis(timeout_ms)),
                threads: parse_threads(&threads),
            };

            let stats = match &output {
                Some(path) => {
                    let mut out =
                        BufWriter::new(File::create(path).context("create output file")?);
                    let stats = scan_and_write(&input, &mut out, &registry, &options)
                        .context("scan failed")?;
                    out.flush().context("flush output file")?;
                    stats
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut out = stdout.lock();
                    let stats = scan_and_write(&input, &mut out, &registry, &options)
                        .context("scan failed")?;
                    writeln!(out).ok();
                    stats
                }
            };

            info!(
                files_scanned = stats.files_scanned,
                files_failed = stats.files_failed,
                total_matches = stats.total_matches,
                "scan finished"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // RUST_LOG controls the level, e.g. RUST_LOG=debug.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// "auto" or a concrete thread count; anything else falls back to auto.
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
