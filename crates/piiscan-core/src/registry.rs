//! Detector registry: descriptors compiled once at startup, read-only for
//! the process lifetime, shared by all concurrent scans without locking.
use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::warn;

use crate::patterns::{DescriptorSource, DetectorDescriptor};
use crate::sources::sources_from_dir;

/// Registry load failures. `DuplicateId` and `InvalidPattern` are recorded
/// as warnings on the registry (the offending descriptor is dropped); load
/// as a whole fails only when no usable descriptor remains.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate detector id `{id}`")]
    DuplicateId { id: String },
    #[error("invalid pattern for detector `{id}`: {reason}")]
    InvalidPattern { id: String, reason: String },
    #[error("no usable detector descriptors were loaded")]
    Empty,
    #[error("failed to read descriptor directory: {0}")]
    Io(#[from] std::io::Error),
}

/// One compiled detector: descriptor metadata plus its case-insensitive
/// expression.
#[derive(Debug)]
pub struct Detector {
    pub descriptor: DetectorDescriptor,
    pub(crate) regex: Regex,
}

/// Immutable detector lookup, iterated in load order.
#[derive(Debug)]
pub struct Registry {
    detectors: Vec<Detector>,
    warnings: Vec<RegistryError>,
}

impl Registry {
    /// Build a registry from descriptor sources. Duplicate ids and patterns
    /// that fail to compile are skipped with a warning; ids never silently
    /// shadow one another.
    pub fn load(
        sources: impl IntoIterator<Item = DescriptorSource>,
    ) -> Result<Self, RegistryError> {
        let mut detectors: Vec<Detector> = Vec::new();
        let mut warnings: Vec<RegistryError> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for source in sources {
            for descriptor in source.into_descriptors() {
                if !seen.insert(descriptor.id.clone()) {
                    warn!(id = %descriptor.id, "duplicate detector id, dropping descriptor");
                    warnings.push(RegistryError::DuplicateId { id: descriptor.id });
                    continue;
                }
                match RegexBuilder::new(&descriptor.pattern)
                    .case_insensitive(true)
                    .build()
                {
                    Ok(regex) => detectors.push(Detector { descriptor, regex }),
                    Err(err) => {
                        warn!(id = %descriptor.id, error = %err, "invalid detector pattern, dropping descriptor");
                        warnings.push(RegistryError::InvalidPattern {
                            id: descriptor.id,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        if detectors.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self {
            detectors,
            warnings,
        })
    }

    /// The built-in detector set.
    pub fn builtin() -> Self {
        Self::load(crate::patterns::builtin_sources()).expect("built-in descriptors are valid")
    }

    /// Built-in detectors plus every `*.toml` descriptor file under `dir`,
    /// read once at startup.
    pub fn builtin_with_dir(dir: &Path) -> Result<Self, RegistryError> {
        let mut sources = crate::patterns::builtin_sources();
        sources.extend(sources_from_dir(dir)?);
        Self::load(sources)
    }

    /// Detectors in load order.
    pub fn detectors(&self) -> impl Iterator<Item = &Detector> {
        self.detectors.iter()
    }

    /// Look up a detector by id.
    pub fn get(&self, id: &str) -> Option<&Detector> {
        self.detectors.iter().find(|d| d.descriptor.id == id)
    }

    /// Warnings recorded while loading (dropped descriptors).
    pub fn warnings(&self) -> &[RegistryError] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}
