//! Descriptor file loading (TOML), performed once at startup.
//!
//! A file declares either a single `[descriptor]` table or a `[[descriptors]]`
//! collection, matching the two shapes a source may take. Bad files are
//! skipped with a warning; they never abort the load.
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::patterns::{DescriptorSource, DetectorDescriptor};

/// One descriptor entry as written in a TOML file. Accepts either a
/// `pattern` or a `regex` key for the expression.
#[derive(Debug, Clone, Deserialize)]
struct DescriptorEntry {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    regex: Option<String>,
}

/// Top-level descriptor file shape.
#[derive(Debug, Deserialize)]
struct DescriptorFile {
    #[serde(default)]
    descriptor: Option<DescriptorEntry>,
    #[serde(default)]
    descriptors: Vec<DescriptorEntry>,
}

impl DescriptorEntry {
    fn normalize(self) -> Option<DetectorDescriptor> {
        let pattern = match (self.pattern, self.regex) {
            (Some(p), _) => p,
            (None, Some(r)) => r,
            (None, None) => {
                warn!(id = %self.id, "descriptor declares neither `pattern` nor `regex`, skipping");
                return None;
            }
        };
        Some(DetectorDescriptor {
            id: self.id,
            name: self.name,
            description: self.description,
            pattern,
        })
    }
}

/// Read every `*.toml` descriptor file under `dir`, in file-name order so
/// the resulting registry order is reproducible.
pub fn sources_from_dir(dir: &Path) -> std::io::Result<Vec<DescriptorSource>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut out = Vec::new();
    for path in paths {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable descriptor file");
                continue;
            }
        };
        let parsed: DescriptorFile = match toml::from_str(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping malformed descriptor file");
                continue;
            }
        };
        if let Some(single) = parsed.descriptor.and_then(DescriptorEntry::normalize) {
            out.push(DescriptorSource::Single(single));
        }
        let many: Vec<_> = parsed
            .descriptors
            .into_iter()
            .filter_map(DescriptorEntry::normalize)
            .collect();
        if !many.is_empty() {
            out.push(DescriptorSource::Collection(many));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_single_and_collection_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("10_email.toml"),
            r#"
[descriptor]
id = "email"
name = "Email Address"
description = "Email addresses"
pattern = '[a-z]+@[a-z]+\.[a-z]{2,}'
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("20_national_id.toml"),
            r#"
[[descriptors]]
id = "ssn"
name = "Social Security Number"
regex = '\d{3}-\d{2}-\d{4}'

[[descriptors]]
id = "personnummer"
name = "Swedish Personal Number"
pattern = '\d{6}-\d{4}'
"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a descriptor").unwrap();

        let sources = sources_from_dir(dir.path()).unwrap();
        assert_eq!(sources.len(), 2);
        assert!(matches!(&sources[0], DescriptorSource::Single(d) if d.id == "email"));
        match &sources[1] {
            DescriptorSource::Collection(list) => {
                assert_eq!(list.len(), 2);
                // `regex` is accepted as an alias for `pattern`.
                assert_eq!(list[0].pattern, r"\d{3}-\d{2}-\d{4}");
            }
            other => panic!("expected collection, got {other:?}"),
        }
    }

    #[test]
    fn malformed_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.toml"), "this is [not toml").unwrap();
        fs::write(
            dir.path().join("good.toml"),
            r#"
[descriptor]
id = "zip"
name = "Zip Code"
pattern = '\d{5}'
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("incomplete.toml"),
            r#"
[descriptor]
id = "nothing"
name = "No Expression"
"#,
        )
        .unwrap();

        let sources = sources_from_dir(dir.path()).unwrap();
        assert_eq!(sources.len(), 1);
        assert!(matches!(&sources[0], DescriptorSource::Single(d) if d.id == "zip"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(sources_from_dir(Path::new("/nonexistent/descriptors")).is_err());
    }
}
