//! Detection engine: pure, deterministic scan of text against a registry.
//!
//! Every detector runs a case-insensitive, leftmost-first, non-overlapping
//! scan over the whole text. Matches from one detector never overlap each
//! other; matches from different detectors may cover the same span and are
//! all kept. The `regex` crate's finite-automaton engine gives a linear-time
//! guarantee, so a hostile document cannot trigger catastrophic backtracking.
use std::collections::BTreeMap;
use std::time::Instant;

use crate::findings::{sort_matches_stable, CategorySummary, Findings, GlobalMatchRecord, Match};
use crate::options::ScanOptions;
use crate::pipeline::ScanError;
use crate::registry::Registry;

/// Context window radius around a match, in bytes, clipped to text bounds.
const CONTEXT_RADIUS: usize = 50;

/// Scan `text` with every detector in `registry`. Identical inputs produce
/// byte-identical findings.
pub fn detect(text: &str, registry: &Registry) -> Findings {
    scan(text, registry, None).expect("scan without a deadline cannot fail")
}

/// `detect` plus the denial-of-service guards: an input-size cap and a
/// wall-clock deadline checked between detector passes. No partial findings
/// are produced on timeout.
pub fn detect_bounded(
    text: &str,
    registry: &Registry,
    options: &ScanOptions,
) -> Result<Findings, ScanError> {
    if let Some(cap) = options.max_input_size {
        if text.len() > cap {
            return Err(ScanError::InputTooLarge {
                size: text.len(),
                cap,
            });
        }
    }
    let deadline = options.timeout.map(|budget| Instant::now() + budget);
    scan(text, registry, deadline)
}

fn scan(
    text: &str,
    registry: &Registry,
    deadline: Option<Instant>,
) -> Result<Findings, ScanError> {
    let mut categories: BTreeMap<String, CategorySummary> = BTreeMap::new();
    let mut all: Vec<GlobalMatchRecord> = Vec::new();

    for detector in registry.detectors() {
        let matches: Vec<Match> = detector
            .regex
            .find_iter(text)
            .map(|m| Match {
                value: m.as_str().to_string(),
                position: m.start(),
                context: context_window(text, m.start(), m.end()),
            })
            .collect();

        // Each detector pass is linear-time, so checking the budget between
        // passes bounds any overrun to a single pass.
        if let Some(deadline) = deadline {
            if Instant::now() > deadline {
                return Err(ScanError::Timeout);
            }
        }
        if matches.is_empty() {
            continue;
        }

        // Flatten in registry load order; the later stable sort keeps this
        // order among equal positions.
        all.extend(matches.iter().map(|m| GlobalMatchRecord {
            detector_id: detector.descriptor.id.clone(),
            detector_name: detector.descriptor.name.clone(),
            value: m.value.clone(),
            position: m.position,
            context: m.context.clone(),
        }));
        categories.insert(
            detector.descriptor.id.clone(),
            CategorySummary {
                name: detector.descriptor.name.clone(),
                description: detector.descriptor.description.clone(),
                count: matches.len(),
                matches,
            },
        );
    }

    sort_matches_stable(&mut all);
    let total_matches = all.len();
    Ok(Findings {
        has_pii: total_matches > 0,
        categories,
        total_matches,
        matches: all,
    })
}

/// The ±50-byte window around a match, clipped to the text and snapped
/// inward to UTF-8 boundaries so the slice is always valid and never
/// exceeds the clipped bounds. Leading/trailing whitespace is trimmed.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let mut lo = start.saturating_sub(CONTEXT_RADIUS);
    while !text.is_char_boundary(lo) {
        lo += 1;
    }
    let mut hi = (end + CONTEXT_RADIUS).min(text.len());
    while !text.is_char_boundary(hi) {
        hi -= 1;
    }
    text[lo..hi].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{DescriptorSource, DetectorDescriptor};

    fn registry_of(descriptors: Vec<(&str, &str)>) -> Registry {
        Registry::load(descriptors.into_iter().map(|(id, pattern)| {
            DescriptorSource::Single(DetectorDescriptor {
                id: id.to_string(),
                name: id.to_string(),
                description: String::new(),
                pattern: pattern.to_string(),
            })
        }))
        .unwrap()
    }

    #[test]
    fn empty_text_yields_empty_findings() {
        let findings = detect("", &Registry::builtin());
        assert!(!findings.has_pii);
        assert_eq!(findings.total_matches, 0);
        assert!(findings.categories.is_empty());
        assert!(findings.matches.is_empty());
    }

    #[test]
    fn email_and_ssn_are_found_in_position_order() {
        let text = "My email is a@b.com and ssn 123-45-6789";
        let findings = detect(text, &Registry::builtin());

        assert!(findings.has_pii);
        let email = &findings.categories["email"];
        assert_eq!(email.count, 1);
        assert_eq!(email.matches[0].value, "a@b.com");
        let ssn = &findings.categories["ssn"];
        assert_eq!(ssn.count, 1);
        assert_eq!(ssn.matches[0].value, "123-45-6789");

        // Global list is position-sorted: the email comes first.
        assert_eq!(findings.matches[0].detector_id, "email");
        assert_eq!(findings.matches[0].position, 12);
        let ssn_record = findings
            .matches
            .iter()
            .find(|m| m.detector_id == "ssn")
            .unwrap();
        assert!(ssn_record.position > findings.matches[0].position);
    }

    #[test]
    fn counts_are_coherent() {
        let text = "a@b.com, c@d.org, 10.0.0.1, 192.168.1.1, 123-45-6789";
        let findings = detect(text, &Registry::builtin());
        assert_eq!(findings.total_matches, findings.matches.len());
        let category_total: usize = findings.categories.values().map(|c| c.count).sum();
        assert_eq!(findings.total_matches, category_total);
        assert!(findings
            .matches
            .windows(2)
            .all(|w| w[0].position <= w[1].position));
    }

    #[test]
    fn overlapping_detectors_both_report() {
        // Passport and driver-license expressions both cover "AB1234567";
        // the engine performs no cross-detector suppression.
        let text = "id AB1234567 on file";
        let findings = detect(text, &Registry::builtin());
        let ids: Vec<&str> = findings
            .matches
            .iter()
            .map(|m| m.detector_id.as_str())
            .collect();
        assert!(ids.contains(&"driver_license"));
        assert!(ids.contains(&"passport"));
        let positions: Vec<usize> = findings.matches.iter().map(|m| m.position).collect();
        assert!(positions.iter().all(|&p| p == positions[0]));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let registry = registry_of(vec![("word", r"\bsecret\b")]);
        let findings = detect("top SECRET stuff", &registry);
        assert_eq!(findings.total_matches, 1);
        assert_eq!(findings.matches[0].value, "SECRET");
    }

    #[test]
    fn non_matching_detector_contributes_no_category() {
        let registry = registry_of(vec![("hit", r"\d+"), ("miss", r"zzz+")]);
        let findings = detect("42", &registry);
        assert_eq!(findings.categories.len(), 1);
        assert!(findings.categories.contains_key("hit"));
    }

    #[test]
    fn context_is_a_clipped_trimmed_substring() {
        let pad = "x".repeat(80);
        let text = format!("{pad} a@b.com {pad}");
        let findings = detect(&text, &Registry::builtin());
        let m = &findings.categories["email"].matches[0];
        assert!(text.contains(&m.context));
        assert!(m.context.len() <= 2 * CONTEXT_RADIUS + m.value.len());
        assert!(m.context.contains("a@b.com"));

        // Match flush against the text edges stays in bounds.
        let findings = detect("a@b.com", &Registry::builtin());
        assert_eq!(findings.categories["email"].matches[0].context, "a@b.com");
    }

    #[test]
    fn context_window_snaps_to_char_boundaries() {
        // Multibyte characters sit exactly at the clip edges.
        let text = format!("{} a@b.com {}", "é".repeat(40), "é".repeat(40));
        let findings = detect(&text, &Registry::builtin());
        let context = &findings.categories["email"].matches[0].context;
        assert!(text.contains(context.as_str()));
    }

    #[test]
    fn detection_is_deterministic() {
        let text = "a@b.com 123-45-6789 10.0.0.1 (555) 123-4567 AB1234567";
        let registry = Registry::builtin();
        let first = serde_json::to_string(&detect(text, &registry)).unwrap();
        let second = serde_json::to_string(&detect(text, &registry)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn oversized_input_is_rejected() {
        let registry = Registry::builtin();
        let options = ScanOptions {
            max_input_size: Some(8),
            ..ScanOptions::default()
        };
        let err = detect_bounded("far too long for the cap", &registry, &options).unwrap_err();
        assert!(matches!(err, ScanError::InputTooLarge { .. }));
    }

    #[test]
    fn zero_budget_times_out() {
        let registry = Registry::builtin();
        let options = ScanOptions {
            timeout: Some(std::time::Duration::ZERO),
            ..ScanOptions::default()
        };
        let err = detect_bounded("a@b.com", &registry, &options).unwrap_err();
        assert!(matches!(err, ScanError::Timeout));
    }
}
