//! Built-in detector descriptors.
//!
//! Each source contributes either one descriptor or a named collection; the
//! registry is the union of all sources. Detection is purely lexical: a
//! matched string is never validated as a real identifier.
/// A named regular-expression rule plus display metadata. Immutable once
/// loaded; the expression is compiled case-insensitively at registry load,
/// never at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorDescriptor {
    /// Unique detector id, the category key in findings output.
    pub id: String,
    pub name: String,
    pub description: String,
    pub pattern: String,
}

/// A descriptor source: exactly one descriptor, or a named collection.
#[derive(Debug, Clone)]
pub enum DescriptorSource {
    Single(DetectorDescriptor),
    Collection(Vec<DetectorDescriptor>),
}

impl DescriptorSource {
    pub(crate) fn into_descriptors(self) -> Vec<DetectorDescriptor> {
        match self {
            Self::Single(descriptor) => vec![descriptor],
            Self::Collection(descriptors) => descriptors,
        }
    }
}

fn descriptor(id: &str, name: &str, description: &str, pattern: &str) -> DetectorDescriptor {
    DetectorDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        pattern: pattern.to_string(),
    }
}

/// The default detector set. Loosely-bounded numeric patterns here are the
/// reason scans run on a finite-automaton engine with a time budget.
pub fn builtin_sources() -> Vec<DescriptorSource> {
    vec![
        DescriptorSource::Single(descriptor(
            "credit_card",
            "Credit Card Number",
            "Credit card numbers",
            r"\b(?:\d{4}[-\s]?){3}\d{4}\b",
        )),
        DescriptorSource::Single(descriptor(
            "date_of_birth",
            "Date of Birth",
            "Dates that might be DOB",
            r"\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s+\d{4})\b",
        )),
        DescriptorSource::Single(descriptor(
            "driver_license",
            "Driver License",
            "Driver license numbers",
            r"\b[A-Z]{1,2}\d{6,8}\b",
        )),
        DescriptorSource::Single(descriptor(
            "email",
            "Email Address",
            "Email addresses",
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        )),
        DescriptorSource::Single(descriptor(
            "ip_address",
            "IP Address",
            "IP addresses",
            r"\b(?:\d{1,3}\.){3}\d{1,3}\b",
        )),
        // National identity numbers ship as one named collection.
        DescriptorSource::Collection(vec![
            descriptor(
                "ssn",
                "Social Security Number",
                "SSN (XXX-XX-XXXX or XXXXXXXXX)",
                r"\b\d{3}-?\d{2}-?\d{4}\b",
            ),
            descriptor(
                "swedish_personal_number",
                "Swedish Personal Number",
                "Swedish personnummer (YYMMDD-XXXX or YYYYMMDD-XXXX)",
                r"\b(?:\d{6}[-+]?\d{4}|\d{8}[-+]?\d{4})\b",
            ),
        ]),
        DescriptorSource::Single(descriptor(
            "passport",
            "Passport Number",
            "Passport numbers",
            r"\b[A-Z]{1,2}\d{6,9}\b",
        )),
        DescriptorSource::Single(descriptor(
            "phone",
            "US Phone Number",
            "US phone numbers",
            r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
        )),
    ]
}
