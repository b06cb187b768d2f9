//! # Pinned Requirements
//!
//! Parsing for `requirements.txt`-style batches and the report produced by a
//! batch cache fill. Only exact pins (`package==version`) are understood;
//! range specifiers, comments, options and blank lines are all classified as
//! unparseable.

use serde::{Deserialize, Serialize};

use crate::package::PackageName;

/// Separator for an exact-equality pin.
const PIN_SEPARATOR: &str = "==";

/// One `package==version` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementLine {
    /// The pinned package.
    pub package: PackageName,
    /// The exact version after `==`.
    pub version: String,
    /// The trimmed source line, reported verbatim on failure.
    pub line: String,
}

impl RequirementLine {
    /// Parse a single line. Returns `None` unless it is an exact pin.
    ///
    /// The line is trimmed first. Both halves must be non-empty, the package
    /// half must be a valid [`PackageName`], and the version half must not
    /// itself contain another `==`.
    pub fn parse(raw: &str) -> Option<Self> {
        let line = raw.trim();
        let (package, version) = line.split_once(PIN_SEPARATOR)?;
        let version = version.trim();
        if version.is_empty() || version.contains(PIN_SEPARATOR) {
            return None;
        }
        let package = PackageName::new(package).ok()?;
        Some(Self {
            package,
            version: version.to_string(),
            line: line.to_string(),
        })
    }
}

/// A line whose processing was aborted by an unexpected error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErroredRequirement {
    /// The trimmed source line.
    pub line: String,
    /// Display form of the error that stopped it.
    pub error: String,
}

/// Aggregate result of a batch cache fill.
///
/// Each list preserves input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingReport {
    /// Filenames fetched into (or already present in) the store.
    pub cached: Vec<String>,
    /// Lines that are not exact pins.
    pub unparseable: Vec<String>,
    /// Pinned lines the upstream index has no record of.
    pub failed: Vec<String>,
    /// Pinned lines aborted by remote or storage errors.
    pub errored: Vec<ErroredRequirement>,
}

impl ProcessingReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of input lines that did not resolve to cached files.
    pub fn lines_rejected(&self) -> usize {
        self.unparseable.len() + self.failed.len() + self.errored.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_pin() {
        let req = RequirementLine::parse("  requests==2.0.1\n").unwrap();
        assert_eq!(req.package, "requests");
        assert_eq!(req.version, "2.0.1");
        assert_eq!(req.line, "requests==2.0.1");
    }

    #[test]
    fn tolerates_spaces_around_separator() {
        let req = RequirementLine::parse("Django == 1.4.3").unwrap();
        assert_eq!(req.package, "Django");
        assert_eq!(req.version, "1.4.3");
    }

    #[test]
    fn rejects_range_specifiers() {
        assert!(RequirementLine::parse("bar>=2.0").is_none());
        assert!(RequirementLine::parse("bar~=2.0").is_none());
        assert!(RequirementLine::parse("bar<3").is_none());
    }

    #[test]
    fn rejects_blank_and_comment_lines() {
        assert!(RequirementLine::parse("").is_none());
        assert!(RequirementLine::parse("   ").is_none());
        assert!(RequirementLine::parse("# pinned deps").is_none());
    }

    #[test]
    fn rejects_half_empty_pins() {
        assert!(RequirementLine::parse("==1.0").is_none());
        assert!(RequirementLine::parse("foo==").is_none());
        assert!(RequirementLine::parse("foo==1.0==2.0").is_none());
    }

    #[test]
    fn report_serializes_all_buckets() {
        let mut report = ProcessingReport::new();
        report.cached.push("foo-1.0.tar.gz".into());
        report.unparseable.push("bar>=2.0".into());
        report.failed.push("missingpkg==9.9".into());
        report.errored.push(ErroredRequirement {
            line: "flaky==1.0".into(),
            error: "remote error".into(),
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cached"][0], "foo-1.0.tar.gz");
        assert_eq!(json["unparseable"][0], "bar>=2.0");
        assert_eq!(json["failed"][0], "missingpkg==9.9");
        assert_eq!(json["errored"][0]["line"], "flaky==1.0");
        assert_eq!(report.lines_rejected(), 3);
    }
}
