//! # Package Names
//!
//! [`PackageName`] is the validated identifier used to derive storage paths
//! and upstream URLs. Case is preserved verbatim: `Django` and `django` are
//! different packages with different first-letter buckets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated package name.
///
/// Invariants: non-empty, no `/` or `\`, not `.` or `..`, no control
/// characters. Surrounding whitespace is trimmed at construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Validate and wrap a package name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPackageName);
        }
        if !is_safe_segment(name) {
            return Err(ValidationError::InvalidPackageName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first-letter bucket: the first character, verbatim.
    pub fn first_letter(&self) -> char {
        // Non-empty by construction.
        self.0.chars().next().unwrap_or('_')
    }
}

/// A single path segment that cannot escape its parent directory.
pub(crate) fn is_safe_segment(segment: &str) -> bool {
    segment != "."
        && segment != ".."
        && !segment.contains('/')
        && !segment.contains('\\')
        && !segment.chars().any(char::is_control)
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PackageName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PackageName> for String {
    fn from(value: PackageName) -> Self {
        value.0
    }
}

impl std::str::FromStr for PackageName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        let name = PackageName::new("requests").unwrap();
        assert_eq!(name.as_str(), "requests");
        assert_eq!(name.first_letter(), 'r');
    }

    #[test]
    fn first_letter_is_case_sensitive() {
        assert_eq!(PackageName::new("Django").unwrap().first_letter(), 'D');
        assert_eq!(PackageName::new("django").unwrap().first_letter(), 'd');
    }

    #[test]
    fn trims_whitespace() {
        let name = PackageName::new("  flask \n").unwrap();
        assert_eq!(name, "flask");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(PackageName::new(""), Err(ValidationError::EmptyPackageName));
        assert_eq!(PackageName::new("   "), Err(ValidationError::EmptyPackageName));
    }

    #[test]
    fn rejects_path_escapes() {
        for bad in ["..", ".", "a/b", "a\\b", "nul\0byte"] {
            assert!(
                matches!(
                    PackageName::new(bad),
                    Err(ValidationError::InvalidPackageName(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn multibyte_first_letter() {
        let name = PackageName::new("ünicode").unwrap();
        assert_eq!(name.first_letter(), 'ü');
    }

    #[test]
    fn serde_round_trip_validates() {
        let name: PackageName = serde_json::from_str("\"zope.interface\"").unwrap();
        assert_eq!(name, "zope.interface");
        assert!(serde_json::from_str::<PackageName>("\"../etc\"").is_err());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut names = vec![
            PackageName::new("b").unwrap(),
            PackageName::new("B").unwrap(),
            PackageName::new("a").unwrap(),
        ];
        names.sort();
        let names: Vec<&str> = names.iter().map(PackageName::as_str).collect();
        assert_eq!(names, vec!["B", "a", "b"]);
    }
}
