//! Entity references
//!
//! `extends` attributes and `interface=` annotations point at other entities
//! with URLs of the form `navajo://common/person/Person.2`: the authority and
//! path together form the logical path of the target document, and an optional
//! numeric suffix on the last segment pins the version.

use serde::Serialize;
use std::fmt;

use crate::error::{Result, SchemaError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    /// The reference as written
    pub raw: String,
    pub scheme: Option<String>,
    /// Logical path of the target document, version stripped
    pub path: String,
    pub name: String,
    /// `None` for unversioned references
    pub version: Option<u32>,
}

impl Reference {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| SchemaError::InvalidReference {
            reference: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        let (scheme, rest) = match trimmed.split_once("://") {
            Some((scheme, rest)) => (Some(scheme.to_string()), rest),
            None => (None, trimmed),
        };

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, package)) = segments.split_last() else {
            return Err(invalid("empty path"));
        };

        let name = base_name(last);
        if name.is_empty() {
            return Err(invalid("empty entity name"));
        }
        let version = match version_suffix(last) {
            Some(suffix) => Some(
                suffix
                    .parse::<u32>()
                    .map_err(|_| invalid("version suffix is not a number"))?,
            ),
            None => None,
        };

        let path = if package.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", package.join("/"), name)
        };

        Ok(Self {
            raw: raw.to_string(),
            scheme,
            path,
            name: name.to_string(),
            version,
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split an `extends` attribute into its references
///
/// Older documents separate parents with `,`, newer ones with `^`.
pub fn split_extends(raw: &str) -> Vec<&str> {
    raw.split([',', '^'])
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect()
}

/// `Foo.3` → `Foo`
pub fn base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// `Foo.3` → `Some("3")`, `Foo` → `None`
pub fn version_suffix(name: &str) -> Option<&str> {
    name.split_once('.').map(|(_, suffix)| suffix)
}

/// Render an optional version the way entity documents do (`-1` = latest)
pub fn display_version(version: Option<u32>) -> String {
    version.map(|v| v.to_string()).unwrap_or_else(|| "-1".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versioned_reference() {
        let r = Reference::parse("navajo://common/person/Person.2").unwrap();
        assert_eq!(r.scheme.as_deref(), Some("navajo"));
        assert_eq!(r.path, "common/person/Person");
        assert_eq!(r.name, "Person");
        assert_eq!(r.version, Some(2));
    }

    #[test]
    fn test_parse_unversioned_and_schemeless() {
        let r = Reference::parse("navajo://Club").unwrap();
        assert_eq!(r.path, "Club");
        assert_eq!(r.version, None);

        let r = Reference::parse("common/Named").unwrap();
        assert_eq!(r.scheme, None);
        assert_eq!(r.path, "common/Named");
    }

    #[test]
    fn test_parse_rejects_bad_references() {
        assert!(Reference::parse("navajo://").is_err());
        assert!(Reference::parse("navajo://common/Person.two").is_err());
    }

    #[test]
    fn test_split_extends_accepts_both_separators() {
        assert_eq!(
            split_extends("navajo://a/A, navajo://b/B.2^navajo://c/C"),
            vec!["navajo://a/A", "navajo://b/B.2", "navajo://c/C"]
        );
        assert!(split_extends("").is_empty());
    }

    #[test]
    fn test_name_helpers() {
        assert_eq!(base_name("Person.3"), "Person");
        assert_eq!(version_suffix("Person.3"), Some("3"));
        assert_eq!(version_suffix("Person"), None);
        assert_eq!(display_version(None), "-1");
    }
}
