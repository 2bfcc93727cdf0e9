//! Tool version utilities
//!
//! Build scripts pin the generator with `--requirement x.y.z`; a run aborts
//! when this build cannot satisfy the pin.

use semver::Version;
use std::fmt;

use crate::error::{Result, SchemaError};

/// Version of this generator build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    pub version: Version,
}

impl ToolVersion {
    /// The version this crate was built as
    pub fn current() -> Result<Self> {
        Self::parse(env!("CARGO_PKG_VERSION"))
    }

    /// Parse a version string, with or without a leading `v`
    pub fn parse(version_str: &str) -> Result<Self> {
        let version_str = version_str.strip_prefix('v').unwrap_or(version_str);
        Ok(Self {
            version: Version::parse(version_str)?,
        })
    }

    /// Whether code generated by this version satisfies `required`
    ///
    /// Same major, required minor not newer, and when minors match the
    /// required patch not newer.
    pub fn satisfies(&self, required: &Version) -> bool {
        let current = &self.version;
        if current.major != required.major || required.minor > current.minor {
            return false;
        }
        !(required.minor == current.minor && required.patch > current.patch)
    }

    /// Fail with [`SchemaError::IncompatibleVersion`] unless `required` is met
    pub fn check(&self, required: &str) -> Result<()> {
        let required = Self::parse(required)?;
        if self.satisfies(&required.version) {
            tracing::debug!(current = %self, required = %required, "tool version requirement met");
            Ok(())
        } else {
            Err(SchemaError::IncompatibleVersion {
                current: self.to_string(),
                required: required.to_string(),
            })
        }
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// Check `required` against this build
pub fn check_requirement(required: &str) -> Result<()> {
    ToolVersion::current()?.check(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(v: &str) -> ToolVersion {
        ToolVersion::parse(v).unwrap()
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!(tool("1.2.3").to_string(), "1.2.3");
        assert_eq!(tool("v1.2.3").to_string(), "1.2.3");
        assert!(ToolVersion::parse("1.2").is_err());
    }

    #[test]
    fn test_requirement_rules() {
        let current = tool("2.4.1");
        assert!(current.check("2.4.1").is_ok());
        assert!(current.check("2.4.0").is_ok());
        assert!(current.check("2.1.9").is_ok());
        assert!(current.check("2.0.0").is_ok());

        assert!(current.check("2.4.2").is_err());
        assert!(current.check("2.5.0").is_err());
        assert!(current.check("1.4.1").is_err());
        assert!(current.check("3.0.0").is_err());
    }

    #[test]
    fn test_incompatible_error_names_both_versions() {
        let err = tool("2.4.1").check("3.0.0").unwrap_err();
        match err {
            SchemaError::IncompatibleVersion { current, required } => {
                assert_eq!(current, "2.4.1");
                assert_eq!(required, "3.0.0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_current_build_satisfies_itself() {
        assert!(check_requirement(env!("CARGO_PKG_VERSION")).is_ok());
    }
}
