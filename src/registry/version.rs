//! Addon Version Handling
//!
//! Simple three-part version numbers as published in repository manifests
//! and upstream listings. Ordering is lexicographic over
//! (major, minor, patch), which is what update detection compares.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use super::error::RegistryError;

/// A `major.minor.patch` addon version.
///
/// Parsed from strings like `"1.2.3"` or `"v1.2.3"`; missing trailing
/// components default to zero (`"1.2"` == `"1.2.0"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl FromStr for Version {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(RegistryError::invalid_version(s));
        }

        let mut parts = trimmed.split('.');
        let component = |part: Option<&str>| -> Result<u32, RegistryError> {
            match part {
                Some(p) => p.parse::<u32>().map_err(|_| RegistryError::invalid_version(s)),
                None => Ok(0),
            }
        };

        let major = component(parts.next())?;
        let minor = component(parts.next())?;
        let patch = component(parts.next())?;

        if parts.next().is_some() {
            return Err(RegistryError::invalid_version(s));
        }

        Ok(Self { major, minor, patch })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl TryFrom<String> for Version {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
