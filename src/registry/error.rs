//! Registry Error Types
//!
//! Errors raised by the data model: manifest loading, version parsing,
//! upstream listing fetches and addon update application.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while loading and managing the registries
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A repository manifest could not be read or parsed
    #[error("Invalid repository manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// A version string did not parse
    #[error("Invalid version string: '{value}'")]
    InvalidVersion { value: String },

    /// Filesystem access failed
    #[error("Registry I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Create an invalid manifest error
    pub fn invalid_manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(value: impl Into<String>) -> Self {
        Self::InvalidVersion { value: value.into() }
    }
}

/// Errors raised by an [`UpdateSource`](super::repository::UpdateSource)
/// while fetching a repository's upstream listing
#[derive(Debug, Error)]
pub enum SourceError {
    /// The listing itself could not be reached or parsed. Checks treat this
    /// as "this repository contributes nothing", never as fatal.
    #[error("Update metadata unavailable: {reason}")]
    MetadataUnavailable { reason: String },

    /// Any other fetch failure
    #[error("Listing fetch failed: {reason}")]
    Fetch { reason: String },
}

impl SourceError {
    /// Create a metadata unavailable error
    pub fn metadata_unavailable(reason: impl Into<String>) -> Self {
        Self::MetadataUnavailable { reason: reason.into() }
    }

    /// Create a generic fetch error
    pub fn fetch(reason: impl Into<String>) -> Self {
        Self::Fetch { reason: reason.into() }
    }
}

/// Errors raised by an [`AddonUpdater`](super::addon::AddonUpdater) while
/// applying a single addon's update
#[derive(Debug, Error)]
pub enum AddonError {
    /// The update could not be applied
    #[error("Addon update failed: {reason}")]
    ApplyFailed { reason: String },

    /// Filesystem access failed during the update
    #[error("Addon I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AddonError {
    /// Create an apply failed error
    pub fn apply_failed(reason: impl Into<String>) -> Self {
        Self::ApplyFailed { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let error = RegistryError::invalid_version("not-a-version");
        assert_eq!(error.to_string(), "Invalid version string: 'not-a-version'");

        let error = RegistryError::invalid_manifest("/tmp/repo", "missing id");
        assert!(error.to_string().contains("/tmp/repo"));
        assert!(error.to_string().contains("missing id"));
    }

    #[test]
    fn test_source_error_display() {
        let error = SourceError::metadata_unavailable("listing not found");
        assert_eq!(
            error.to_string(),
            "Update metadata unavailable: listing not found"
        );
    }
}
