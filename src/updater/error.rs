//! Updater Error Types
//!
//! The check/apply taxonomy: every variant here is recovered locally by the
//! component that sees it - a single repository or addon failure never
//! aborts a batch. Only controller sequencing failures escape, as
//! `anyhow::Error`, to the host's generic error reporting.

use thiserror::Error;

use crate::registry::SourceError;

/// Result type for repository update checks
pub type CheckResult<T> = Result<T, CheckError>;

/// Errors from a single repository's update check
#[derive(Debug, Error)]
pub enum CheckError {
    /// The check infrastructure itself could not be reached or parsed for
    /// this repository; its contribution to the run is empty
    #[error("Cannot retrieve update metadata for repository '{repository}': {reason}")]
    MetadataUnavailable { repository: String, reason: String },

    /// Any other failure during the check
    #[error("Update check failed for repository '{repository}': {reason}")]
    Unexpected { repository: String, reason: String },
}

impl CheckError {
    pub fn from_source(repository: impl Into<String>, source: SourceError) -> Self {
        let repository = repository.into();
        match source {
            SourceError::MetadataUnavailable { reason } => {
                Self::MetadataUnavailable { repository, reason }
            }
            other => Self::Unexpected {
                repository,
                reason: other.to_string(),
            },
        }
    }
}

/// Failure of the front-end's own update mechanism, a distinct concern from
/// per-addon checks. The controller recovers by falling back to the
/// addon-check path.
#[derive(Debug, Error)]
#[error("Front-end self-update failed: {0}")]
pub struct SelfUpdateError(pub String);
