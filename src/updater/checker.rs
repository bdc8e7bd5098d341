//! Repository Update Checker
//!
//! Wraps one repository's "ask upstream if anything changed" operation.
//! Pure with respect to shared state: the result is the ordered list of
//! published addons whose upstream version is newer than the installed one.

use std::sync::Arc;

use crate::registry::{Addon, Repository};

use super::error::{CheckError, CheckResult};

/// Check one repository for updatable addons.
///
/// Returns the repository's addons with a newer upstream version, in
/// listing order. Fetch failures are classified into
/// [`CheckError::MetadataUnavailable`] (check infrastructure broken) and
/// [`CheckError::Unexpected`]; the aggregator recovers from both.
pub async fn check_repository(repository: &Repository) -> CheckResult<Vec<Arc<Addon>>> {
    let available = repository
        .source()
        .fetch_available()
        .await
        .map_err(|e| CheckError::from_source(repository.id(), e))?;

    let mut pending = Vec::new();
    for descriptor in available {
        if let Some(addon) = repository.addon(&descriptor.id) {
            if descriptor.version > addon.installed_version() {
                log::debug!(
                    "repository '{}': addon '{}' has update {} -> {}",
                    repository.id(),
                    addon.id(),
                    addon.installed_version(),
                    descriptor.version
                );
                pending.push(addon);
            }
        }
    }
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{
        AddonDescriptor, AddonError, AddonKind, AddonUpdater, SourceError, UpdateSource, Version,
    };
    use async_trait::async_trait;

    struct NoopUpdater;

    #[async_trait]
    impl AddonUpdater for NoopUpdater {
        async fn apply(&self, _addon: &Addon) -> Result<Option<Version>, AddonError> {
            Ok(None)
        }
    }

    struct StaticSource(Vec<AddonDescriptor>);

    #[async_trait]
    impl UpdateSource for StaticSource {
        async fn fetch_available(&self) -> Result<Vec<AddonDescriptor>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl UpdateSource for BrokenSource {
        async fn fetch_available(&self) -> Result<Vec<AddonDescriptor>, SourceError> {
            Err(SourceError::metadata_unavailable("listing gone"))
        }
    }

    fn descriptor(id: &str, version: Version) -> AddonDescriptor {
        AddonDescriptor {
            id: id.to_string(),
            name: id.to_string(),
            version,
            kind: AddonKind::Video,
        }
    }

    fn addon(id: &str, installed: Version) -> Arc<Addon> {
        Addon::new(id, id, AddonKind::Video, installed, Box::new(NoopUpdater))
    }

    #[tokio::test]
    async fn test_newer_upstream_versions_are_pending() {
        let repo = Repository::new(
            "repo.a",
            "A",
            "local",
            vec![
                addon("plugin.one", Version::new(1, 0, 0)),
                addon("plugin.two", Version::new(2, 0, 0)),
            ],
            Box::new(StaticSource(vec![
                descriptor("plugin.one", Version::new(1, 1, 0)),
                descriptor("plugin.two", Version::new(2, 0, 0)),
                // unknown addon ids in the listing are ignored
                descriptor("plugin.unknown", Version::new(9, 0, 0)),
            ])),
        );

        let pending = check_repository(&repo).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), "plugin.one");
    }

    #[tokio::test]
    async fn test_broken_source_is_metadata_unavailable() {
        let repo = Repository::new(
            "repo.a",
            "A",
            "local",
            vec![addon("plugin.one", Version::new(1, 0, 0))],
            Box::new(BrokenSource),
        );

        let err = check_repository(&repo).await.unwrap_err();
        assert!(matches!(err, CheckError::MetadataUnavailable { .. }));
    }
}
