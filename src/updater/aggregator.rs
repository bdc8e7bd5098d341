//! Update Aggregator
//!
//! Fans the per-repository checker out over every loaded repository
//! concurrently and merges the results into one pending-update set. The
//! fan-out is unbounded - one task per repository - because repository
//! counts are small and bounded by install choice; no pool is needed.
//!
//! There is no cancellation and no per-repository timeout: a hanging check
//! stalls the whole aggregation until it returns. That is a documented
//! limitation of this design, not an accident.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;

use crate::registry::{Addon, Repository};

use super::checker::check_repository;
use super::error::CheckError;

/// Check every repository concurrently and collect the pending updates.
///
/// Blocks until all launched checks have completed (join-all barrier); a
/// failing repository contributes exactly zero entries and never shortens
/// other repositories' contributions. The shared set is locked only for
/// each append, never across a fetch. No ordering is guaranteed between
/// different repositories' contributions.
pub async fn check_all(repositories: &[Arc<Repository>]) -> Vec<Arc<Addon>> {
    let pending: Arc<Mutex<Vec<Arc<Addon>>>> = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::with_capacity(repositories.len());
    for repository in repositories {
        let repository = Arc::clone(repository);
        let pending = Arc::clone(&pending);
        handles.push(tokio::spawn(async move {
            match check_repository(&repository).await {
                Ok(found) => {
                    if !found.is_empty() {
                        log::info!(
                            "repository '{}' has {} pending update(s)",
                            repository.id(),
                            found.len()
                        );
                    }
                    pending.lock().await.extend(found);
                }
                Err(e @ CheckError::MetadataUnavailable { .. }) => {
                    log::error!("{}", e);
                }
                Err(e) => {
                    log::error!("error when checking updates for repository '{}': {}", repository.id(), e);
                }
            }
        }));
    }

    for result in join_all(handles).await {
        if let Err(e) = result {
            log::error!("update check task panicked: {}", e);
        }
    }

    // Every task has joined; the set is complete and no longer shared.
    match Arc::try_unwrap(pending) {
        Ok(mutex) => mutex.into_inner(),
        Err(shared) => shared.lock().await.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{
        AddonDescriptor, AddonError, AddonKind, AddonUpdater, SourceError, UpdateSource, Version,
    };
    use async_trait::async_trait;
    use std::time::Duration;

    struct NoopUpdater;

    #[async_trait]
    impl AddonUpdater for NoopUpdater {
        async fn apply(&self, _addon: &Addon) -> Result<Option<Version>, AddonError> {
            Ok(None)
        }
    }

    /// Source that yields its listing after an optional delay
    struct DelayedSource {
        delay: Duration,
        available: Vec<AddonDescriptor>,
    }

    #[async_trait]
    impl UpdateSource for DelayedSource {
        async fn fetch_available(&self) -> Result<Vec<AddonDescriptor>, SourceError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.available.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl UpdateSource for BrokenSource {
        async fn fetch_available(&self) -> Result<Vec<AddonDescriptor>, SourceError> {
            Err(SourceError::metadata_unavailable("unreachable"))
        }
    }

    fn repository_with_updates(id: &str, count: usize, delay: Duration) -> Arc<Repository> {
        let mut addons = Vec::new();
        let mut available = Vec::new();
        for i in 0..count {
            let addon_id = format!("{}.addon{}", id, i);
            addons.push(Addon::new(
                addon_id.clone(),
                addon_id.clone(),
                AddonKind::Video,
                Version::new(1, 0, 0),
                Box::new(NoopUpdater),
            ));
            available.push(AddonDescriptor {
                id: addon_id.clone(),
                name: addon_id,
                version: Version::new(1, 1, 0),
                kind: AddonKind::Video,
            });
        }
        Repository::new(id, id, "local", addons, Box::new(DelayedSource { delay, available }))
    }

    #[tokio::test]
    async fn test_failing_repository_contributes_nothing() {
        let repos = vec![
            repository_with_updates("repo.a", 2, Duration::ZERO),
            Repository::new("repo.b", "B", "local", Vec::new(), Box::new(BrokenSource)),
            repository_with_updates("repo.c", 3, Duration::from_millis(20)),
        ];

        let pending = check_all(&repos).await;
        // 2 from a, 0 from b, 3 from c regardless of completion order
        assert_eq!(pending.len(), 5);
        assert!(pending.iter().all(|a| !a.id().starts_with("repo.b")));
    }

    /// Source that stalls on blocking IO moved off the async threads, the
    /// way a file-backed source reads its listing.
    struct StallingSource {
        stall: Duration,
        available: Vec<AddonDescriptor>,
    }

    #[async_trait]
    impl UpdateSource for StallingSource {
        async fn fetch_available(&self) -> Result<Vec<AddonDescriptor>, SourceError> {
            let stall = self.stall;
            tokio::task::spawn_blocking(move || std::thread::sleep(stall))
                .await
                .map_err(|e| SourceError::fetch(e.to_string()))?;
            Ok(self.available.clone())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_slow_repositories_are_checked_in_parallel() {
        let stall = Duration::from_millis(200);
        let repos: Vec<Arc<Repository>> = (0..3)
            .map(|i| {
                let id = format!("repo.slow{}", i);
                Repository::new(
                    id.clone(),
                    id,
                    "local",
                    Vec::new(),
                    Box::new(StallingSource { stall, available: Vec::new() }),
                )
            })
            .collect();

        let started = std::time::Instant::now();
        check_all(&repos).await;
        let elapsed = started.elapsed();

        // wall time tracks the slowest repository, not the sum of all three
        assert!(
            elapsed < stall * 2,
            "aggregation took {:?}, checks ran serially",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_empty_repository_set() {
        let pending = check_all(&[]).await;
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_check_all_is_idempotent_without_state_change() {
        let repos = vec![
            repository_with_updates("repo.a", 2, Duration::ZERO),
            repository_with_updates("repo.b", 1, Duration::from_millis(5)),
        ];

        let mut first: Vec<String> =
            check_all(&repos).await.iter().map(|a| a.id().to_string()).collect();
        let mut second: Vec<String> =
            check_all(&repos).await.iter().map(|a| a.id().to_string()).collect();
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }
}
