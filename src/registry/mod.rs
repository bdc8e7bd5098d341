//! Addon and Repository Registries
//!
//! Process-scoped ownership of everything the orchestrator updates: the set
//! of loaded repositories and the addons they publish. The registry has an
//! explicit lifecycle - a load pass populates it from on-disk manifests,
//! and closing the content screen tears it down again unless preloading is
//! enabled. It is passed by reference to the controller rather than living
//! in ambient statics.

pub mod addon;
pub mod error;
pub mod loader;
pub mod repository;
pub mod version;

pub use addon::{Addon, AddonDescriptor, AddonKind, AddonUpdater};
pub use error::{AddonError, RegistryError, RegistryResult, SourceError};
pub use repository::{Repository, UpdateSource};
pub use version::Version;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Default)]
struct RegistryInner {
    repositories: HashMap<String, Arc<Repository>>,
    addons: HashMap<String, Arc<Addon>>,
    loaded: bool,
}

/// Process-wide registry of repositories and the addons they publish.
///
/// Mutation happens from a single controlling context at a time; the lock
/// is there so the registry can be shared defensively across callers.
pub struct RepositoryRegistry {
    root: PathBuf,
    inner: RwLock<RegistryInner>,
}

impl RepositoryRegistry {
    /// Create an empty registry rooted at a directory of repository manifests
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// True once a load pass has completed (or repositories were registered
    /// directly)
    pub fn is_loaded(&self) -> bool {
        self.inner.read().loaded
    }

    /// Load repositories from the manifest directory.
    ///
    /// A repository that fails to parse is logged and skipped; it is never
    /// fatal to the whole load. A missing or unreadable root directory is.
    pub fn load(&self) -> RegistryResult<()> {
        log::debug!("looking for repositories in {}", self.root.display());
        let repositories = loader::load_repositories(&self.root)?;
        for repository in repositories {
            self.add_repository(repository);
        }
        self.inner.write().loaded = true;
        Ok(())
    }

    /// Register a repository and every addon it publishes
    pub fn add_repository(&self, repository: Arc<Repository>) {
        let mut inner = self.inner.write();
        for addon in repository.addons() {
            inner.addons.insert(addon.id().to_string(), Arc::clone(addon));
        }
        inner
            .repositories
            .insert(repository.id().to_string(), repository);
        inner.loaded = true;
    }

    /// Look up a repository by id
    pub fn repository(&self, id: &str) -> Option<Arc<Repository>> {
        self.inner.read().repositories.get(id).cloned()
    }

    /// All loaded repositories
    pub fn repositories(&self) -> Vec<Arc<Repository>> {
        self.inner.read().repositories.values().cloned().collect()
    }

    /// Look up an addon by id
    pub fn addon(&self, id: &str) -> Option<Arc<Addon>> {
        self.inner.read().addons.get(id).cloned()
    }

    /// True when an addon with this id is registered
    pub fn has_addon(&self, id: &str) -> bool {
        self.inner.read().addons.contains_key(id)
    }

    /// All registered addons
    pub fn addons(&self) -> Vec<Arc<Addon>> {
        self.inner.read().addons.values().cloned().collect()
    }

    /// Registered addons carrying the video capability tag
    pub fn video_addons(&self) -> Vec<Arc<Addon>> {
        self.inner
            .read()
            .addons
            .values()
            .filter(|a| a.kind() == AddonKind::Video)
            .cloned()
            .collect()
    }

    /// Drop everything; the next content-screen open reloads from disk.
    /// Called on screen close when preloading is disabled.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.repositories.clear();
        inner.addons.clear();
        inner.loaded = false;
    }
}
