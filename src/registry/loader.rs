//! Filesystem Load Pass
//!
//! Reads a directory of repository manifests into [`Repository`] values.
//! Each repository lives in its own subdirectory containing a
//! `repository.toml` manifest; the manifest names a listing file that plays
//! the role of the upstream feed. A manifest that fails to parse is logged
//! and skipped, never fatal to the whole load.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::addon::{Addon, AddonDescriptor, AddonUpdater};
use super::error::{AddonError, RegistryError, RegistryResult, SourceError};
use super::repository::{Repository, UpdateSource};
use super::version::Version;

/// Manifest file name expected inside each repository directory
pub const MANIFEST_FILE: &str = "repository.toml";

/// On-disk repository manifest
#[derive(Debug, Deserialize)]
struct RepositoryManifest {
    id: String,
    name: String,
    /// Upstream listing location, relative to the repository directory
    listing: PathBuf,
    #[serde(default)]
    addons: Vec<AddonDescriptor>,
}

/// On-disk upstream listing
#[derive(Debug, Deserialize)]
struct ListingFile {
    #[serde(default)]
    addons: Vec<AddonDescriptor>,
}

// Listing reads happen on the check/apply paths, so the file IO must not
// stall other repositories being checked on the same runtime.
async fn read_listing(path: &Path) -> Result<Vec<AddonDescriptor>, SourceError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::metadata_unavailable(format!("{}: {}", path.display(), e)))?;
    let listing: ListingFile = toml::from_str(&content)
        .map_err(|e| SourceError::metadata_unavailable(format!("{}: {}", path.display(), e)))?;
    Ok(listing.addons)
}

/// [`UpdateSource`] backed by a local listing file.
///
/// Transport is out of scope for the orchestrator; a file that can or
/// cannot be read gives exactly the "fetch succeeded/failed" signal the
/// core needs.
pub struct FileSource {
    listing: PathBuf,
}

impl FileSource {
    pub fn new(listing: impl Into<PathBuf>) -> Self {
        Self { listing: listing.into() }
    }
}

#[async_trait]
impl UpdateSource for FileSource {
    async fn fetch_available(&self) -> Result<Vec<AddonDescriptor>, SourceError> {
        read_listing(&self.listing).await
    }
}

/// [`AddonUpdater`] backed by the same local listing.
///
/// Re-reads the listing at apply time and adopts the published version when
/// it is newer than the installed one.
pub struct FileInstaller {
    listing: PathBuf,
}

impl FileInstaller {
    pub fn new(listing: impl Into<PathBuf>) -> Self {
        Self { listing: listing.into() }
    }
}

#[async_trait]
impl AddonUpdater for FileInstaller {
    async fn apply(&self, addon: &Addon) -> Result<Option<Version>, AddonError> {
        let available = read_listing(&self.listing)
            .await
            .map_err(|e| AddonError::apply_failed(e.to_string()))?;
        let published = available
            .into_iter()
            .find(|d| d.id == addon.id())
            .ok_or_else(|| {
                AddonError::apply_failed(format!("addon '{}' not in listing", addon.id()))
            })?;
        if published.version > addon.installed_version() {
            Ok(Some(published.version))
        } else {
            Ok(None)
        }
    }
}

fn load_manifest(repo_dir: &Path) -> RegistryResult<Arc<Repository>> {
    let manifest_path = repo_dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&manifest_path)?;
    let manifest: RepositoryManifest = toml::from_str(&content)
        .map_err(|e| RegistryError::invalid_manifest(&manifest_path, e.to_string()))?;

    let listing_path = repo_dir.join(&manifest.listing);
    let addons = manifest
        .addons
        .into_iter()
        .map(|descriptor| {
            Addon::new(
                descriptor.id,
                descriptor.name,
                descriptor.kind,
                descriptor.version,
                Box::new(FileInstaller::new(&listing_path)),
            )
        })
        .collect();

    Ok(Repository::new(
        manifest.id,
        manifest.name,
        repo_dir.display().to_string(),
        addons,
        Box::new(FileSource::new(&listing_path)),
    ))
}

/// Scan a root directory for repository manifests.
///
/// Plain files in the root are ignored; a subdirectory whose manifest fails
/// to load is logged and skipped.
pub fn load_repositories(root: &Path) -> RegistryResult<Vec<Arc<Repository>>> {
    let mut repositories = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        log::debug!("found repository directory {}", path.display());
        match load_manifest(&path) {
            Ok(repository) => repositories.push(repository),
            Err(e) => {
                log::error!("cannot load repository {}, skipping: {}", path.display(), e);
            }
        }
    }
    Ok(repositories)
}
