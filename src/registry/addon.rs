//! Addon Entities
//!
//! An addon is one installable unit published by a repository: an id, a
//! display name, a capability tag and an installed version. The actual
//! download-and-install mechanics live behind the [`AddonUpdater`] seam so
//! the orchestrator stays independent of any transport.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::error::AddonError;
use super::version::Version;

/// Capability tag for an addon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddonKind {
    /// Video content plugin
    Video,
    /// Anything else (tools, resources, skins)
    Generic,
}

impl Default for AddonKind {
    fn default() -> Self {
        Self::Generic
    }
}

/// One addon entry as published in a manifest or upstream listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonDescriptor {
    pub id: String,
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub kind: AddonKind,
}

/// Strategy for applying one addon's update.
///
/// Implementations perform the repository-specific download/install and
/// return the version actually installed, or `None` when nothing changed
/// on disk.
#[async_trait]
pub trait AddonUpdater: Send + Sync {
    async fn apply(&self, addon: &Addon) -> Result<Option<Version>, AddonError>;
}

/// An installable addon registered with the process-wide registry.
pub struct Addon {
    id: String,
    name: String,
    kind: AddonKind,
    installed: RwLock<Version>,
    updater: Box<dyn AddonUpdater>,
}

impl Addon {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: AddonKind,
        installed: Version,
        updater: Box<dyn AddonUpdater>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            name: name.into(),
            kind,
            installed: RwLock::new(installed),
            updater,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AddonKind {
        self.kind
    }

    /// Currently installed version
    pub fn installed_version(&self) -> Version {
        *self.installed.read()
    }

    /// Apply this addon's update.
    ///
    /// Returns `Ok(true)` iff content actually changed; the installed
    /// version is updated to whatever the updater reports. Errors are the
    /// caller's problem to isolate - a failing addon never aborts a batch.
    pub async fn update(&self) -> Result<bool, AddonError> {
        match self.updater.apply(self).await? {
            Some(new_version) => {
                log::debug!(
                    "addon '{}' updated {} -> {}",
                    self.id,
                    self.installed_version(),
                    new_version
                );
                *self.installed.write() = new_version;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl fmt::Debug for Addon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Addon")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("installed", &self.installed_version())
            .finish()
    }
}
