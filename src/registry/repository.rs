//! Repository Entities
//!
//! A repository is a named source of installable addons with its own
//! update-check mechanism. The transport behind a check sits behind the
//! [`UpdateSource`] seam; the orchestrator only ever sees "here is the
//! upstream listing" or a fetch failure.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::addon::{Addon, AddonDescriptor};
use super::error::SourceError;

/// Source of a repository's upstream addon listing.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetch the current upstream listing for this repository.
    async fn fetch_available(&self) -> Result<Vec<AddonDescriptor>, SourceError>;
}

/// A named source of installable addons.
pub struct Repository {
    id: String,
    name: String,
    location: String,
    addons: Vec<Arc<Addon>>,
    source: Box<dyn UpdateSource>,
}

impl Repository {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        addons: Vec<Arc<Addon>>,
        source: Box<dyn UpdateSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            name: name.into(),
            location: location.into(),
            addons,
            source,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source location string (path or URL), informational only
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Addons this repository publishes
    pub fn addons(&self) -> &[Arc<Addon>] {
        &self.addons
    }

    /// Look up one published addon by id
    pub fn addon(&self, id: &str) -> Option<Arc<Addon>> {
        self.addons.iter().find(|a| a.id() == id).cloned()
    }

    /// The update-check transport for this repository
    pub fn source(&self) -> &dyn UpdateSource {
        self.source.as_ref()
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("location", &self.location)
            .field("addons", &self.addons.len())
            .finish()
    }
}
