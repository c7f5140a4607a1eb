//! Source traits for the version fallback chain

#[cfg(test)]
use mockall::automock;

use crate::manifest::types::Coordinate;
use crate::version::error::RepositoryError;

/// A search index answering "what is the latest published version".
///
/// This source is authoritative but fallible: transport problems and
/// unexpected statuses surface as errors so the resolver can record them,
/// while an artifact that is simply unknown yields `Ok(None)`.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SearchIndexSource: Send + Sync {
    async fn latest_version(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<String>, RepositoryError>;
}

/// A local artifact cache listing the versions present on disk.
///
/// Never fails: a coordinate with no cached artifacts is zero results.
#[cfg_attr(test, automock)]
pub trait LocalVersionSource: Send + Sync {
    fn list_versions(&self, coordinate: &Coordinate) -> Vec<String>;
}

/// A remote repository's per-artifact metadata document.
///
/// Best-effort by contract: any failure is `None`, never an error, so a
/// broken repository cannot abort the fallback chain.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    async fn release_version(
        &self,
        repository_url: &str,
        coordinate: &Coordinate,
    ) -> Option<String>;
}
